//! CLI command implementations

mod check;
mod config;
mod logs;
mod maintenance;
mod upgrade;

pub use check::check_update_command;
pub use config::{config_get, config_set};
pub use logs::logs_command;
pub use maintenance::maintenance_command;
pub use upgrade::upgrade_command;
