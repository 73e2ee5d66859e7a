//! roost-host: Host daemon for the Roost kiosk control plane
//!
//! Serves the HTTP control surface consumed by the presentation layer,
//! dispatches maintenance actions to the operating system, and aggregates
//! service logs for display.

pub mod actions;
pub mod daemon;
pub mod input;
pub mod logs;
pub mod server;
pub mod state;

pub use actions::{Dispatcher, MaintenanceAction, SystemControl, SystemdControl};
pub use logs::{JournalProvider, LogAggregator, LogProvider};
pub use state::HostState;
