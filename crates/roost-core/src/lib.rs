//! roost-core: Core types and configuration for Roost
//!
//! This crate provides the shared pieces used by the host daemon, the
//! upgrade orchestrator, and the CLI: the kiosk configuration document
//! and its store, daemon settings, machine identity probing, and the
//! error taxonomy.

pub mod config;
pub mod error;
pub mod identity;
pub mod store;

pub use config::{HostConfig, KioskConfig};
pub use error::{ActionError, ConfigError, LogError};
pub use identity::MachineIdentity;
pub use store::ConfigStore;
