//! Upgrade orchestration errors

use thiserror::Error;

use roost_core::ConfigError;

/// Errors raised when triggering or preparing an upgrade
#[derive(Error, Debug)]
pub enum UpgradeError {
    /// A session is already in flight; new requests are rejected, not queued
    #[error("An upgrade session is already running")]
    AlreadyRunning,

    /// The kiosk configuration has no display-unit connection parameters
    #[error("Display unit connection parameters are missing from the kiosk configuration")]
    MissingConnectionParams,

    /// The kiosk configuration could not be read
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The update-availability check could not complete
    #[error("Update check failed: {0}")]
    CheckFailed(String),
}

/// Failure of a single upgrade step (source pull or host install)
#[derive(Error, Debug)]
#[error("{0}")]
pub struct StepError(pub String);
