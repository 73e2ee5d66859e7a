//! Error types shared across the Roost crates

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
///
/// `Missing` means no document has ever been persisted; `Parse` and
/// `Invalid` both mean the candidate/persisted document is unusable
/// (unknown key, wrong value type, or a value outside its declared range).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    Missing(PathBuf),

    /// Invalid configuration value
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error (unknown key or wrong value type)
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// I/O error while reading or replacing the document
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Maintenance action errors
#[derive(Error, Debug)]
pub enum ActionError {
    /// Action name outside the recognized set; nothing was executed
    #[error("Unknown maintenance action: {0}")]
    Unknown(String),

    /// The OS effect failed to start or exited non-zero
    #[error("Action failed to execute: {0}")]
    ExecutionFailed(String),
}

/// Log aggregation errors
#[derive(Error, Debug)]
pub enum LogError {
    /// Service name outside the configured source set
    #[error("Unknown log service: {0}")]
    UnknownService(String),

    /// Underlying log facility failed
    #[error("Failed to read logs: {0}")]
    ReadFailed(String),
}
