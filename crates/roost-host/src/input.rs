//! Synthetic input injection
//!
//! `GET /simulatekey` lets the presentation layer drive the display
//! pipeline as if a physical button or the knob had been used. The key
//! name set is closed and mirrors the physical controls.

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

/// Recognized synthetic key names
pub const VALID_KEYS: [&str; 9] = ["1", "2", "3", "4", "m", "enter", "esc", "left", "right"];

#[derive(Error, Debug)]
pub enum InputError {
    /// Key name outside the recognized set; nothing was injected
    #[error("Unknown key name: {0}")]
    UnknownKey(String),

    /// The injection tool failed to run
    #[error("Key injection failed: {0}")]
    InjectionFailed(String),
}

/// Whether a key name is in the recognized set
pub fn is_valid_key(name: &str) -> bool {
    VALID_KEYS.contains(&name)
}

/// Injects synthetic input events into the display pipeline
#[async_trait]
pub trait KeyInjector: Send + Sync {
    async fn inject(&self, key: &str) -> Result<(), InputError>;
}

/// xdotool-backed injector for the X display pipeline
pub struct XdotoolInjector;

impl XdotoolInjector {
    fn keysym(key: &str) -> &str {
        match key {
            "enter" => "Return",
            "esc" => "Escape",
            "left" => "Left",
            "right" => "Right",
            other => other,
        }
    }
}

#[async_trait]
impl KeyInjector for XdotoolInjector {
    async fn inject(&self, key: &str) -> Result<(), InputError> {
        if !is_valid_key(key) {
            return Err(InputError::UnknownKey(key.to_string()));
        }

        let keysym = Self::keysym(key);
        tracing::debug!("Injecting synthetic key: {} ({})", key, keysym);

        let output = Command::new("xdotool")
            .args(["key", keysym])
            .env("DISPLAY", ":0")
            .output()
            .await
            .map_err(|e| InputError::InjectionFailed(format!("xdotool: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InputError::InjectionFailed(format!(
                "xdotool exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        assert!(is_valid_key("enter"));
        assert!(is_valid_key("1"));
        assert!(!is_valid_key("F5"));
        assert!(!is_valid_key(""));
    }

    #[test]
    fn test_keysym_mapping() {
        assert_eq!(XdotoolInjector::keysym("enter"), "Return");
        assert_eq!(XdotoolInjector::keysym("esc"), "Escape");
        assert_eq!(XdotoolInjector::keysym("m"), "m");
    }
}
