//! Configuration management for Roost

mod host;
mod kiosk;

pub use host::{HostConfig, HostProfile, LogSourceConfig, UpgradeSettings};
pub use kiosk::{DisplayUnitLink, KioskConfig, ScreenRotation};

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    if cfg!(target_os = "linux") {
        PathBuf::from("/etc/roost")
    } else {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("roost")
    }
}

/// Get the default daemon config file path
pub fn default_host_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Get the default kiosk document path
pub fn default_kiosk_config_path() -> PathBuf {
    default_config_dir().join("kiosk.toml")
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a file, replacing it atomically.
///
/// The document is written to a temporary file in the same directory and
/// renamed over the target, so a concurrent reader never observes a
/// half-written document.
pub fn save_config<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());
    let tmp = path.with_file_name(format!(".{}.tmp-{}", file_name, std::process::id()));

    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kiosk.toml");

        let config = KioskConfig::default();
        save_config(&path, &config).unwrap();

        let loaded: KioskConfig = load_config(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");

        let err = load_config::<KioskConfig>(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kiosk.toml");

        save_config(&path, &KioskConfig::default()).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], "kiosk.toml");
    }
}
