//! Host daemon configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the host daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Address to bind the HTTP control surface to
    pub bind_address: String,

    /// Path to the kiosk configuration document
    pub kiosk_config_path: PathBuf,

    /// Named log sources served by `GET /logs`
    pub log_sources: HashMap<String, LogSourceConfig>,

    /// Upgrade orchestration settings
    pub upgrade: UpgradeSettings,
}

impl Default for HostConfig {
    fn default() -> Self {
        let mut log_sources = HashMap::new();
        log_sources.insert("kiosk".to_string(), LogSourceConfig::new("kiosk", 1000));
        log_sources.insert("updater".to_string(), LogSourceConfig::new("roost-hostd", 1000));
        log_sources.insert("backlight".to_string(), LogSourceConfig::new("backlight", 200));
        log_sources.insert("vnc".to_string(), LogSourceConfig::new("vnc", 200));
        log_sources.insert("websockify".to_string(), LogSourceConfig::new("websockify", 200));

        Self {
            bind_address: "0.0.0.0:9090".to_string(),
            kiosk_config_path: super::default_kiosk_config_path(),
            log_sources,
            upgrade: UpgradeSettings::default(),
        }
    }
}

/// A named reference to a systemd unit's log stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSourceConfig {
    /// systemd unit name
    pub unit: String,

    /// Maximum number of lines a tail may return
    pub cap: usize,
}

impl LogSourceConfig {
    pub fn new(unit: impl Into<String>, cap: usize) -> Self {
        Self {
            unit: unit.into(),
            cap,
        }
    }
}

/// Settings driving the cross-device upgrade sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeSettings {
    /// Local checkout of the source repository
    pub repo_path: PathBuf,

    /// File holding the locally installed version
    pub version_file: PathBuf,

    /// URL of the published VERSION document
    pub remote_version_url: String,

    /// Branch the source pull resets to
    pub branch: String,

    /// Command run for the host-side install step
    pub install_command: String,

    /// Command run on the display unit over the remote channel
    pub remote_command: String,

    /// Overall timeout for the display-unit notification
    #[serde(with = "duration_secs")]
    pub notify_timeout: Duration,

    /// Identity this host must present before any mutating step runs
    pub expected_identity: HostProfile,
}

impl Default for UpgradeSettings {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::from("/repo"),
            version_file: PathBuf::from("/repo/VERSION"),
            remote_version_url: String::new(),
            branch: "main".to_string(),
            install_command: "/repo/install_host.sh".to_string(),
            remote_command: "sudo /opt/roost/upgrade-display".to_string(),
            notify_timeout: Duration::from_secs(300),
            expected_identity: HostProfile::default(),
        }
    }
}

/// The hardware and OS release the upgrade sequence expects to run on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostProfile {
    /// Substring that must appear in the probed hardware model
    pub model: String,

    /// Required OS release codename
    pub os_codename: String,
}

impl Default for HostProfile {
    fn default() -> Self {
        Self {
            model: "Raspberry Pi Zero 2 W".to_string(),
            os_codename: "bullseye".to_string(),
        }
    }
}

// Durations are stored as plain seconds in the TOML file
mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips() {
        let config = HostConfig::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: HostConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.bind_address, config.bind_address);
        assert_eq!(parsed.upgrade.notify_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_notify_timeout_parses_from_secs() {
        let parsed: HostConfig =
            toml::from_str("[upgrade]\nnotify_timeout = 30\n").unwrap();
        assert_eq!(parsed.upgrade.notify_timeout, Duration::from_secs(30));
    }
}
