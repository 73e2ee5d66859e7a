//! The operator-editable kiosk configuration document
//!
//! This is the document served by `GET /getconfig` and replaced by
//! `POST /setconfig`. The key set is closed: unknown keys are rejected on
//! both the TOML and form decode paths, and every value carries a declared
//! range checked by [`KioskConfig::validate`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Screen rotation applied by the display renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenRotation {
    /// Native orientation
    #[default]
    None,
    /// 90 degrees clockwise
    Cw,
    /// 90 degrees counter-clockwise
    Ccw,
    /// Upside-down
    Ud,
}

impl ScreenRotation {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "cw" => Some(Self::Cw),
            "ccw" => Some(Self::Ccw),
            "ud" => Some(Self::Ud),
            _ => None,
        }
    }
}

/// Connection parameters for the remote-command channel to the display unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayUnitLink {
    /// SSH address of the display unit (host:port)
    pub address: String,

    /// Username for the SSH connection
    pub username: String,

    /// Path to the private key used for authentication
    pub key_path: PathBuf,

    /// Override for the remote upgrade command
    #[serde(default)]
    pub remote_command: Option<String>,
}

/// The kiosk configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KioskConfig {
    /// Human-readable name shown on the kiosk
    pub display_name: String,

    /// Port the kiosk web surface is served on
    pub web_port: u16,

    /// URL the kiosk browser points at
    pub browser_url: String,

    /// Browser zoom; below 0.5 the renderer misbehaves
    pub browser_scale: f64,

    /// Password for the VNC screen-share service (max 8 chars)
    pub vnc_password: String,

    /// Allow the screen to sleep
    pub screen_sleep_allow: bool,

    /// Minutes of inactivity before the screen sleeps
    pub screen_sleep_time: u32,

    /// Screen brightness, 0-256 (0 = off)
    pub screen_brightness: u32,

    /// Screen rotation
    pub screen_rotate: ScreenRotation,

    /// Connection parameters for the display unit; required for upgrades
    pub display_unit: Option<DisplayUnitLink>,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            display_name: "kiosk".to_string(),
            web_port: 80,
            browser_url: "http://localhost".to_string(),
            browser_scale: 1.0,
            vnc_password: "roost".to_string(),
            screen_sleep_allow: false,
            screen_sleep_time: 10,
            screen_brightness: 128,
            screen_rotate: ScreenRotation::None,
            display_unit: None,
        }
    }
}

impl KioskConfig {
    /// Validate the whole document, returning the first violation
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display_name.is_empty() {
            return Err(ConfigError::Invalid("display_name must not be empty".into()));
        }
        if self.web_port == 0 {
            return Err(ConfigError::Invalid("web_port must be non-zero".into()));
        }
        if self.browser_url.is_empty() {
            return Err(ConfigError::Invalid("browser_url must not be empty".into()));
        }
        if !(0.5..=3.0).contains(&self.browser_scale) {
            return Err(ConfigError::Invalid(format!(
                "browser_scale must be within 0.5..=3.0, got {}",
                self.browser_scale
            )));
        }
        if self.vnc_password.len() > 8 {
            return Err(ConfigError::Invalid(
                "vnc_password must be at most 8 characters".into(),
            ));
        }
        if self.screen_sleep_time > 60 {
            return Err(ConfigError::Invalid(format!(
                "screen_sleep_time must be within 0..=60, got {}",
                self.screen_sleep_time
            )));
        }
        if self.screen_brightness > 256 {
            return Err(ConfigError::Invalid(format!(
                "screen_brightness must be within 0..=256, got {}",
                self.screen_brightness
            )));
        }
        if let Some(link) = &self.display_unit {
            if link.address.is_empty() {
                return Err(ConfigError::Invalid(
                    "display_unit.address must not be empty".into(),
                ));
            }
            if link.username.is_empty() {
                return Err(ConfigError::Invalid(
                    "display_unit.username must not be empty".into(),
                ));
            }
        }
        Ok(())
    }

    /// Build a candidate document from urlencoded form pairs.
    ///
    /// Form handling never includes unchecked checkboxes, so every bool is
    /// reset to false before the pairs are applied. Keys missing from the
    /// form keep their current value; an unrecognized key rejects the whole
    /// submission before any state changes.
    pub fn from_form(current: &Self, pairs: &[(String, String)]) -> Result<Self, ConfigError> {
        let mut candidate = current.clone();
        candidate.screen_sleep_allow = false;

        for (key, value) in pairs {
            candidate.apply_form_value(key, value)?;
        }

        candidate.validate()?;
        Ok(candidate)
    }

    fn apply_form_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let bad = |what: &str| ConfigError::Invalid(format!("{}: bad value {:?}", what, value));

        match key {
            "display_name" => self.display_name = value.to_string(),
            "web_port" => self.web_port = value.parse().map_err(|_| bad("web_port"))?,
            "browser_url" => self.browser_url = value.to_string(),
            "browser_scale" => {
                self.browser_scale = value.parse().map_err(|_| bad("browser_scale"))?
            }
            "vnc_password" => self.vnc_password = value.to_string(),
            "screen_sleep_allow" => {
                // checkboxes post "on"; accept explicit booleans too
                self.screen_sleep_allow = matches!(value, "on" | "true" | "1");
            }
            "screen_sleep_time" => {
                self.screen_sleep_time = value.parse().map_err(|_| bad("screen_sleep_time"))?
            }
            "screen_brightness" => {
                self.screen_brightness = value.parse().map_err(|_| bad("screen_brightness"))?
            }
            "screen_rotate" => {
                self.screen_rotate = ScreenRotation::parse(value)
                    .ok_or_else(|| bad("screen_rotate"))?
            }
            "display_unit.address" => self.link_mut().address = value.to_string(),
            "display_unit.username" => self.link_mut().username = value.to_string(),
            "display_unit.key_path" => self.link_mut().key_path = PathBuf::from(value),
            "display_unit.remote_command" => {
                self.link_mut().remote_command =
                    (!value.is_empty()).then(|| value.to_string());
            }
            other => {
                return Err(ConfigError::Invalid(format!(
                    "unknown config key: {}",
                    other
                )));
            }
        }
        Ok(())
    }

    fn link_mut(&mut self) -> &mut DisplayUnitLink {
        self.display_unit.get_or_insert_with(|| DisplayUnitLink {
            address: String::new(),
            username: String::new(),
            key_path: PathBuf::new(),
            remote_command: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(KioskConfig::default().validate().is_ok());
    }

    #[test]
    fn test_reject_out_of_range_scale() {
        let config = KioskConfig {
            browser_scale: 0.1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_reject_long_vnc_password() {
        let config = KioskConfig {
            vnc_password: "much-too-long".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_reject_unknown_toml_key() {
        let err = toml::from_str::<KioskConfig>("surprise = true").unwrap_err();
        assert!(err.to_string().contains("surprise"));
    }

    #[test]
    fn test_form_unknown_key_rejected() {
        let current = KioskConfig::default();
        let pairs = vec![("surprise".to_string(), "1".to_string())];
        assert!(matches!(
            KioskConfig::from_form(&current, &pairs),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_form_missing_checkbox_resets_bool() {
        let current = KioskConfig {
            screen_sleep_allow: true,
            ..Default::default()
        };
        let candidate = KioskConfig::from_form(&current, &[]).unwrap();
        assert!(!candidate.screen_sleep_allow);
    }

    #[test]
    fn test_form_applies_typed_values() {
        let current = KioskConfig::default();
        let pairs = vec![
            ("browser_scale".to_string(), "1.5".to_string()),
            ("screen_brightness".to_string(), "200".to_string()),
            ("screen_rotate".to_string(), "cw".to_string()),
            ("screen_sleep_allow".to_string(), "on".to_string()),
        ];
        let candidate = KioskConfig::from_form(&current, &pairs).unwrap();
        assert_eq!(candidate.browser_scale, 1.5);
        assert_eq!(candidate.screen_brightness, 200);
        assert_eq!(candidate.screen_rotate, ScreenRotation::Cw);
        assert!(candidate.screen_sleep_allow);
    }

    #[test]
    fn test_form_out_of_range_rejected() {
        let current = KioskConfig::default();
        let pairs = vec![("screen_sleep_time".to_string(), "90".to_string())];
        assert!(KioskConfig::from_form(&current, &pairs).is_err());
    }

    #[test]
    fn test_rotation_serde_names() {
        let toml = toml::to_string(&KioskConfig {
            screen_rotate: ScreenRotation::Ccw,
            ..Default::default()
        })
        .unwrap();
        assert!(toml.contains("screen_rotate = \"ccw\""));
    }
}
