//! The kiosk configuration store
//!
//! Load/validate/persist for the operator-editable document. Writes go
//! through whole-document validation and an atomic replace; a successful
//! save refreshes the cached copy, and dependents (notably the upgrade
//! orchestrator) re-read through the store rather than holding their own
//! long-lived copies.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::config::{self, KioskConfig};
use crate::error::ConfigError;

/// Persistent store for the kiosk configuration document
pub struct ConfigStore {
    path: PathBuf,
    cached: RwLock<Option<KioskConfig>>,
}

impl ConfigStore {
    /// Create a store backed by the given path; nothing is read yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: RwLock::new(None),
        }
    }

    /// Path of the persisted document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the persisted document, refreshing the cache
    pub fn load(&self) -> Result<KioskConfig, ConfigError> {
        let loaded: KioskConfig = config::load_config(&self.path)?;
        loaded.validate()?;
        *self.cached.write().expect("config cache lock poisoned") = Some(loaded.clone());
        Ok(loaded)
    }

    /// Current document: cache hit, otherwise a fresh load
    pub fn get(&self) -> Result<KioskConfig, ConfigError> {
        if let Some(cached) = self
            .cached
            .read()
            .expect("config cache lock poisoned")
            .clone()
        {
            return Ok(cached);
        }
        self.load()
    }

    /// Validate the candidate as a whole document, then atomically replace
    /// the persisted copy. The previous document is untouched when
    /// validation fails.
    pub fn save(&self, candidate: &KioskConfig) -> Result<(), ConfigError> {
        candidate.validate()?;
        config::save_config(&self.path, candidate)?;
        *self.cached.write().expect("config cache lock poisoned") = Some(candidate.clone());
        tracing::info!("Kiosk configuration saved to {}", self.path.display());
        Ok(())
    }

    /// Load the document, falling back to (and persisting) defaults when
    /// no document exists yet
    pub fn load_or_init(&self) -> Result<KioskConfig, ConfigError> {
        match self.load() {
            Ok(config) => Ok(config),
            Err(ConfigError::Missing(_)) => {
                let defaults = KioskConfig::default();
                self.save(&defaults)?;
                Ok(defaults)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayUnitLink;

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join("kiosk.toml"))
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let config = KioskConfig {
            display_name: "lobby".to_string(),
            screen_brightness: 64,
            display_unit: Some(DisplayUnitLink {
                address: "display:22".to_string(),
                username: "kiosk".to_string(),
                key_path: "/etc/roost/id_ed25519".into(),
                remote_command: None,
            }),
            ..Default::default()
        };

        store.save(&config).unwrap();
        assert_eq!(store.load().unwrap(), config);
    }

    #[test]
    fn test_invalid_candidate_leaves_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let good = KioskConfig {
            display_name: "lobby".to_string(),
            ..Default::default()
        };
        store.save(&good).unwrap();

        let bad = KioskConfig {
            screen_brightness: 999,
            ..Default::default()
        };
        assert!(matches!(store.save(&bad), Err(ConfigError::Invalid(_))));

        assert_eq!(store.load().unwrap(), good);
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(matches!(store.load(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_load_or_init_persists_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let config = store.load_or_init().unwrap();
        assert_eq!(config, KioskConfig::default());
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_refreshes_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&KioskConfig::default()).unwrap();
        let updated = KioskConfig {
            display_name: "hall".to_string(),
            ..Default::default()
        };
        store.save(&updated).unwrap();

        assert_eq!(store.get().unwrap().display_name, "hall");
    }
}
