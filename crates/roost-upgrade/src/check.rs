//! Update-availability check
//!
//! Compares the locally installed version against the published VERSION
//! document. The check runs before an upgrade is triggered; a remote
//! version older than the local one blocks the upgrade unless forced.

use std::time::Duration;

use semver::Version;

use roost_core::config::UpgradeSettings;

use crate::error::UpgradeError;

/// Outcome of an update check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheck {
    /// Local and remote are the same version; reinstalling is allowed
    UpToDate { version: Version },
    /// The remote version is newer
    UpdateAvailable { local: Version, remote: Version },
    /// The local version is newer than the published one
    LocalNewer { local: Version, remote: Version },
}

impl UpdateCheck {
    /// Whether an upgrade may proceed without forcing
    pub fn allows_upgrade(&self) -> bool {
        !matches!(self, UpdateCheck::LocalNewer { .. })
    }
}

/// Parse a VERSION document ("1.2.3", optionally "v"-prefixed)
pub fn parse_version(raw: &str) -> Result<Version, UpgradeError> {
    let trimmed = raw.trim().trim_start_matches('v');
    Version::parse(trimmed)
        .map_err(|e| UpgradeError::CheckFailed(format!("bad version {:?}: {}", raw.trim(), e)))
}

/// Compare local and remote versions
pub fn compare_versions(local: Version, remote: Version) -> UpdateCheck {
    if remote > local {
        UpdateCheck::UpdateAvailable { local, remote }
    } else if remote < local {
        UpdateCheck::LocalNewer { local, remote }
    } else {
        UpdateCheck::UpToDate { version: local }
    }
}

/// Fetches and compares versions
pub struct VersionChecker {
    client: reqwest::Client,
}

impl VersionChecker {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Run the check against the configured endpoints
    pub async fn check(&self, settings: &UpgradeSettings) -> Result<UpdateCheck, UpgradeError> {
        let local_raw = std::fs::read_to_string(&settings.version_file).map_err(|e| {
            UpgradeError::CheckFailed(format!(
                "cannot read local version {}: {}",
                settings.version_file.display(),
                e
            ))
        })?;
        let local = parse_version(&local_raw)?;

        if settings.remote_version_url.is_empty() {
            return Err(UpgradeError::CheckFailed(
                "remote_version_url is not configured".to_string(),
            ));
        }

        let remote_raw = self
            .client
            .get(&settings.remote_version_url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| UpgradeError::CheckFailed(format!("fetching remote version: {}", e)))?
            .text()
            .await
            .map_err(|e| UpgradeError::CheckFailed(format!("reading remote version: {}", e)))?;
        let remote = parse_version(&remote_raw)?;

        tracing::info!("Installed: v{}, published: v{}", local, remote);
        Ok(compare_versions(local, remote))
    }
}

impl Default for VersionChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_version_trims_and_strips_prefix() {
        assert_eq!(parse_version(" v1.2.3\n").unwrap(), v("1.2.3"));
        assert_eq!(parse_version("0.4.0").unwrap(), v("0.4.0"));
        assert!(parse_version("not-a-version").is_err());
    }

    #[test]
    fn test_remote_newer_allows_upgrade() {
        let check = compare_versions(v("1.0.0"), v("1.1.0"));
        assert_eq!(
            check,
            UpdateCheck::UpdateAvailable {
                local: v("1.0.0"),
                remote: v("1.1.0")
            }
        );
        assert!(check.allows_upgrade());
    }

    #[test]
    fn test_same_version_allows_reinstall() {
        let check = compare_versions(v("1.0.0"), v("1.0.0"));
        assert!(check.allows_upgrade());
    }

    #[test]
    fn test_local_newer_blocks_upgrade() {
        let check = compare_versions(v("2.0.0"), v("1.9.0"));
        assert_eq!(
            check,
            UpdateCheck::LocalNewer {
                local: v("2.0.0"),
                remote: v("1.9.0")
            }
        );
        assert!(!check.allows_upgrade());
    }
}
