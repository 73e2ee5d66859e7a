//! Machine identity probing
//!
//! The upgrade sequence must only run on the intended host hardware and OS
//! release. Rather than each step reading ambient files, the identity is
//! probed once and passed in as an explicit value.

use std::path::Path;

use crate::config::HostProfile;

/// The probed identity of the machine this process runs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineIdentity {
    /// Hardware model string (from /proc/cpuinfo)
    pub model: String,

    /// OS release codename (from /etc/os-release)
    pub os_codename: String,
}

impl MachineIdentity {
    pub fn new(model: impl Into<String>, os_codename: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            os_codename: os_codename.into(),
        }
    }

    /// Probe the running system
    pub fn probe() -> std::io::Result<Self> {
        let cpuinfo = std::fs::read_to_string("/proc/cpuinfo")?;
        let os_release = std::fs::read_to_string("/etc/os-release")?;
        Ok(Self {
            model: parse_model(&cpuinfo).unwrap_or_default(),
            os_codename: parse_codename(&os_release).unwrap_or_default(),
        })
    }

    /// Probe, reading the release file from an alternate root (for tests
    /// and container builds)
    pub fn probe_from(cpuinfo_path: &Path, os_release_path: &Path) -> std::io::Result<Self> {
        let cpuinfo = std::fs::read_to_string(cpuinfo_path)?;
        let os_release = std::fs::read_to_string(os_release_path)?;
        Ok(Self {
            model: parse_model(&cpuinfo).unwrap_or_default(),
            os_codename: parse_codename(&os_release).unwrap_or_default(),
        })
    }

    /// Whether this identity satisfies the expected profile
    pub fn matches(&self, profile: &HostProfile) -> bool {
        self.model
            .to_lowercase()
            .contains(&profile.model.to_lowercase())
            && self.os_codename == profile.os_codename
    }
}

/// Extract the `Model` line from /proc/cpuinfo content
fn parse_model(cpuinfo: &str) -> Option<String> {
    cpuinfo.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        (key.trim() == "Model").then(|| value.trim().to_string())
    })
}

/// Extract VERSION_CODENAME from /etc/os-release content
fn parse_codename(os_release: &str) -> Option<String> {
    os_release.lines().find_map(|line| {
        let value = line.strip_prefix("VERSION_CODENAME=")?;
        Some(value.trim().trim_matches('"').to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CPUINFO: &str = "\
processor\t: 0
Hardware\t: BCM2835
Model\t\t: Raspberry Pi Zero 2 W Rev 1.0
";

    const OS_RELEASE: &str = "\
PRETTY_NAME=\"Debian GNU/Linux 11 (bullseye)\"
VERSION_CODENAME=bullseye
ID=debian
";

    #[test]
    fn test_parse_model() {
        assert_eq!(
            parse_model(CPUINFO).as_deref(),
            Some("Raspberry Pi Zero 2 W Rev 1.0")
        );
        assert_eq!(parse_model("processor: 0\n"), None);
    }

    #[test]
    fn test_parse_codename() {
        assert_eq!(parse_codename(OS_RELEASE).as_deref(), Some("bullseye"));
        assert_eq!(parse_codename("ID=debian\n"), None);
    }

    #[test]
    fn test_matches_profile() {
        let identity = MachineIdentity::new("Raspberry Pi Zero 2 W Rev 1.0", "bullseye");
        let profile = HostProfile::default();
        assert!(identity.matches(&profile));

        let wrong_hw = MachineIdentity::new("Some Other Board", "bullseye");
        assert!(!wrong_hw.matches(&profile));

        let wrong_os = MachineIdentity::new("Raspberry Pi Zero 2 W", "bookworm");
        assert!(!wrong_os.matches(&profile));
    }
}
