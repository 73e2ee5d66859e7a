//! Maintenance action dispatch
//!
//! A closed set of named operations, each mapped to exactly one OS-level
//! effect. Dispatch is side-effect-free until the name resolves; the OS
//! effect is only requested, never awaited to completion (a reboot request
//! returns immediately and the device disappears afterward).

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use roost_core::ActionError;

/// The recognized maintenance actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceAction {
    /// Request a reboot of the display unit
    RebootDisplayUnit,
    /// Clear the kiosk browser's cookies, cache, and local storage
    ClearBrowserData,
    /// Restart the kiosk service
    RestartKioskService,
    /// Restart the backlight service
    RestartBacklight,
    /// Restart the VNC screen-share service
    RestartVnc,
}

impl MaintenanceAction {
    /// All recognized actions
    pub const ALL: [MaintenanceAction; 5] = [
        MaintenanceAction::RebootDisplayUnit,
        MaintenanceAction::ClearBrowserData,
        MaintenanceAction::RestartKioskService,
        MaintenanceAction::RestartBacklight,
        MaintenanceAction::RestartVnc,
    ];

    /// Wire name used by the control surface
    pub fn name(&self) -> &'static str {
        match self {
            MaintenanceAction::RebootDisplayUnit => "reboot",
            MaintenanceAction::ClearBrowserData => "clear-browser-data",
            MaintenanceAction::RestartKioskService => "restart-kiosk",
            MaintenanceAction::RestartBacklight => "restart-backlight",
            MaintenanceAction::RestartVnc => "restart-vnc",
        }
    }

    /// Parse a wire name; `None` for anything outside the recognized set
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.name() == name)
    }
}

impl std::fmt::Display for MaintenanceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// OS process/service control used by the dispatcher
#[async_trait]
pub trait SystemControl: Send + Sync {
    /// Request a system reboot; returns once the request is accepted
    async fn reboot(&self) -> Result<(), ActionError>;

    /// Restart a named service
    async fn restart_unit(&self, unit: &str) -> Result<(), ActionError>;

    /// Remove the kiosk browser's profile data
    async fn clear_browser_data(&self) -> Result<(), ActionError>;
}

/// systemd-backed implementation of [`SystemControl`]
pub struct SystemdControl {
    /// Directories removed by clear_browser_data
    browser_data_dirs: Vec<PathBuf>,
}

impl SystemdControl {
    pub fn new() -> Self {
        Self {
            browser_data_dirs: vec![
                PathBuf::from("/home/kiosk/.config/chromium"),
                PathBuf::from("/home/kiosk/.cache/chromium"),
            ],
        }
    }

    pub fn with_browser_data_dirs(dirs: Vec<PathBuf>) -> Self {
        Self {
            browser_data_dirs: dirs,
        }
    }

    async fn systemctl(&self, args: &[&str]) -> Result<(), ActionError> {
        let output = Command::new("systemctl")
            .args(args)
            .output()
            .await
            .map_err(|e| ActionError::ExecutionFailed(format!("systemctl: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ActionError::ExecutionFailed(format!(
                "systemctl {} exited with {}: {}",
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl Default for SystemdControl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemControl for SystemdControl {
    async fn reboot(&self) -> Result<(), ActionError> {
        tracing::info!("Requesting system reboot");
        self.systemctl(&["reboot"]).await
    }

    async fn restart_unit(&self, unit: &str) -> Result<(), ActionError> {
        tracing::info!("Restarting service: {}", unit);
        self.systemctl(&["restart", unit]).await
    }

    async fn clear_browser_data(&self) -> Result<(), ActionError> {
        for dir in &self.browser_data_dirs {
            if dir.exists() {
                tracing::info!("Removing browser data: {}", dir.display());
                tokio::fs::remove_dir_all(dir).await.map_err(|e| {
                    ActionError::ExecutionFailed(format!(
                        "failed to remove {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
            }
        }
        Ok(())
    }
}

/// Resolves action names and requests the corresponding OS effect
pub struct Dispatcher {
    control: Arc<dyn SystemControl>,
}

impl Dispatcher {
    pub fn new(control: Arc<dyn SystemControl>) -> Self {
        Self { control }
    }

    /// Dispatch an action by wire name.
    ///
    /// Unknown names fail with [`ActionError::Unknown`] before any OS
    /// effect. A recognized action returns once its effect has been
    /// requested; failure to start it is [`ActionError::ExecutionFailed`]
    /// and is reported, not retried.
    pub async fn dispatch(&self, name: &str) -> Result<MaintenanceAction, ActionError> {
        let action =
            MaintenanceAction::parse(name).ok_or_else(|| ActionError::Unknown(name.to_string()))?;

        tracing::info!("Dispatching maintenance action: {}", action);
        match action {
            MaintenanceAction::RebootDisplayUnit => self.control.reboot().await?,
            MaintenanceAction::ClearBrowserData => self.control.clear_browser_data().await?,
            MaintenanceAction::RestartKioskService => self.control.restart_unit("kiosk").await?,
            MaintenanceAction::RestartBacklight => self.control.restart_unit("backlight").await?,
            MaintenanceAction::RestartVnc => self.control.restart_unit("vnc").await?,
        }
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every effect requested, optionally failing all of them
    struct RecordingControl {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingControl {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, what: &str) -> Result<(), ActionError> {
            self.calls.lock().unwrap().push(what.to_string());
            if self.fail {
                Err(ActionError::ExecutionFailed("boom".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl SystemControl for RecordingControl {
        async fn reboot(&self) -> Result<(), ActionError> {
            self.record("reboot")
        }
        async fn restart_unit(&self, unit: &str) -> Result<(), ActionError> {
            self.record(&format!("restart:{}", unit))
        }
        async fn clear_browser_data(&self) -> Result<(), ActionError> {
            self.record("clear-browser-data")
        }
    }

    #[tokio::test]
    async fn test_unknown_action_has_no_effect() {
        let control = RecordingControl::new(false);
        let dispatcher = Dispatcher::new(control.clone());

        let err = dispatcher.dispatch("format-disk").await.unwrap_err();
        assert!(matches!(err, ActionError::Unknown(_)));
        assert!(control.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_maps_to_single_effect() {
        let control = RecordingControl::new(false);
        let dispatcher = Dispatcher::new(control.clone());

        dispatcher.dispatch("restart-kiosk").await.unwrap();
        dispatcher.dispatch("reboot").await.unwrap();
        dispatcher.dispatch("clear-browser-data").await.unwrap();

        assert_eq!(
            control.calls(),
            vec!["restart:kiosk", "reboot", "clear-browser-data"]
        );
    }

    #[tokio::test]
    async fn test_execution_failure_is_surfaced() {
        let control = RecordingControl::new(true);
        let dispatcher = Dispatcher::new(control.clone());

        let err = dispatcher.dispatch("restart-backlight").await.unwrap_err();
        assert!(matches!(err, ActionError::ExecutionFailed(_)));
        // the effect was requested exactly once, no retry
        assert_eq!(control.calls(), vec!["restart:backlight"]);
    }

    #[test]
    fn test_parse_round_trip() {
        for action in MaintenanceAction::ALL {
            assert_eq!(MaintenanceAction::parse(action.name()), Some(action));
        }
        assert_eq!(MaintenanceAction::parse("Reboot Display"), None);
        assert_eq!(MaintenanceAction::parse(""), None);
    }
}
