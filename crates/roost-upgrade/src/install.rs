//! Host-side installation step

use async_trait::async_trait;
use tokio::process::Command;

use roost_core::config::UpgradeSettings;

use crate::error::StepError;

/// Runs the host-side installation/configuration procedure
#[async_trait]
pub trait HostInstaller: Send + Sync {
    async fn install(&self, settings: &UpgradeSettings) -> Result<(), StepError>;
}

/// Runs the configured install command through the shell
pub struct CommandInstaller;

#[async_trait]
impl HostInstaller for CommandInstaller {
    async fn install(&self, settings: &UpgradeSettings) -> Result<(), StepError> {
        tracing::info!("Running host install: {}", settings.install_command);

        let output = Command::new("sh")
            .arg("-c")
            .arg(&settings.install_command)
            .current_dir(&settings.repo_path)
            .output()
            .await
            .map_err(|e| StepError(format!("install command: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StepError(format!(
                "install command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            tracing::debug!("install: {}", line);
        }
        Ok(())
    }
}
