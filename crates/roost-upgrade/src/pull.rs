//! Source repository pulling

use async_trait::async_trait;
use tokio::process::Command;

use roost_core::config::UpgradeSettings;

use crate::error::StepError;

/// Fetches the latest revision of the source repository
#[async_trait]
pub trait SourcePuller: Send + Sync {
    async fn pull(&self, settings: &UpgradeSettings) -> Result<(), StepError>;
}

/// git-backed puller: fetch then hard-reset to the configured branch
pub struct GitPuller;

impl GitPuller {
    async fn git(&self, settings: &UpgradeSettings, args: &[&str]) -> Result<(), StepError> {
        let repo = settings.repo_path.display().to_string();
        let output = Command::new("git")
            .arg("-C")
            .arg(&repo)
            .args(args)
            .output()
            .await
            .map_err(|e| StepError(format!("git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StepError(format!(
                "git {} exited with {}: {}",
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SourcePuller for GitPuller {
    async fn pull(&self, settings: &UpgradeSettings) -> Result<(), StepError> {
        tracing::info!(
            "Pulling latest revision of {} (branch {})",
            settings.repo_path.display(),
            settings.branch
        );
        self.git(settings, &["fetch", "origin"]).await?;
        let target = format!("origin/{}", settings.branch);
        self.git(settings, &["reset", "--hard", &target]).await?;
        Ok(())
    }
}
