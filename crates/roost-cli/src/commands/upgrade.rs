//! Operator-triggered upgrade sequence

use std::sync::Arc;

use anyhow::{Context, Result};

use roost_core::{ConfigStore, HostConfig, MachineIdentity};
use roost_upgrade::{
    CommandInstaller, GitPuller, Orchestrator, SshNotifier, UpgradeError, UpgradeState,
    VersionChecker,
};

use crate::output::{format_step_report, format_update_check, print_error, print_info, print_success};

/// Run the full upgrade sequence from the console.
///
/// The version gate runs first unless `--force` was given or no published
/// version URL is configured. The sequence itself then runs to a terminal
/// state with one console line per step.
pub async fn upgrade_command(config: &HostConfig, force: bool) -> Result<()> {
    if !force && !config.upgrade.remote_version_url.is_empty() {
        let check = VersionChecker::new().check(&config.upgrade).await?;
        print_info(&format_update_check(&check));
        if !check.allows_upgrade() {
            anyhow::bail!("published version is older than the installed one; use --force to reinstall anyway");
        }
    }

    let identity = MachineIdentity::probe().context("Failed to probe machine identity")?;
    let store = Arc::new(ConfigStore::new(config.kiosk_config_path.clone()));

    let orchestrator = Orchestrator::new(
        store,
        config.upgrade.clone(),
        identity,
        Arc::new(GitPuller),
        Arc::new(CommandInstaller),
        Arc::new(SshNotifier),
    );

    print_info("Starting upgrade sequence...");
    let session = match orchestrator.trigger().await {
        Ok(session) => session,
        Err(UpgradeError::MissingConnectionParams) => {
            anyhow::bail!(
                "no display unit configured; set [display_unit] in the kiosk configuration"
            );
        }
        Err(e) => return Err(e.into()),
    };

    for report in session.steps() {
        println!("  {}", format_step_report(report));
    }

    if session.state() == UpgradeState::Done {
        print_success("Upgrade complete; display unit rebooting into the new version");
        Ok(())
    } else {
        print_error(session.status_line());
        anyhow::bail!("upgrade failed")
    }
}
