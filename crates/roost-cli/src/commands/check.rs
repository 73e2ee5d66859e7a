//! Update-availability report

use anyhow::Result;

use roost_core::HostConfig;
use roost_upgrade::VersionChecker;

use crate::output::format_update_check;

pub async fn check_update_command(config: &HostConfig) -> Result<()> {
    let check = VersionChecker::new().check(&config.upgrade).await?;
    println!("{}", format_update_check(&check));
    Ok(())
}
