//! One-shot maintenance dispatch

use std::sync::Arc;

use anyhow::Result;

use roost_core::ActionError;
use roost_host::actions::{Dispatcher, MaintenanceAction, SystemdControl};

use crate::output::{print_error, print_info, print_success};

pub async fn maintenance_command(action: &str) -> Result<()> {
    let dispatcher = Dispatcher::new(Arc::new(SystemdControl::new()));

    match dispatcher.dispatch(action).await {
        Ok(done) => {
            print_success(&format!("Ran maintenance action '{}'", done.name()));
            Ok(())
        }
        Err(ActionError::Unknown(name)) => {
            print_error(&format!("Unknown action: {}", name));
            let names: Vec<&str> = MaintenanceAction::ALL.iter().map(|a| a.name()).collect();
            print_info(&format!("Available actions: {}", names.join(", ")));
            anyhow::bail!("unknown maintenance action")
        }
        Err(e) => Err(e.into()),
    }
}
