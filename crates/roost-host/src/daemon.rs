//! Daemon bootstrap
//!
//! Wires the production implementations together and runs the control
//! surface until SIGINT or SIGTERM. Shared between the `roost-hostd`
//! binary and `roost serve`.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use roost_core::{config, ConfigStore, HostConfig};

use crate::actions::{Dispatcher, SystemdControl};
use crate::input::XdotoolInjector;
use crate::logs::{JournalProvider, LogAggregator};
use crate::{server, HostState};

/// Load the daemon configuration.
///
/// An explicit path must exist and parse. Without one, the default path
/// is used when present and defaults are used otherwise, so a bare host
/// still comes up serviceable.
pub fn load_host_config(explicit: Option<&Path>) -> Result<HostConfig> {
    if let Some(path) = explicit {
        return config::load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path));
    }

    let default_path = config::default_host_config_path();
    if default_path.exists() {
        Ok(config::load_config(&default_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config from {:?}: {}", default_path, e);
            HostConfig::default()
        }))
    } else {
        tracing::info!("Using default configuration");
        Ok(HostConfig::default())
    }
}

/// Run the host daemon in the foreground until SIGINT/SIGTERM
pub async fn run(config: HostConfig) -> Result<()> {
    // Kiosk document store; initialize defaults on first boot
    let store = Arc::new(ConfigStore::new(config.kiosk_config_path.clone()));
    let kiosk = store
        .load_or_init()
        .with_context(|| "Failed to load kiosk configuration")?;
    tracing::info!("Kiosk configuration ready: {}", kiosk.display_name);

    let state = Arc::new(HostState::new(
        config.clone(),
        store,
        Dispatcher::new(Arc::new(SystemdControl::new())),
        LogAggregator::new(config.log_sources.clone(), Arc::new(JournalProvider)),
        Arc::new(XdotoolInjector),
    ));

    // Graceful shutdown on SIGINT/SIGTERM
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, initiating shutdown...");
            }
        }

        cancel_clone.cancel();
    });

    server::run(state, cancel).await?;

    tracing::info!("Host daemon shutdown complete");
    Ok(())
}
