//! Roost host daemon
//!
//! Serves the kiosk control surface and dispatches maintenance actions
//! on the host single-board computer.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use roost_host::daemon;

#[derive(Parser)]
#[command(name = "roost-hostd")]
#[command(about = "Roost kiosk host daemon")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| args.log_level.clone()),
        )
        .init();

    tracing::info!("Roost host daemon starting...");

    let mut config = daemon::load_host_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }

    daemon::run(config).await
}
