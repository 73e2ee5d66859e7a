//! Roost CLI
//!
//! Single binary for operating the kiosk host:
//! - Run the host daemon in the foreground (serve)
//! - Trigger and observe the upgrade sequence (upgrade, check-update)
//! - One-shot maintenance, log tails, and configuration edits

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roost::commands;
use roost_host::daemon;

#[derive(Parser)]
#[command(name = "roost")]
#[command(author, version, about = "Kiosk control plane")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to daemon configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the host daemon in the foreground
    Serve {
        /// Bind address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Run the full upgrade sequence
    Upgrade {
        /// Skip the published-version gate
        #[arg(short, long)]
        force: bool,
    },

    /// Compare the installed version against the published one
    CheckUpdate,

    /// Run a single maintenance action
    Maintenance {
        /// Action name (reboot, clear-browser-data, restart-kiosk, ...)
        action: String,
    },

    /// Tail logs for a configured service
    Logs {
        /// Service name, or "processes" for a process snapshot
        service: String,
        /// Number of lines to return
        #[arg(short, long, default_value_t = 200)]
        lines: usize,
    },

    /// Read or edit the kiosk configuration document
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the document, or a single key
    Get { key: Option<String> },
    /// Set one key; the whole document is re-validated before saving
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = daemon::load_host_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => {
            let mut config = config;
            if let Some(bind) = bind {
                config.bind_address = bind;
            }
            tracing::info!("Roost host daemon starting...");
            daemon::run(config).await?;
        }

        Commands::Upgrade { force } => {
            commands::upgrade_command(&config, force).await?;
        }

        Commands::CheckUpdate => {
            commands::check_update_command(&config).await?;
        }

        Commands::Maintenance { action } => {
            commands::maintenance_command(&action).await?;
        }

        Commands::Logs { service, lines } => {
            commands::logs_command(&config, &service, lines).await?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Get { key } => {
                commands::config_get(&config, key.as_deref())?;
            }
            ConfigAction::Set { key, value } => {
                commands::config_set(&config, &key, &value)?;
            }
        },
    }

    Ok(())
}
