//! One-shot log tail

use std::sync::Arc;

use anyhow::Result;

use roost_core::{HostConfig, LogError};
use roost_host::logs::{JournalProvider, LogAggregator};

use crate::output::{print_error, print_info};

pub async fn logs_command(config: &HostConfig, service: &str, lines: usize) -> Result<()> {
    let aggregator = LogAggregator::new(config.log_sources.clone(), Arc::new(JournalProvider));

    match aggregator.tail(service, lines).await {
        Ok(tail) => {
            for line in tail {
                println!("{}", line);
            }
            Ok(())
        }
        Err(LogError::UnknownService(name)) => {
            print_error(&format!("Unknown service: {}", name));
            let mut names = aggregator.source_names();
            names.sort();
            print_info(&format!("Available services: {}", names.join(", ")));
            anyhow::bail!("unknown log service")
        }
        Err(e) => Err(e.into()),
    }
}
