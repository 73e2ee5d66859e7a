//! Service log aggregation
//!
//! Bounded tails of named service log streams, oldest-first, plus a
//! pseudo-source that snapshots the currently running processes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use roost_core::config::LogSourceConfig;
use roost_core::LogError;

/// Name of the pseudo-source that lists running processes
pub const PROCESS_SOURCE: &str = "processes";

/// Line cap applied to the process snapshot
const PROCESS_CAP: usize = 500;

/// Access to the OS log facility
#[async_trait]
pub trait LogProvider: Send + Sync {
    /// Most recent `lines` lines of a unit's log, oldest-first
    async fn unit_tail(&self, unit: &str, lines: usize) -> Result<Vec<String>, LogError>;

    /// Fresh snapshot of running processes
    async fn process_snapshot(&self) -> Result<Vec<String>, LogError>;
}

/// journald-backed implementation of [`LogProvider`]
pub struct JournalProvider;

impl JournalProvider {
    async fn run(&self, program: &str, args: &[String]) -> Result<Vec<String>, LogError> {
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| LogError::ReadFailed(format!("{}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LogError::ReadFailed(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|l| l.to_string())
            .collect())
    }
}

#[async_trait]
impl LogProvider for JournalProvider {
    async fn unit_tail(&self, unit: &str, lines: usize) -> Result<Vec<String>, LogError> {
        // journalctl prints the last N entries in chronological order
        let args = vec![
            "-u".to_string(),
            unit.to_string(),
            "-n".to_string(),
            lines.to_string(),
            "-o".to_string(),
            "cat".to_string(),
            "--no-pager".to_string(),
        ];
        self.run("journalctl", &args).await
    }

    async fn process_snapshot(&self) -> Result<Vec<String>, LogError> {
        let args = vec![
            "-eo".to_string(),
            "pid,comm,%cpu,%mem".to_string(),
            "--sort=-%cpu".to_string(),
        ];
        self.run("ps", &args).await
    }
}

/// Serves bounded tails of the configured log sources
pub struct LogAggregator {
    sources: HashMap<String, LogSourceConfig>,
    provider: Arc<dyn LogProvider>,
}

impl LogAggregator {
    pub fn new(sources: HashMap<String, LogSourceConfig>, provider: Arc<dyn LogProvider>) -> Self {
        Self { sources, provider }
    }

    /// Names of all available sources, including the process pseudo-source
    pub fn source_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.keys().cloned().collect();
        names.push(PROCESS_SOURCE.to_string());
        names.sort();
        names
    }

    /// Tail a named source: at most `min(max_lines, cap)` lines,
    /// oldest-first, never more than currently exist.
    pub async fn tail(&self, service: &str, max_lines: usize) -> Result<Vec<String>, LogError> {
        if service == PROCESS_SOURCE {
            let limit = max_lines.min(PROCESS_CAP);
            let mut snapshot = self.provider.process_snapshot().await?;
            snapshot.truncate(limit);
            return Ok(snapshot);
        }

        let source = self
            .sources
            .get(service)
            .ok_or_else(|| LogError::UnknownService(service.to_string()))?;

        let limit = max_lines.min(source.cap);
        let mut lines = self.provider.unit_tail(&source.unit, limit).await?;
        // providers are trusted to honor the limit, but never rely on it
        if lines.len() > limit {
            lines.drain(..lines.len() - limit);
        }
        Ok(lines)
    }
}
