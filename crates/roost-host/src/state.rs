//! Global daemon state

use std::sync::Arc;

use roost_core::{ConfigStore, HostConfig};

use crate::actions::Dispatcher;
use crate::input::KeyInjector;
use crate::logs::LogAggregator;

/// Shared state for the host daemon
pub struct HostState {
    /// Daemon configuration
    pub config: HostConfig,
    /// Kiosk configuration store
    pub store: Arc<ConfigStore>,
    /// Maintenance action dispatcher
    pub dispatcher: Dispatcher,
    /// Log aggregator
    pub logs: LogAggregator,
    /// Synthetic key injector
    pub keys: Arc<dyn KeyInjector>,
}

impl HostState {
    pub fn new(
        config: HostConfig,
        store: Arc<ConfigStore>,
        dispatcher: Dispatcher,
        logs: LogAggregator,
        keys: Arc<dyn KeyInjector>,
    ) -> Self {
        Self {
            config,
            store,
            dispatcher,
            logs,
            keys,
        }
    }
}
