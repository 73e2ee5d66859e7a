//! The upgrade orchestrator
//!
//! Owns the single live upgrade session and drives the sequence:
//! Requested -> PullingSource -> InstallingHost -> NotifyingDisplayUnit ->
//! DisplayUnitRebooting -> Done, with any step failure halting the
//! sequence in Failed. Steps are one linear run of blocking external
//! calls; nothing is retried within a session, and a failed sequence must
//! be re-triggered from the start.

use std::sync::Arc;

use tokio::sync::Mutex;

use roost_core::config::{DisplayUnitLink, UpgradeSettings};
use roost_core::{ConfigStore, MachineIdentity};

use crate::error::UpgradeError;
use crate::install::HostInstaller;
use crate::notify::{DisplayNotifier, NotifyError};
use crate::pull::SourcePuller;
use crate::session::{UpgradeSession, UpgradeState, UpgradeStep};

/// Drives the cross-device upgrade sequence
pub struct Orchestrator {
    store: Arc<ConfigStore>,
    settings: UpgradeSettings,
    identity: MachineIdentity,
    puller: Arc<dyn SourcePuller>,
    installer: Arc<dyn HostInstaller>,
    notifier: Arc<dyn DisplayNotifier>,
    session: Mutex<Option<UpgradeSession>>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<ConfigStore>,
        settings: UpgradeSettings,
        identity: MachineIdentity,
        puller: Arc<dyn SourcePuller>,
        installer: Arc<dyn HostInstaller>,
        notifier: Arc<dyn DisplayNotifier>,
    ) -> Self {
        Self {
            store,
            settings,
            identity,
            puller,
            installer,
            notifier,
            session: Mutex::new(None),
        }
    }

    /// Snapshot of the current session, if any was ever started
    pub async fn session(&self) -> Option<UpgradeSession> {
        self.session.lock().await.clone()
    }

    /// Trigger the upgrade sequence and run it to a terminal state.
    ///
    /// Fails with [`UpgradeError::AlreadyRunning`] while a session is not
    /// terminal, and with [`UpgradeError::MissingConnectionParams`] before
    /// any session starts when the kiosk configuration has no display-unit
    /// link. Returns the final session.
    pub async fn trigger(&self) -> Result<UpgradeSession, UpgradeError> {
        // Claim the session slot and capture the configuration snapshot.
        // The store is re-read here so a save since the last upgrade is
        // picked up; saves after this point do not affect this run.
        let link = {
            let mut guard = self.session.lock().await;
            if let Some(existing) = guard.as_ref() {
                if !existing.state().is_terminal() {
                    return Err(UpgradeError::AlreadyRunning);
                }
            }

            let kiosk = self.store.load()?;
            let link = kiosk
                .display_unit
                .ok_or(UpgradeError::MissingConnectionParams)?;

            *guard = Some(UpgradeSession::new());
            link
        };

        tracing::info!("Upgrade sequence triggered");
        self.run(link).await;

        let guard = self.session.lock().await;
        Ok(guard
            .clone()
            .unwrap_or_else(UpgradeSession::new))
    }

    async fn run(&self, link: DisplayUnitLink) {
        // Requested: precondition checks before any mutating step
        if !self.identity.matches(&self.settings.expected_identity) {
            let reason = format!(
                "host identity mismatch: expected model containing {:?} on {:?}, found {:?} on {:?}",
                self.settings.expected_identity.model,
                self.settings.expected_identity.os_codename,
                self.identity.model,
                self.identity.os_codename,
            );
            tracing::error!("{}", reason);
            self.fail(UpgradeStep::Preconditions, reason).await;
            return;
        }
        self.succeed(UpgradeStep::Preconditions).await;

        // PullingSource
        self.advance(UpgradeState::PullingSource, "pulling latest source")
            .await;
        if let Err(e) = self.puller.pull(&self.settings).await {
            tracing::error!("Source pull failed: {}", e);
            self.fail(UpgradeStep::PullSource, e.to_string()).await;
            return;
        }
        self.succeed(UpgradeStep::PullSource).await;

        // InstallingHost
        self.advance(UpgradeState::InstallingHost, "installing on host")
            .await;
        if let Err(e) = self.installer.install(&self.settings).await {
            tracing::error!("Host install failed: {}", e);
            self.fail(UpgradeStep::InstallHost, e.to_string()).await;
            return;
        }
        self.succeed(UpgradeStep::InstallHost).await;

        // NotifyingDisplayUnit; from here on the sequence cannot be
        // cancelled, the remote side has been instructed
        self.advance(
            UpgradeState::NotifyingDisplayUnit,
            "notifying the display unit",
        )
        .await;
        let command = link
            .remote_command
            .as_deref()
            .unwrap_or(&self.settings.remote_command);
        match self
            .notifier
            .notify(&link, command, self.settings.notify_timeout)
            .await
        {
            Ok(()) => {}
            Err(NotifyError::ConnectionClosed) => {
                // Expected: the display unit drops the link while it
                // reboots into the new version
                tracing::info!("Display unit closed the connection; treating as reboot signal");
            }
            Err(e) => {
                tracing::error!("Display unit notification failed: {}", e);
                self.fail(UpgradeStep::NotifyDisplayUnit, e.to_string())
                    .await;
                return;
            }
        }
        self.succeed(UpgradeStep::NotifyDisplayUnit).await;

        // DisplayUnitRebooting: no synchronous wait is performed
        self.advance(
            UpgradeState::DisplayUnitRebooting,
            "display unit rebooting into the new version",
        )
        .await;

        self.advance(UpgradeState::Done, "upgrade complete").await;
        tracing::info!("Upgrade sequence complete");
    }

    async fn advance(&self, state: UpgradeState, status: &str) {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_mut() {
            session.advance(state, status);
        }
    }

    async fn succeed(&self, step: UpgradeStep) {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_mut() {
            session.step_succeeded(step);
        }
    }

    async fn fail(&self, step: UpgradeStep, reason: String) {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_mut() {
            session.step_failed(step, reason);
        }
    }
}
