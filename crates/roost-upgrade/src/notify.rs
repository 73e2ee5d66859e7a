//! Display-unit notification over SSH
//!
//! The final mutating step of the upgrade sequence: an authenticated
//! remote shell connection to the display unit running a fixed command
//! that performs the device-local half of the upgrade and reboots.
//!
//! The display unit is expected to drop the connection while it reboots
//! into the new version, so a connection-closed error here is a success
//! indicator, not a failure. That distinction is encoded in
//! [`NotifyError`] and handled by the orchestrator as an explicit branch.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client;
use russh::ChannelMsg;
use russh_keys::key::PublicKey;
use thiserror::Error;

use roost_core::config::DisplayUnitLink;

/// Typed transport outcomes of the notify step
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The connection dropped after the command was accepted; expected
    /// while the display unit reboots
    #[error("Connection closed by the display unit")]
    ConnectionClosed,

    /// The display unit could not be reached (includes timeout)
    #[error("Display unit unreachable: {0}")]
    Unreachable(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The remote command ran and reported failure
    #[error("Remote upgrade command failed: {0}")]
    Remote(String),
}

/// Issues the remote upgrade command to the display unit
#[async_trait]
pub trait DisplayNotifier: Send + Sync {
    async fn notify(
        &self,
        link: &DisplayUnitLink,
        command: &str,
        timeout: Duration,
    ) -> Result<(), NotifyError>;
}

/// SSH client handler for the display-unit link.
///
/// The link runs on a trusted private segment and the display unit's host
/// key changes when it is re-imaged, so any host key is accepted.
struct AcceptAllHandler;

#[async_trait]
impl client::Handler for AcceptAllHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        tracing::debug!(
            "Accepting display unit host key: {}",
            server_public_key.fingerprint()
        );
        Ok(true)
    }
}

/// russh-backed implementation of [`DisplayNotifier`]
pub struct SshNotifier;

impl SshNotifier {
    /// Classify a transport error: disconnects and torn connections are
    /// the expected reboot signal, everything else is a real failure.
    fn classify(err: russh::Error) -> NotifyError {
        match err {
            russh::Error::Disconnect => NotifyError::ConnectionClosed,
            russh::Error::IO(ref io) => match io.kind() {
                std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::UnexpectedEof => NotifyError::ConnectionClosed,
                _ => NotifyError::Unreachable(err.to_string()),
            },
            other => NotifyError::Unreachable(other.to_string()),
        }
    }

    async fn exec(&self, link: &DisplayUnitLink, command: &str) -> Result<(), NotifyError> {
        let key = russh_keys::load_secret_key(&link.key_path, None).map_err(|e| {
            NotifyError::Auth(format!(
                "failed to load key {}: {}",
                link.key_path.display(),
                e
            ))
        })?;

        let config = Arc::new(client::Config::default());

        tracing::debug!("Connecting to display unit at {}", link.address);
        let mut session = client::connect(config, link.address.as_str(), AcceptAllHandler)
            .await
            .map_err(Self::classify)?;

        let authenticated = session
            .authenticate_publickey(&link.username, Arc::new(key))
            .await
            .map_err(|e| NotifyError::Auth(e.to_string()))?;
        if !authenticated {
            return Err(NotifyError::Auth("public key rejected".to_string()));
        }

        let mut channel = session
            .channel_open_session()
            .await
            .map_err(Self::classify)?;

        tracing::info!("Issuing remote upgrade command: {}", command);
        channel
            .exec(true, command)
            .await
            .map_err(Self::classify)?;

        // Drain the channel; the display unit may drop the link before an
        // exit status ever arrives.
        let mut exit_status = None;
        loop {
            match channel.wait().await {
                Some(ChannelMsg::ExitStatus { exit_status: code }) => exit_status = Some(code),
                Some(ChannelMsg::Data { data }) => {
                    for line in String::from_utf8_lossy(&data).lines() {
                        tracing::debug!("display unit: {}", line);
                    }
                }
                Some(_) => {}
                None => break,
            }
        }

        match exit_status {
            Some(0) => Ok(()),
            Some(code) => Err(NotifyError::Remote(format!(
                "remote upgrade command exited with status {}",
                code
            ))),
            // The link dropped mid-command: the reboot signal
            None => Err(NotifyError::ConnectionClosed),
        }
    }
}

#[async_trait]
impl DisplayNotifier for SshNotifier {
    async fn notify(
        &self,
        link: &DisplayUnitLink,
        command: &str,
        timeout: Duration,
    ) -> Result<(), NotifyError> {
        tokio::time::timeout(timeout, self.exec(link, command))
            .await
            .map_err(|_| {
                NotifyError::Unreachable(format!(
                    "notification timed out after {} seconds",
                    timeout.as_secs()
                ))
            })?
    }
}
