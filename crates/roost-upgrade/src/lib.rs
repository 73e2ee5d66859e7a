//! roost-upgrade: Cross-device upgrade orchestration
//!
//! Drives the multi-step update sequence across the host and the display
//! unit: precondition checks, source pull, host install, and the remote
//! notification that sends the display unit into its own upgrade-and-reboot.
//! The sequence is an explicit state machine with a typed result per step,
//! tolerant of the display unit dropping the connection while it reboots.

pub mod check;
pub mod error;
pub mod install;
pub mod notify;
pub mod orchestrator;
pub mod pull;
pub mod session;

pub use check::{UpdateCheck, VersionChecker};
pub use error::{StepError, UpgradeError};
pub use install::{CommandInstaller, HostInstaller};
pub use notify::{DisplayNotifier, NotifyError, SshNotifier};
pub use orchestrator::Orchestrator;
pub use pull::{GitPuller, SourcePuller};
pub use session::{StepOutcome, StepReport, UpgradeSession, UpgradeState, UpgradeStep};
