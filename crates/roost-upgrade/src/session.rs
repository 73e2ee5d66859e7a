//! Upgrade session state
//!
//! One `UpgradeSession` represents one end-to-end run of the upgrade
//! sequence. The session records the current state, a typed result per
//! step, and a human-readable status line relayed to the operator.

use std::fmt;
use std::time::SystemTime;

/// States of the upgrade sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeState {
    /// No sequence running
    Idle,
    /// Triggered; precondition checks in progress
    Requested,
    /// Fetching the latest revision of the source repository
    PullingSource,
    /// Running the host-side installation procedure
    InstallingHost,
    /// Issuing the remote upgrade command to the display unit
    NotifyingDisplayUnit,
    /// The display unit has been instructed and is rebooting; no
    /// synchronous wait is performed
    DisplayUnitRebooting,
    /// Terminal: the sequence completed
    Done,
    /// Terminal: a step failed and the sequence halted
    Failed,
}

impl UpgradeState {
    /// Whether this state ends the session
    pub fn is_terminal(&self) -> bool {
        matches!(self, UpgradeState::Done | UpgradeState::Failed)
    }
}

impl fmt::Display for UpgradeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpgradeState::Idle => "idle",
            UpgradeState::Requested => "requested",
            UpgradeState::PullingSource => "pulling-source",
            UpgradeState::InstallingHost => "installing-host",
            UpgradeState::NotifyingDisplayUnit => "notifying-display-unit",
            UpgradeState::DisplayUnitRebooting => "display-unit-rebooting",
            UpgradeState::Done => "done",
            UpgradeState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The steps the sequence runs, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeStep {
    Preconditions,
    PullSource,
    InstallHost,
    NotifyDisplayUnit,
}

impl fmt::Display for UpgradeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpgradeStep::Preconditions => "preconditions",
            UpgradeStep::PullSource => "pull-source",
            UpgradeStep::InstallHost => "install-host",
            UpgradeStep::NotifyDisplayUnit => "notify-display-unit",
        };
        f.write_str(name)
    }
}

/// Result of one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    Failed(String),
    /// Not attempted because an earlier step failed
    Skipped,
}

/// A step together with its recorded outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: UpgradeStep,
    pub outcome: StepOutcome,
}

/// One run of the upgrade sequence
#[derive(Debug, Clone)]
pub struct UpgradeSession {
    state: UpgradeState,
    started_at: SystemTime,
    steps: Vec<StepReport>,
    status_line: String,
}

impl UpgradeSession {
    /// Start a fresh session in `Requested`
    pub fn new() -> Self {
        Self {
            state: UpgradeState::Requested,
            started_at: SystemTime::now(),
            steps: Vec::new(),
            status_line: "upgrade requested".to_string(),
        }
    }

    pub fn state(&self) -> UpgradeState {
        self.state
    }

    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    pub fn steps(&self) -> &[StepReport] {
        &self.steps
    }

    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    /// Advance to the next state with a fresh status line
    pub fn advance(&mut self, state: UpgradeState, status: impl Into<String>) {
        self.state = state;
        self.status_line = status.into();
    }

    /// Record a successful step
    pub fn step_succeeded(&mut self, step: UpgradeStep) {
        self.steps.push(StepReport {
            step,
            outcome: StepOutcome::Success,
        });
    }

    /// Record a failed step, mark the remaining steps skipped, and move
    /// the session to `Failed`
    pub fn step_failed(&mut self, step: UpgradeStep, reason: impl Into<String>) {
        let reason = reason.into();
        self.steps.push(StepReport {
            step,
            outcome: StepOutcome::Failed(reason.clone()),
        });
        for later in Self::steps_after(step) {
            self.steps.push(StepReport {
                step: *later,
                outcome: StepOutcome::Skipped,
            });
        }
        self.state = UpgradeState::Failed;
        self.status_line = format!("{} failed: {}", step, reason);
    }

    fn steps_after(step: UpgradeStep) -> &'static [UpgradeStep] {
        match step {
            UpgradeStep::Preconditions => &[
                UpgradeStep::PullSource,
                UpgradeStep::InstallHost,
                UpgradeStep::NotifyDisplayUnit,
            ],
            UpgradeStep::PullSource => {
                &[UpgradeStep::InstallHost, UpgradeStep::NotifyDisplayUnit]
            }
            UpgradeStep::InstallHost => &[UpgradeStep::NotifyDisplayUnit],
            UpgradeStep::NotifyDisplayUnit => &[],
        }
    }
}

impl Default for UpgradeSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_requested() {
        let session = UpgradeSession::new();
        assert_eq!(session.state(), UpgradeState::Requested);
        assert!(!session.state().is_terminal());
        assert!(session.steps().is_empty());
    }

    #[test]
    fn test_terminal_states() {
        assert!(UpgradeState::Done.is_terminal());
        assert!(UpgradeState::Failed.is_terminal());
        assert!(!UpgradeState::NotifyingDisplayUnit.is_terminal());
        assert!(!UpgradeState::Idle.is_terminal());
    }

    #[test]
    fn test_step_failed_skips_remaining() {
        let mut session = UpgradeSession::new();
        session.step_succeeded(UpgradeStep::Preconditions);
        session.step_failed(UpgradeStep::PullSource, "fetch refused");

        assert_eq!(session.state(), UpgradeState::Failed);
        assert_eq!(session.steps().len(), 4);
        assert_eq!(session.steps()[1].outcome, StepOutcome::Failed("fetch refused".into()));
        assert_eq!(session.steps()[2].outcome, StepOutcome::Skipped);
        assert_eq!(session.steps()[3].outcome, StepOutcome::Skipped);
        assert!(session.status_line().contains("pull-source"));
    }
}
