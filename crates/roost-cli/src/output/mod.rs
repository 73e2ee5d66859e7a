//! Output formatting utilities for the CLI
//!
//! Colored status messages and formatting for upgrade step reports and
//! update-check results.

use roost_upgrade::{StepOutcome, StepReport, UpdateCheck};

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow with a warning symbol prefix
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan with an info symbol prefix
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// One console line per recorded upgrade step
pub fn format_step_report(report: &StepReport) -> String {
    match &report.outcome {
        StepOutcome::Success => format!("{}: ok", report.step),
        StepOutcome::Failed(reason) => format!("{}: failed ({})", report.step, reason),
        StepOutcome::Skipped => format!("{}: skipped", report.step),
    }
}

/// Human-readable update-check summary
pub fn format_update_check(check: &UpdateCheck) -> String {
    match check {
        UpdateCheck::UpToDate { version } => {
            format!("Up to date (version {})", version)
        }
        UpdateCheck::UpdateAvailable { local, remote } => {
            format!("Update available: {} -> {}", local, remote)
        }
        UpdateCheck::LocalNewer { local, remote } => {
            format!(
                "Local version {} is newer than published {}; upgrade blocked",
                local, remote
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roost_upgrade::check::parse_version;
    use roost_upgrade::UpgradeStep;

    #[test]
    fn test_format_step_report() {
        let ok = StepReport {
            step: UpgradeStep::PullSource,
            outcome: StepOutcome::Success,
        };
        assert_eq!(format_step_report(&ok), "pull-source: ok");

        let failed = StepReport {
            step: UpgradeStep::InstallHost,
            outcome: StepOutcome::Failed("exit 1".into()),
        };
        assert_eq!(format_step_report(&failed), "install-host: failed (exit 1)");
    }

    #[test]
    fn test_format_update_check_blocked() {
        let check = UpdateCheck::LocalNewer {
            local: parse_version("2.0.0").unwrap(),
            remote: parse_version("1.9.0").unwrap(),
        };
        assert!(format_update_check(&check).contains("blocked"));
    }
}
