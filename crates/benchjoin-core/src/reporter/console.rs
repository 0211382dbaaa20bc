//! Console reporter for join outcomes
//!
//! One status line per job, followed by an indented detail line.

use anyhow::Result;
use std::fmt::Write;

use super::JobOutcome;

const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

/// Console format reporter
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Format outcomes for a terminal, with ANSI colors when `color` is set
    pub fn format(outcomes: &[JobOutcome], color: bool) -> Result<String> {
        let mut output = String::new();

        for outcome in outcomes {
            let name = outcome.model.display_name();
            match (&outcome.report, &outcome.error) {
                (Some(report), _) if outcome.success => {
                    writeln!(
                        output,
                        "{} {} data joined successfully",
                        Self::tag("[OK]", GREEN, color),
                        name
                    )?;
                    writeln!(
                        output,
                        "    {} ({} groups from {} trials, {} files read, {} empty, filter {})",
                        report.output.display(),
                        report.groups,
                        report.rows_ingested,
                        report.sources_read,
                        report.sources_skipped,
                        report.filter
                    )?;
                    if report.degenerate_cells > 0 {
                        writeln!(
                            output,
                            "    {} aggregated values are undefined (NaN)",
                            report.degenerate_cells
                        )?;
                    }
                }
                (_, error) => {
                    writeln!(
                        output,
                        "{} Error joining {} data",
                        Self::tag("[ERROR]", RED, color),
                        name
                    )?;
                    if let Some(error) = error {
                        writeln!(output, "    {}", error)?;
                    }
                }
            }
        }

        Ok(output)
    }

    fn tag(text: &str, ansi: &str, color: bool) -> String {
        if color {
            format!("{}{}{}", ansi, text, RESET)
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JoinError;
    use crate::model::ExecutionModel;
    use crate::reporter::sample_report;

    #[test]
    fn test_success_line() {
        let output = ConsoleReporter::format(&[JobOutcome::success(sample_report())], false).unwrap();
        let mut lines = output.lines();

        assert_eq!(lines.next().unwrap(), "[OK] MPI data joined successfully");
        let detail = lines.next().unwrap();
        assert!(detail.contains("MPI/joinedData.csv"));
        assert!(detail.contains("3 groups from 30 trials"));
        assert!(detail.contains("filter band"));
    }

    #[test]
    fn test_failure_line() {
        let error = JoinError::Config("no [[jobs]] configured".to_string());
        let outcome = JobOutcome::failure(ExecutionModel::OpenMp, &error);
        let output = ConsoleReporter::format(&[outcome], false).unwrap();

        assert!(output.starts_with("[ERROR] Error joining OpenMP data\n"));
        assert!(output.contains("no [[jobs]] configured"));
    }

    #[test]
    fn test_colored_tags() {
        let output = ConsoleReporter::format(&[JobOutcome::success(sample_report())], true).unwrap();
        assert!(output.starts_with("\x1b[92m[OK]\x1b[0m"));
    }

    #[test]
    fn test_degenerate_cells_are_mentioned() {
        let mut report = sample_report();
        report.degenerate_cells = 2;
        let output = ConsoleReporter::format(&[JobOutcome::success(report)], false).unwrap();
        assert!(output.contains("2 aggregated values are undefined"));
    }
}
