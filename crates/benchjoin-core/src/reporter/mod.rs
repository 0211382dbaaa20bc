//! Join outcome reporting
//!
//! This module formats the outcome of one or more join jobs for people and
//! for scripts.
//!
//! # Output Formats
//!
//! - **Console**: `[OK]` / `[ERROR]` status lines, optionally colored
//! - **JSON**: Machine-readable format for CI integration
//!
//! # Example
//!
//! ```no_run
//! use benchjoin_core::{pipeline, ExecutionModel, JoinJob};
//! use benchjoin_core::reporter::{JobOutcome, OutputFormat, Reporter};
//!
//! # fn example() -> anyhow::Result<()> {
//! let job = JoinJob::for_model(ExecutionModel::Sequential, "Sequential", "Sequential/joinedData.csv");
//! let outcome = JobOutcome::from_result(job.model, pipeline::run(&job));
//!
//! Reporter::new(OutputFormat::Console).report(&[outcome])?;
//! # Ok(())
//! # }
//! ```

mod console;
mod json;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use crate::model::ExecutionModel;
use crate::pipeline::JoinReport;

pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// Output format for join outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Status lines for a terminal
    #[default]
    Console,
    /// JSON format for machine parsing
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            "json-pretty" => Ok(OutputFormat::JsonPretty),
            other => Err(format!(
                "unknown output format '{}', expected console, json or json-pretty",
                other
            )),
        }
    }
}

/// Result of one job, successful or not
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobOutcome {
    pub model: ExecutionModel,
    pub success: bool,
    /// Present when the job succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<JoinReport>,
    /// Error chain, outermost first, when the job failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobOutcome {
    pub fn success(report: JoinReport) -> Self {
        Self {
            model: report.model,
            success: true,
            report: Some(report),
            error: None,
        }
    }

    pub fn failure(model: ExecutionModel, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            model,
            success: false,
            report: None,
            error: Some(message),
        }
    }

    pub fn from_result<E>(model: ExecutionModel, result: std::result::Result<JoinReport, E>) -> Self
    where
        E: std::error::Error + 'static,
    {
        match result {
            Ok(report) => Self::success(report),
            Err(error) => Self::failure(model, &error),
        }
    }
}

/// Reporter for join outcomes
pub struct Reporter {
    format: OutputFormat,
    color: bool,
}

impl Reporter {
    /// Create a new reporter with the specified output format
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: false,
        }
    }

    /// Emit ANSI colors in console output
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Report outcomes to stdout
    pub fn report(&self, outcomes: &[JobOutcome]) -> Result<()> {
        let output = self.format_outcomes(outcomes)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    /// Format outcomes as a string
    pub fn format_outcomes(&self, outcomes: &[JobOutcome]) -> Result<String> {
        match self.format {
            OutputFormat::Console => ConsoleReporter::format(outcomes, self.color),
            OutputFormat::Json => JsonReporter::format(outcomes, false),
            OutputFormat::JsonPretty => JsonReporter::format(outcomes, true),
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

#[cfg(test)]
pub(crate) fn sample_report() -> JoinReport {
    use crate::stats::FilterMode;

    JoinReport {
        model: ExecutionModel::Mpi,
        output: "MPI/joinedData.csv".into(),
        filter: FilterMode::Band,
        sources_read: 6,
        sources_skipped: 1,
        rows_ingested: 30,
        groups: 3,
        degenerate_cells: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JoinError;

    #[test]
    fn test_failure_collects_error_chain() {
        let error = JoinError::Io {
            path: "MPI/Node_1".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let outcome = JobOutcome::failure(ExecutionModel::Mpi, &error);

        assert!(!outcome.success);
        let message = outcome.error.unwrap();
        assert!(message.starts_with("I/O error on MPI/Node_1"));
        assert!(message.ends_with(": denied"));
    }

    #[test]
    fn test_from_result_success() {
        let outcome =
            JobOutcome::from_result::<JoinError>(ExecutionModel::Mpi, Ok(sample_report()));
        assert!(outcome.success);
        assert_eq!(outcome.report.unwrap().groups, 3);
    }

    #[test]
    fn test_reporter_console_format() {
        let reporter = Reporter::new(OutputFormat::Console);
        let output = reporter
            .format_outcomes(&[JobOutcome::success(sample_report())])
            .unwrap();
        assert!(output.contains("[OK]"));
    }

    #[test]
    fn test_reporter_json_format() {
        let reporter = Reporter::new(OutputFormat::Json);
        let output = reporter
            .format_outcomes(&[JobOutcome::success(sample_report())])
            .unwrap();
        assert!(output.contains("\"model\":\"mpi\""));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_default_format() {
        let reporter = Reporter::default();
        assert_eq!(reporter.format, OutputFormat::Console);
        assert!(!reporter.color);
    }
}
