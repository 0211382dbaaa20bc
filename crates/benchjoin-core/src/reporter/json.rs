//! JSON reporter for join outcomes

use super::JobOutcome;
use anyhow::Result;

/// JSON format reporter
pub struct JsonReporter;

impl JsonReporter {
    /// Format outcomes as a JSON array, one line per call
    pub fn format(outcomes: &[JobOutcome], pretty: bool) -> Result<String> {
        let mut output = if pretty {
            serde_json::to_string_pretty(outcomes)?
        } else {
            serde_json::to_string(outcomes)?
        };
        output.push('\n');
        Ok(output)
    }
}
