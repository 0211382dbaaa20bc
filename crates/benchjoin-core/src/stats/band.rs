//! Confidence-band trimming of repeated trials.
//!
//! Trials outside `mean ± z * stderr` of the raw sample are discarded and
//! the remainder is re-averaged. This is an outlier-trimming average, not a
//! confidence interval estimate: the band only decides which trials count.

use serde::{Deserialize, Serialize};

use super::moments::{mean, standard_error};

/// Default band multiplier (two-sided 95%).
pub const DEFAULT_BAND_Z: f64 = 1.96;

/// How the trials of one group are averaged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Keep only trials inside the confidence band, then average
    #[default]
    Band,
    /// Average every trial
    Disabled,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::Band => "band",
            FilterMode::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "band" => Ok(FilterMode::Band),
            "disabled" | "none" => Ok(FilterMode::Disabled),
            other => Err(format!(
                "unknown filter mode '{}', expected 'band' or 'disabled'",
                other
            )),
        }
    }
}

/// Band around the raw mean of a sample.
#[derive(Debug, Clone)]
pub struct ConfidenceBand {
    /// Mean of all samples
    pub mean: f64,
    /// Standard error of the mean
    pub std_error: f64,
    /// Lower bound (mean - z * stderr)
    pub lower: f64,
    /// Upper bound (mean + z * stderr)
    pub upper: f64,
}

impl ConfidenceBand {
    /// Compute the band for `samples`.
    ///
    /// Returns `None` for an empty sample. With a single sample the standard
    /// error is undefined, so both bounds are `NaN` and the band contains
    /// nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use benchjoin_core::stats::band::ConfidenceBand;
    ///
    /// let band = ConfidenceBand::from_samples(&[1.0, 1.02, 0.98, 5.0], 1.96).unwrap();
    /// assert_eq!(band.mean, 2.0);
    /// assert!(band.contains(1.0));
    /// assert!(!band.contains(5.0));
    /// ```
    pub fn from_samples(samples: &[f64], z: f64) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mean = mean(samples);
        let std_error = standard_error(samples);
        Some(ConfidenceBand {
            mean,
            std_error,
            lower: mean - z * std_error,
            upper: mean + z * std_error,
        })
    }

    /// Whether `value` lies inside the band, bounds included.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Samples inside the band, in their original order.
    pub fn retain(&self, samples: &[f64]) -> Vec<f64> {
        samples
            .iter()
            .copied()
            .filter(|&value| self.contains(value))
            .collect()
    }
}

/// Average of `samples` under the given filter mode.
///
/// Under [`FilterMode::Band`] an empty filtered subset yields `NaN`; this is
/// inherent to the method and is not masked.
///
/// # Examples
///
/// ```
/// use benchjoin_core::stats::band::{filtered_mean, FilterMode};
///
/// let trials = [1.0, 1.02, 0.98, 5.0];
/// assert!((filtered_mean(&trials, FilterMode::Band, 1.96) - 1.0).abs() < 1e-12);
/// assert!((filtered_mean(&trials, FilterMode::Disabled, 1.96) - 2.0).abs() < 1e-12);
/// ```
pub fn filtered_mean(samples: &[f64], mode: FilterMode, z: f64) -> f64 {
    match mode {
        FilterMode::Disabled => mean(samples),
        FilterMode::Band => match ConfidenceBand::from_samples(samples, z) {
            Some(band) => mean(&band.retain(samples)),
            None => f64::NAN,
        },
    }
}
