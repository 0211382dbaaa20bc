//! Statistical reduction of repeated trials
//!
//! This module provides the per-column reduction used when collapsing a group
//! of trials into one summary row: sample moments, confidence-band trimming,
//! and rounding.
//!
//! # Examples
//!
//! ```
//! use benchjoin_core::stats::{filtered_mean, round_to, FilterMode, DEFAULT_BAND_Z};
//!
//! // Four trials of the same configuration, one of them disturbed
//! let trials = vec![1.00, 1.02, 0.98, 5.00];
//!
//! let value = round_to(filtered_mean(&trials, FilterMode::Band, DEFAULT_BAND_Z), 4);
//! assert_eq!(value, 1.0);
//! ```

pub mod band;
pub mod moments;

pub use band::{filtered_mean, ConfidenceBand, FilterMode, DEFAULT_BAND_Z};
pub use moments::{mean, round_to, sample_std_dev, standard_error};
