//! Sample moments and rounding for trial measurements.
//!
//! All functions follow NaN-propagation rather than returning `Option`: a
//! group whose statistic is undefined must still produce a cell in the
//! summary table, and `NaN` is what ends up there.

/// Arithmetic mean of the samples.
///
/// Values are summed in ascending order so the result does not depend on the
/// order the trials were read in. Returns `NaN` for an empty slice.
///
/// # Examples
///
/// ```
/// use benchjoin_core::stats::moments::mean;
///
/// assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
/// assert!(mean(&[]).is_nan());
/// ```
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }
    let sorted = sorted_copy(samples);
    let sum: f64 = sorted.iter().sum();
    sum / sorted.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
///
/// Undefined, and therefore `NaN`, for fewer than two samples.
pub fn sample_std_dev(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return f64::NAN;
    }
    let mean = mean(samples);
    let squared_diffs: f64 = sorted_copy(samples)
        .iter()
        .map(|&x| (x - mean).powi(2))
        .sum();
    (squared_diffs / (samples.len() - 1) as f64).sqrt()
}

/// Standard error of the mean: `stdev / sqrt(n)`.
pub fn standard_error(samples: &[f64]) -> f64 {
    sample_std_dev(samples) / (samples.len() as f64).sqrt()
}

/// Round to `decimals` places, ties to even.
///
/// Re-rounding an already rounded value is a no-op.
///
/// # Examples
///
/// ```
/// use benchjoin_core::stats::moments::round_to;
///
/// assert_eq!(round_to(0.123456, 4), 0.1235);
/// assert_eq!(round_to(round_to(0.123456, 4), 4), 0.1235);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round_ties_even() / factor
}

fn sorted_copy(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_basic() {
        assert_eq!(mean(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 5.0);
    }

    #[test]
    fn test_mean_empty_is_nan() {
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_mean_ignores_input_order() {
        let forward = [0.1, 0.2, 0.3, 1e-9, 7.7];
        let backward = [7.7, 1e-9, 0.3, 0.2, 0.1];
        assert_eq!(mean(&forward).to_bits(), mean(&backward).to_bits());
    }

    #[test]
    fn test_sample_std_dev_known_values() {
        let samples = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let expected = (32.0_f64 / 7.0).sqrt();
        assert!((sample_std_dev(&samples) - expected).abs() < 1e-10);
    }

    #[test]
    fn test_sample_std_dev_needs_two_samples() {
        assert!(sample_std_dev(&[42.0]).is_nan());
        assert!(sample_std_dev(&[]).is_nan());
    }

    #[test]
    fn test_sample_std_dev_constant_is_zero() {
        assert_eq!(sample_std_dev(&[3.0, 3.0, 3.0]), 0.0);
    }

    #[test]
    fn test_standard_error() {
        let samples = [1.0, 1.02, 0.98, 5.0];
        let expected = sample_std_dev(&samples) / 2.0;
        assert!((standard_error(&samples) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_round_to_four_places() {
        assert_eq!(round_to(1.23456789, 4), 1.2346);
        assert_eq!(round_to(0.99999, 4), 1.0);
    }

    #[test]
    fn test_round_to_ties_even() {
        assert_eq!(round_to(0.5, 0), 0.0);
        assert_eq!(round_to(1.5, 0), 2.0);
        assert_eq!(round_to(2.5, 0), 2.0);
    }

    #[test]
    fn test_round_to_passes_nan_through() {
        assert!(round_to(f64::NAN, 4).is_nan());
        assert_eq!(round_to(f64::INFINITY, 4), f64::INFINITY);
    }
}
