//! Property-based tests for trial reduction
//!
//! Tests grouping, determinism and the bounds of the filtered mean using
//! proptest.

use std::collections::BTreeSet;
use std::path::Path;

use benchjoin_core::reducer::reduce;
use benchjoin_core::stats::{filtered_mean, round_to};
use benchjoin_core::{Cell, FilterMode, Reduction, Table, DEFAULT_BAND_Z};
use proptest::prelude::*;

// ============================================================
// Strategies
// ============================================================

/// Trial timings as they show up in benchmark output
fn timing() -> impl Strategy<Value = f64> {
    (1u32..1_000_000).prop_map(|micros| f64::from(micros) / 1_000_000.0)
}

fn filter_mode() -> impl Strategy<Value = FilterMode> {
    prop_oneof![Just(FilterMode::Band), Just(FilterMode::Disabled)]
}

/// (processes, time) trials over a handful of configurations
fn trials() -> impl Strategy<Value = Vec<(i64, f64)>> {
    prop::collection::vec((prop::sample::select(vec![1i64, 2, 4, 8]), timing()), 1..40)
}

fn trial_table(trials: &[(i64, f64)]) -> Table {
    let mut table = Table::new(vec!["Processes".to_string(), "Total(s)".to_string()]);
    for &(processes, time) in trials {
        table.push_row(vec![Cell::Int(processes), Cell::Float(time)]);
    }
    table
}

fn summarize(trials: &[(i64, f64)], reduction: &Reduction) -> String {
    let reduced = reduce(
        &trial_table(trials),
        &["Processes".to_string()],
        reduction,
        Path::new("trials.csv"),
    )
    .unwrap();
    reduced.table.to_csv_string().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ============================================================
    // Filtered Mean
    // ============================================================

    #[test]
    fn filtered_mean_is_nan_or_within_range(
        samples in prop::collection::vec(timing(), 0..50),
        mode in filter_mode(),
    ) {
        let value = filtered_mean(&samples, mode, DEFAULT_BAND_Z);
        if !value.is_nan() {
            let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
            let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            // Summing n equal values and dividing by n can drift by an ulp
            let slack = 1e-12;
            prop_assert!(
                value >= min - slack && value <= max + slack,
                "{} outside [{}, {}]", value, min, max
            );
        }
    }

    #[test]
    fn unfiltered_mean_defined_for_any_nonempty_sample(
        samples in prop::collection::vec(timing(), 1..50),
    ) {
        prop_assert!(!filtered_mean(&samples, FilterMode::Disabled, DEFAULT_BAND_Z).is_nan());
    }

    #[test]
    fn filtered_mean_ignores_trial_order(
        samples in prop::collection::vec(timing(), 0..50).prop_shuffle(),
        mode in filter_mode(),
    ) {
        let mut sorted = samples.clone();
        sorted.sort_by(f64::total_cmp);

        let shuffled = filtered_mean(&samples, mode, DEFAULT_BAND_Z);
        let ordered = filtered_mean(&sorted, mode, DEFAULT_BAND_Z);
        prop_assert!(shuffled.to_bits() == ordered.to_bits() || (shuffled.is_nan() && ordered.is_nan()));
    }

    // ============================================================
    // Rounding
    // ============================================================

    #[test]
    fn rounding_is_idempotent(value in timing(), decimals in 0u32..8) {
        let once = round_to(value, decimals);
        prop_assert_eq!(round_to(once, decimals), once);
    }

    // ============================================================
    // Grouping
    // ============================================================

    #[test]
    fn one_row_per_distinct_key(trials in trials()) {
        let reduced = reduce(
            &trial_table(&trials),
            &["Processes".to_string()],
            &Reduction::default(),
            Path::new("trials.csv"),
        )
        .unwrap();

        let distinct: BTreeSet<i64> = trials.iter().map(|(processes, _)| *processes).collect();
        let keys: Vec<i64> = reduced
            .table
            .rows()
            .iter()
            .map(|row| match row[0] {
                Cell::Int(processes) => processes,
                ref other => panic!("unexpected key {other:?}"),
            })
            .collect();

        prop_assert_eq!(keys, distinct.into_iter().collect::<Vec<_>>());
        prop_assert_eq!(reduced.groups, reduced.table.len());
    }

    #[test]
    fn summary_independent_of_row_order(
        trials in trials().prop_shuffle(),
        mode in filter_mode(),
    ) {
        let reduction = Reduction { filter: mode, ..Reduction::default() };
        let mut sorted = trials.clone();
        sorted.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

        prop_assert_eq!(summarize(&trials, &reduction), summarize(&sorted, &reduction));
    }
}
