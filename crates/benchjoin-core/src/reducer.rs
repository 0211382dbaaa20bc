//! Collapsing trials into one row per configuration.
//!
//! Rows are grouped by exact equality of their group-key columns (numeric
//! keys compare by value) and every remaining column is reduced
//! independently with [`filtered_mean`]. Groups come out in ascending key
//! order so the summary is reproducible for a given input.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{JoinError, Result};
use crate::stats::{filtered_mean, round_to, FilterMode, DEFAULT_BAND_Z};
use crate::table::{Cell, Table};

/// Decimal places kept in the summary unless configured otherwise.
pub const DEFAULT_DECIMALS: u32 = 4;

/// How each metric column of a group is reduced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reduction {
    pub filter: FilterMode,
    /// Band half-width in standard errors
    pub band_z: f64,
    /// Round results to this many decimals; `None` keeps full precision
    pub decimals: Option<u32>,
}

impl Default for Reduction {
    fn default() -> Self {
        Self {
            filter: FilterMode::Band,
            band_z: DEFAULT_BAND_Z,
            decimals: Some(DEFAULT_DECIMALS),
        }
    }
}

impl Reduction {
    /// Reduce one column's trial values to a single number.
    pub fn apply(&self, samples: &[f64]) -> f64 {
        let value = filtered_mean(samples, self.filter, self.band_z);
        match self.decimals {
            Some(decimals) => round_to(value, decimals),
            None => value,
        }
    }
}

/// One row per group.
#[derive(Debug, Clone)]
pub struct Reduced {
    /// Key columns first, then reduced metric columns
    pub table: Table,
    pub groups: usize,
    /// Aggregated cells that came out undefined (`NaN`)
    pub degenerate_cells: usize,
}

/// Group `table` by `key_columns` and reduce every other column.
///
/// `origin` names the data in errors. Metric cells must be numeric or empty;
/// empty and `NaN` cells do not count as trials.
pub fn reduce(
    table: &Table,
    key_columns: &[String],
    reduction: &Reduction,
    origin: &Path,
) -> Result<Reduced> {
    let key_indices = key_columns
        .iter()
        .map(|name| {
            table.column_index(name).ok_or_else(|| {
                JoinError::shape(origin, format!("missing group-key column '{}'", name))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let metric_indices: Vec<usize> = (0..table.columns().len())
        .filter(|index| !key_indices.contains(index))
        .collect();

    let mut groups: BTreeMap<Vec<Cell>, Vec<&[Cell]>> = BTreeMap::new();
    for row in table.rows() {
        let key = key_indices.iter().map(|&index| row[index].clone()).collect();
        groups.entry(key).or_default().push(row.as_slice());
    }
    debug!(groups = groups.len(), rows = table.len(), "grouped trials");

    let columns = key_indices
        .iter()
        .chain(&metric_indices)
        .map(|&index| table.columns()[index].clone())
        .collect();
    let mut reduced = Table::new(columns);
    let mut degenerate_cells = 0;

    for (key, rows) in &groups {
        let mut output = key.clone();
        for &index in &metric_indices {
            let column = &table.columns()[index];
            let samples = column_samples(rows, index, column, origin)?;
            let value = reduction.apply(&samples);
            if value.is_nan() {
                degenerate_cells += 1;
                warn!(
                    column = %column,
                    key = ?key.iter().map(Cell::to_string).collect::<Vec<_>>(),
                    trials = samples.len(),
                    "aggregated value is undefined"
                );
            }
            output.push(Cell::Float(value));
        }
        reduced.push_row(output);
    }

    Ok(Reduced {
        groups: groups.len(),
        table: reduced,
        degenerate_cells,
    })
}

fn column_samples(rows: &[&[Cell]], index: usize, column: &str, origin: &Path) -> Result<Vec<f64>> {
    let mut samples = Vec::with_capacity(rows.len());
    for row in rows {
        match &row[index] {
            Cell::Missing => {}
            cell => match cell.as_f64() {
                // A written-out NaN counts as a missing trial
                Some(value) if value.is_nan() => {}
                Some(value) => samples.push(value),
                None => {
                    return Err(JoinError::InvalidValue {
                        path: origin.to_path_buf(),
                        column: column.to_string(),
                        value: cell.to_string(),
                    })
                }
            },
        }
    }
    Ok(samples)
}
