//! Shaping raw files into one row per trial.
//!
//! Node files are already row-per-trial and only need the node number
//! attached. Stage files hold one stage across many trials, so trial `i` is
//! assembled by taking row `i` of every stage file; all stage files must
//! therefore agree on their row count.

use std::fs;

use tracing::{debug, warn};

use crate::error::{JoinError, Result};
use crate::sources::{MetricFiles, SourceFile, SourceOrigin};
use crate::table::{Cell, Table};

/// Trials read from one layout.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    /// One row per trial
    pub table: Table,
    /// Files that contributed rows (or at least a header)
    pub sources_read: usize,
    /// Zero-byte files that were skipped
    pub sources_skipped: usize,
}

fn is_empty_file(source: &SourceFile) -> Result<bool> {
    let metadata = fs::metadata(&source.path).map_err(|e| JoinError::io(&source.path, e))?;
    Ok(metadata.len() == 0)
}

/// Concatenate node files, tagging every row with its node number.
///
/// Zero-byte files contribute no trials and are not an error.
pub fn stack_node_files(sources: &[SourceFile], tag_column: &str) -> Result<Ingested> {
    let mut ingested = Ingested::default();

    for source in sources {
        let node = match &source.origin {
            SourceOrigin::Node(number) => *number,
            SourceOrigin::Metric(metric) => {
                return Err(JoinError::shape(
                    &source.path,
                    format!("expected a node file, got measurement file for '{}'", metric),
                ))
            }
        };

        if is_empty_file(source)? {
            warn!(path = %source.path.display(), "skipping empty source file");
            ingested.sources_skipped += 1;
            continue;
        }

        let mut table = Table::read_csv(&source.path)?;
        if table.column_index(tag_column).is_some() {
            return Err(JoinError::shape(
                &source.path,
                format!("already has a '{}' column", tag_column),
            ));
        }
        table.insert_column(0, tag_column, Cell::Int(i64::from(node)));
        debug!(path = %source.path.display(), node, rows = table.len(), "read node file");

        ingested.table.extend_from(table, &source.path)?;
        ingested.sources_read += 1;
    }

    Ok(ingested)
}

/// Zip stage files into trial rows.
///
/// Columns come out as `leading descriptors, stages..., trailing
/// descriptors`. The first source is the descriptor file.
pub fn assemble_trials(sources: &[SourceFile], layout: &MetricFiles) -> Result<Ingested> {
    let mut ingested = Ingested::default();
    let mut stages: Vec<(String, &SourceFile, Table)> = Vec::with_capacity(sources.len());

    for source in sources {
        let metric = match &source.origin {
            SourceOrigin::Metric(metric) => metric.clone(),
            SourceOrigin::Node(node) => {
                return Err(JoinError::shape(
                    &source.path,
                    format!("expected a measurement file, got node {} file", node),
                ))
            }
        };

        let table = if is_empty_file(source)? {
            warn!(path = %source.path.display(), %metric, "measurement file is empty");
            ingested.sources_skipped += 1;
            Table::default()
        } else {
            let table = Table::read_csv(&source.path)?;
            if table.column_index(&layout.value_column).is_none() {
                return Err(JoinError::shape(
                    &source.path,
                    format!("missing '{}' column", layout.value_column),
                ));
            }
            ingested.sources_read += 1;
            table
        };
        debug!(path = %source.path.display(), %metric, rows = table.len(), "read measurement file");
        stages.push((metric, source, table));
    }

    let Some((_, descriptor_source, descriptor)) = stages.first() else {
        return Ok(ingested);
    };
    let trials = descriptor.len();

    for (metric, source, table) in &stages {
        if table.len() != trials {
            return Err(JoinError::shape(
                &source.path,
                format!(
                    "'{}' has {} trials but '{}' has {}",
                    metric,
                    table.len(),
                    descriptor_source.path.display(),
                    trials
                ),
            ));
        }
    }

    if trials == 0 {
        return Ok(ingested);
    }

    let descriptor_index = |rename: &crate::sources::ColumnRename| {
        descriptor.column_index(&rename.source).ok_or_else(|| {
            JoinError::shape(
                &descriptor_source.path,
                format!("missing descriptor column '{}'", rename.source),
            )
        })
    };
    let leading = layout
        .leading
        .iter()
        .map(descriptor_index)
        .collect::<Result<Vec<_>>>()?;
    let trailing = layout
        .trailing
        .iter()
        .map(descriptor_index)
        .collect::<Result<Vec<_>>>()?;
    let values: Vec<usize> = stages
        .iter()
        .filter_map(|(_, _, table)| table.column_index(&layout.value_column))
        .collect();

    let columns = layout
        .leading
        .iter()
        .map(|rename| rename.target.clone())
        .chain(stages.iter().map(|(metric, _, _)| metric.clone()))
        .chain(layout.trailing.iter().map(|rename| rename.target.clone()))
        .collect();
    let mut table = Table::new(columns);

    for trial in 0..trials {
        let descriptor_row = &descriptor.rows()[trial];
        let mut row: Vec<Cell> = leading
            .iter()
            .map(|&index| descriptor_row[index].clone())
            .collect();
        row.extend(
            stages
                .iter()
                .zip(&values)
                .map(|((_, _, stage), &index)| stage.rows()[trial][index].clone()),
        );
        row.extend(trailing.iter().map(|&index| descriptor_row[index].clone()));
        table.push_row(row);
    }

    ingested.table = table;
    Ok(ingested)
}
