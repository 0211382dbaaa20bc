//! Join pipeline orchestration
//!
//! One [`JoinJob`] turns the raw files of one execution model into one
//! summary table:
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │ enumerate  │──▶│   ingest   │──▶│   reduce   │──▶│   label    │──▶│   write    │
//! │ (layout)   │   │ (shape)    │   │ (reducer)  │   │ (label)    │   │ (atomic)   │
//! └────────────┘   └────────────┘   └────────────┘   └────────────┘   └────────────┘
//! ```
//!
//! Stages run strictly in sequence. Any failure aborts the job before the
//! output path is touched, so a run either replaces the output file with a
//! complete table or leaves it as it was.
//!
//! # Example
//!
//! ```no_run
//! use benchjoin_core::{pipeline, ExecutionModel, JoinJob};
//!
//! # fn example() -> benchjoin_core::Result<()> {
//! let job = JoinJob::for_model(ExecutionModel::Mpi, "data/MPI", "data/MPI/joinedData.csv");
//! let report = pipeline::run(&job)?;
//! println!("{} groups written to {}", report.groups, report.output.display());
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use crate::error::{JoinError, Result};
use crate::label::{apply_labels, LabelTemplate};
use crate::model::ExecutionModel;
use crate::reducer::{reduce, Reduction};
use crate::sources::SourceLayout;
use crate::stats::FilterMode;
use crate::table::Table;

/// Everything needed to produce one summary table.
#[derive(Debug)]
pub struct JoinJob {
    pub model: ExecutionModel,
    /// Root directory of the raw files
    pub input: PathBuf,
    /// Summary CSV to (re)write
    pub output: PathBuf,
    pub layout: Box<dyn SourceLayout>,
    pub key_columns: Vec<String>,
    pub label: LabelTemplate,
    pub reduction: Reduction,
}

impl JoinJob {
    /// Job with the model's default layout, label and filter.
    pub fn for_model(
        model: ExecutionModel,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            model,
            input: input.into(),
            output: output.into(),
            layout: model.default_layout(),
            key_columns: model.key_columns().iter().map(|c| c.to_string()).collect(),
            label: LabelTemplate::parse(model.default_label())
                .expect("built-in label templates are well formed"),
            reduction: Reduction {
                filter: model.default_filter(),
                ..Reduction::default()
            },
        }
    }
}

/// Outcome of a successful join.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JoinReport {
    pub model: ExecutionModel,
    /// Summary file written (or that would be written)
    pub output: PathBuf,
    pub filter: FilterMode,
    /// Files that were read
    pub sources_read: usize,
    /// Zero-byte files that were skipped
    pub sources_skipped: usize,
    /// Trials read across all files
    pub rows_ingested: usize,
    /// Rows in the summary table
    pub groups: usize,
    /// Summary cells that came out undefined
    pub degenerate_cells: usize,
}

/// Run every stage except writing; return the labeled table.
#[instrument(skip(job), fields(model = %job.model, input = %job.input.display()))]
pub fn aggregate(job: &JoinJob) -> Result<(Table, JoinReport)> {
    let sources = job.layout.enumerate(&job.input)?;
    info!(sources = sources.len(), "enumerated source files");

    let ingested = job.layout.ingest(&sources)?;
    if ingested.table.is_empty() {
        return Err(JoinError::EmptyInput {
            root: job.input.clone(),
        });
    }
    info!(
        rows = ingested.table.len(),
        read = ingested.sources_read,
        skipped = ingested.sources_skipped,
        "ingested trials"
    );

    let reduced = reduce(&ingested.table, &job.key_columns, &job.reduction, &job.input)?;
    info!(
        groups = reduced.groups,
        filter = %job.reduction.filter,
        degenerate = reduced.degenerate_cells,
        "reduced trials"
    );

    let labeled = apply_labels(&reduced.table, &job.label)?;

    let report = JoinReport {
        model: job.model,
        output: job.output.clone(),
        filter: job.reduction.filter,
        sources_read: ingested.sources_read,
        sources_skipped: ingested.sources_skipped,
        rows_ingested: ingested.table.len(),
        groups: reduced.groups,
        degenerate_cells: reduced.degenerate_cells,
    };
    Ok((labeled, report))
}

/// Aggregate and persist the summary table.
#[instrument(skip(job), fields(model = %job.model, output = %job.output.display()))]
pub fn run(job: &JoinJob) -> Result<JoinReport> {
    let (table, report) = aggregate(job)?;
    write_atomic(&table, &job.output)?;
    info!(groups = report.groups, "wrote summary table");
    Ok(report)
}

/// Write `table` to `path` through a temporary file in the same directory.
pub fn write_atomic(table: &Table, path: &Path) -> Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&directory).map_err(|e| JoinError::io(&directory, e))?;

    let mut temp = NamedTempFile::new_in(&directory).map_err(|e| JoinError::io(&directory, e))?;
    table
        .write_csv(&mut temp)
        .map_err(|e| JoinError::csv(path, e))?;
    debug!(temp = %temp.path().display(), "serialized summary table");

    temp.persist(path).map_err(|e| JoinError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_for_model_presets() {
        let job = JoinJob::for_model(ExecutionModel::OpenMp, "in", "out.csv");
        assert_eq!(job.key_columns, vec!["Num Threads", "Schedule", "ChunkSize"]);
        assert_eq!(job.reduction.filter, FilterMode::Band);
        assert_eq!(job.reduction.decimals, Some(4));
    }

    #[test]
    fn test_aggregate_mpi() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("Node_1/run.csv"),
            "Processes,Gray(s),Total(s)\n4,0.5,1.0\n4,0.5,1.0\n",
        );
        write(
            &dir.path().join("Node_2/run.csv"),
            "Processes,Gray(s),Total(s)\n4,0.3,0.6\n4,0.3,0.6\n",
        );
        write(&dir.path().join("Node_2/crashed.csv"), "");

        let job = JoinJob::for_model(ExecutionModel::Mpi, dir.path(), dir.path().join("out.csv"));
        let (table, report) = aggregate(&job).unwrap();

        assert_eq!(
            table.columns(),
            &["Label", "Nodes", "Processes", "Gray(s)", "Total(s)"]
        );
        assert_eq!(table.rows()[1][0], Cell::Text("MPI: N 2, Prc 4".to_string()));
        assert_eq!(report.groups, 2);
        assert_eq!(report.sources_read, 2);
        assert_eq!(report.sources_skipped, 1);
        assert_eq!(report.rows_ingested, 4);
        assert!(!dir.path().join("out.csv").exists());
    }

    #[test]
    fn test_aggregate_all_sources_empty() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("Node_1/run.csv"), "");

        let job = JoinJob::for_model(ExecutionModel::Mpi, dir.path(), dir.path().join("out.csv"));
        let err = aggregate(&job).unwrap_err();
        assert!(matches!(err, JoinError::EmptyInput { .. }));
    }

    #[test]
    fn test_write_atomic_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out.csv");
        write(&path, "stale\n");

        let mut table = Table::new(vec!["Label".to_string()]);
        table.push_row(vec![Cell::Text("Sequential".to_string())]);
        write_atomic(&table, &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Label\nSequential\n");
        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
