//! Execution models and their presets.
//!
//! Each measurement regime lays its raw output out differently and is
//! grouped by different configuration columns. An [`ExecutionModel`] names
//! the regime and supplies the defaults a job starts from: group-key
//! columns, source layout, label template and filter mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sources::{MetricFiles, NodeDirectories, SourceLayout};
use crate::stats::FilterMode;

/// Measurement regime whose raw output is being joined.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExecutionModel {
    /// Distributed nodes, one CSV per run under `Node_<n>/`
    #[serde(rename = "mpi")]
    Mpi,
    /// Distributed nodes running threaded ranks
    #[serde(rename = "hybrid")]
    Hybrid,
    /// Thread-parallel, one CSV per measured stage
    #[serde(rename = "openmp")]
    OpenMp,
    /// Single-threaded, one CSV per measured stage
    #[serde(rename = "sequential")]
    Sequential,
}

impl ExecutionModel {
    pub const ALL: [ExecutionModel; 4] = [
        ExecutionModel::Mpi,
        ExecutionModel::Hybrid,
        ExecutionModel::OpenMp,
        ExecutionModel::Sequential,
    ];

    /// Identifier used in configuration files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionModel::Mpi => "mpi",
            ExecutionModel::Hybrid => "hybrid",
            ExecutionModel::OpenMp => "openmp",
            ExecutionModel::Sequential => "sequential",
        }
    }

    /// Human-facing name used in status messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            ExecutionModel::Mpi => "MPI",
            ExecutionModel::Hybrid => "MPI+OpenMP",
            ExecutionModel::OpenMp => "OpenMP",
            ExecutionModel::Sequential => "Sequential",
        }
    }

    /// Columns whose values identify one configuration.
    pub fn key_columns(&self) -> &'static [&'static str] {
        match self {
            ExecutionModel::Mpi => &["Nodes", "Processes"],
            ExecutionModel::Hybrid => &["Nodes", "Processes", "Num Threads"],
            ExecutionModel::OpenMp => &["Num Threads", "Schedule", "ChunkSize"],
            ExecutionModel::Sequential => &[],
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            ExecutionModel::Mpi => "MPI: N {Nodes}, Prc {Processes}",
            ExecutionModel::Hybrid => {
                "MPI+OpenMP: N {Nodes}, Prc {Processes}, Threads {Num Threads}"
            }
            ExecutionModel::OpenMp => {
                "OpenMP: Threads {Num Threads}, Schedule {Schedule}, ChunkSize {ChunkSize}"
            }
            ExecutionModel::Sequential => "Sequential",
        }
    }

    /// Filter applied when a job does not choose one.
    ///
    /// The single-run summary historically averaged every trial, so it keeps
    /// doing so unless a job asks for the band explicitly.
    pub fn default_filter(&self) -> FilterMode {
        match self {
            ExecutionModel::Sequential => FilterMode::Disabled,
            _ => FilterMode::Band,
        }
    }

    pub fn uses_node_directories(&self) -> bool {
        matches!(self, ExecutionModel::Mpi | ExecutionModel::Hybrid)
    }

    /// Source layout with default settings for this model.
    pub fn default_layout(&self) -> Box<dyn SourceLayout> {
        match self {
            ExecutionModel::Mpi | ExecutionModel::Hybrid => Box::new(NodeDirectories::default()),
            ExecutionModel::OpenMp => Box::new(MetricFiles::image_pipeline(true)),
            ExecutionModel::Sequential => Box::new(MetricFiles::image_pipeline(false)),
        }
    }
}

impl fmt::Display for ExecutionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mpi" => Ok(ExecutionModel::Mpi),
            "hybrid" | "mpi+openmp" | "mpi-openmp" => Ok(ExecutionModel::Hybrid),
            "openmp" => Ok(ExecutionModel::OpenMp),
            "sequential" => Ok(ExecutionModel::Sequential),
            other => Err(format!(
                "unknown execution model '{}', expected one of: mpi, hybrid, openmp, sequential",
                other
            )),
        }
    }
}
