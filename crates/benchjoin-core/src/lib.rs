//! Benchmark result joiner for parallel execution models
//!
//! This crate turns the raw timing CSVs of repeated benchmark runs into one
//! summary table per execution model: one row per configuration, each
//! measured column reduced to a filtered mean of its trials.
//!
//! # Features
//!
//! - **Source layouts**: per-node directories (MPI, MPI+OpenMP) and
//!   per-stage files (OpenMP, Sequential)
//! - **Band filtering**: trials outside `mean ± z·SE` are dropped before
//!   averaging
//! - **Deterministic output**: groups sorted by key, order-independent sums
//! - **Atomic writes**: an existing summary is replaced whole or not at all
//! - **Multiple Output Formats**: Console and JSON job reports
//!
//! # Example
//!
//! ```no_run
//! use benchjoin_core::{Config, pipeline, reporter::{JobOutcome, OutputFormat, Reporter}};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_file("data/join.toml")?;
//!
//! let outcomes: Vec<JobOutcome> = config
//!     .build_jobs()?
//!     .iter()
//!     .map(|job| JobOutcome::from_result(job.model, pipeline::run(job)))
//!     .collect();
//!
//! Reporter::new(OutputFormat::Console).report(&outcomes)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! Jobs are configured using TOML files:
//!
//! ```toml
//! [[jobs]]
//! model = "mpi"
//! input = "MPI"
//! output = "MPI/joinedData.csv"
//!
//! [[jobs]]
//! model = "openmp"
//! input = "OpenMP"
//! output = "OpenMP/joinedData.csv"
//! band_z = 2.58
//! ```

pub mod config;
pub mod error;
pub mod label;
pub mod model;
pub mod pipeline;
pub mod reducer;
pub mod reporter;
pub mod shape;
pub mod sources;
pub mod stats;
pub mod table;

pub use config::{Config, JobConfig};
pub use error::{JoinError, Result};
pub use label::{LabelTemplate, LABEL_COLUMN};
pub use model::ExecutionModel;
pub use pipeline::{JoinJob, JoinReport};
pub use reducer::{Reduction, DEFAULT_DECIMALS};
pub use reporter::{JobOutcome, OutputFormat, Reporter};
pub use sources::{MetricFile, MetricFiles, NodeDirectories, SourceLayout};
pub use stats::{FilterMode, DEFAULT_BAND_Z};
pub use table::{Cell, Table};
