//! Configuration parsing for join jobs
//!
//! Jobs are described in TOML. Relative paths are resolved against the
//! directory holding the configuration file, never against the process
//! working directory.
//!
//! ```toml
//! [[jobs]]
//! model = "mpi"
//! input = "MPI"
//! output = "MPI/joinedData.csv"
//! nodes = [1, 2, 3]
//!
//! [[jobs]]
//! model = "sequential"
//! input = "Sequential"
//! output = "Sequential/joinedData.csv"
//! filter = "band"
//!
//! [[jobs]]
//! model = "openmp"
//! input = "OpenMP"
//! output = "OpenMP/joinedData.csv"
//! label = "OMP {Num Threads}/{Schedule}/{ChunkSize}"
//!
//! [[jobs.files]]
//! metric = "Gray(s)"
//! path = "gray/time_G.csv"
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{JoinError, Result};
use crate::label::{LabelTemplate, LABEL_COLUMN};
use crate::model::ExecutionModel;
use crate::pipeline::JoinJob;
use crate::reducer::{Reduction, DEFAULT_DECIMALS};
use crate::sources::{MetricFile, MetricFiles, NodeDirectories, SourceLayout};
use crate::stats::{FilterMode, DEFAULT_BAND_Z};

/// Largest supported rounding precision
pub const MAX_DECIMALS: u32 = 12;

/// Configuration file holding any number of jobs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML is malformed
    /// - Required fields are missing
    ///
    /// # Example
    ///
    /// ```no_run
    /// use benchjoin_core::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = Config::from_file("data/join.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config.base_dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(config)
    }

    /// Parse configuration from a TOML string
    ///
    /// Relative paths resolve against `.` until a base directory is set.
    ///
    /// # Example
    ///
    /// ```
    /// use benchjoin_core::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let toml = r#"
    ///     [[jobs]]
    ///     model = "openmp"
    ///     input = "OpenMP"
    ///     output = "OpenMP/joinedData.csv"
    /// "#;
    /// let config = Config::from_str(toml)?;
    /// assert_eq!(config.jobs.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let mut config: Config = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.base_dir = PathBuf::from(".");
        Ok(config)
    }

    /// Build every job, resolving paths against the base directory
    pub fn build_jobs(&self) -> Result<Vec<JoinJob>> {
        if self.jobs.is_empty() {
            return Err(JoinError::Config("no [[jobs]] configured".to_string()));
        }
        self.jobs.iter().map(|job| job.build(&self.base_dir)).collect()
    }
}

/// Settings for one join job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Execution model whose files are joined
    pub model: ExecutionModel,
    /// Root directory of the raw files
    pub input: PathBuf,
    /// Summary CSV to write
    pub output: PathBuf,
    /// Trial filter (default depends on the model)
    #[serde(default)]
    pub filter: Option<FilterMode>,
    /// Band half-width in standard errors (default: 1.96)
    #[serde(default = "default_band_z")]
    pub band_z: f64,
    /// Decimal places kept (default: 4)
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    /// Round aggregated values at all (default: true)
    #[serde(default = "default_round")]
    pub round: bool,
    /// Node numbers to include (node-directory models only)
    #[serde(default)]
    pub nodes: Option<Vec<u32>>,
    /// Node directory prefix (default: "Node_")
    #[serde(default)]
    pub node_prefix: Option<String>,
    /// Label template override
    #[serde(default)]
    pub label: Option<String>,
    /// Stage file mapping override (fixed-mapping models only)
    #[serde(default)]
    pub files: Option<Vec<MetricFile>>,
}

fn default_band_z() -> f64 {
    DEFAULT_BAND_Z
}

fn default_decimals() -> u32 {
    DEFAULT_DECIMALS
}

fn default_round() -> bool {
    true
}

impl JobConfig {
    pub fn new(model: ExecutionModel, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            model,
            input: input.into(),
            output: output.into(),
            filter: None,
            band_z: DEFAULT_BAND_Z,
            decimals: DEFAULT_DECIMALS,
            round: true,
            nodes: None,
            node_prefix: None,
            label: None,
            files: None,
        }
    }

    /// Check settings that do not depend on the filesystem
    pub fn validate(&self) -> Result<()> {
        if self.decimals > MAX_DECIMALS {
            return Err(JoinError::Config(format!(
                "decimals must be at most {}, got {}",
                MAX_DECIMALS, self.decimals
            )));
        }
        if !self.band_z.is_finite() || self.band_z <= 0.0 {
            return Err(JoinError::Config(format!(
                "band_z must be a positive number, got {}",
                self.band_z
            )));
        }

        if self.model.uses_node_directories() {
            if self.files.is_some() {
                return Err(JoinError::Config(format!(
                    "'files' does not apply to the {} model",
                    self.model
                )));
            }
            if self.nodes.as_ref().is_some_and(Vec::is_empty) {
                return Err(JoinError::Config("'nodes' must not be empty".to_string()));
            }
            if self.node_prefix.as_ref().is_some_and(String::is_empty) {
                return Err(JoinError::Config("'node_prefix' must not be empty".to_string()));
            }
        } else {
            if self.nodes.is_some() || self.node_prefix.is_some() {
                return Err(JoinError::Config(format!(
                    "'nodes' and 'node_prefix' do not apply to the {} model",
                    self.model
                )));
            }
            if let Some(files) = &self.files {
                validate_files(files, self.model)?;
            }
        }

        let template = self.label_template()?;
        for field in template.fields() {
            if !self.model.key_columns().contains(&field) {
                return Err(JoinError::Config(format!(
                    "label placeholder '{{{}}}' is not a group-key column of the {} model (expected one of {:?})",
                    field,
                    self.model,
                    self.model.key_columns()
                )));
            }
        }
        Ok(())
    }

    fn label_template(&self) -> Result<LabelTemplate> {
        LabelTemplate::parse(self.label.as_deref().unwrap_or(self.model.default_label()))
    }

    fn layout(&self) -> Box<dyn SourceLayout> {
        if self.model.uses_node_directories() {
            let defaults = NodeDirectories::default();
            Box::new(NodeDirectories {
                prefix: self.node_prefix.clone().unwrap_or(defaults.prefix),
                nodes: self.nodes.clone(),
                ..NodeDirectories::default()
            })
        } else {
            let mut layout = MetricFiles::image_pipeline(self.model == ExecutionModel::OpenMp);
            if let Some(files) = &self.files {
                layout.files = files.clone();
            }
            Box::new(layout)
        }
    }

    /// Validate and turn into a runnable job; relative paths join `base_dir`
    pub fn build(&self, base_dir: &Path) -> Result<JoinJob> {
        self.validate()?;

        let reduction = Reduction {
            filter: self.filter.unwrap_or(self.model.default_filter()),
            band_z: self.band_z,
            decimals: self.round.then_some(self.decimals),
        };

        Ok(JoinJob {
            model: self.model,
            input: base_dir.join(&self.input),
            output: base_dir.join(&self.output),
            layout: self.layout(),
            key_columns: self.model.key_columns().iter().map(|c| c.to_string()).collect(),
            label: self.label_template()?,
            reduction,
        })
    }
}

fn validate_files(files: &[MetricFile], model: ExecutionModel) -> Result<()> {
    if files.is_empty() {
        return Err(JoinError::Config("'files' must list at least one stage".to_string()));
    }

    let reserved: HashSet<&str> = model
        .key_columns()
        .iter()
        .copied()
        .chain(["Total(s)", LABEL_COLUMN])
        .collect();
    let mut seen = HashSet::new();
    for file in files {
        if file.metric.trim().is_empty() {
            return Err(JoinError::Config("stage name must not be empty".to_string()));
        }
        if reserved.contains(file.metric.as_str()) {
            return Err(JoinError::Config(format!(
                "stage name '{}' collides with a reserved column",
                file.metric
            )));
        }
        if !seen.insert(file.metric.as_str()) {
            return Err(JoinError::Config(format!("stage '{}' listed twice", file.metric)));
        }
    }
    Ok(())
}
