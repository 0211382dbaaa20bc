//! Locating raw measurement files.
//!
//! Two layouts exist on disk:
//!
//! ```text
//! node directories                    metric files
//! ────────────────                    ────────────
//! MPI/                                OpenMP/
//! ├── Node_1/                         ├── gray/
//! │   ├── run-a.csv   (one trial      │   ├── time_read-pgm.csv  (one stage,
//! │   └── run-b.csv    per row)       │   └── time_G.csv          many trials)
//! └── Node_2/                         └── color/
//!     └── run-a.csv                       └── time_HSL.csv
//! ```
//!
//! A [`SourceLayout`] knows how to enumerate its files under an input root
//! and how to shape them into one row per trial (see [`crate::shape`]).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{JoinError, Result};
use crate::shape::{self, Ingested};

/// One raw file and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub origin: SourceOrigin,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceOrigin {
    /// File found inside a node directory
    Node(u32),
    /// File looked up by stage name
    Metric(String),
}

/// Strategy for finding and shaping the raw files of one execution model.
pub trait SourceLayout: fmt::Debug + Send + Sync {
    /// Find every source file under `root`.
    ///
    /// A missing root or a missing required file is a discovery error.
    fn enumerate(&self, root: &Path) -> Result<Vec<SourceFile>>;

    /// Read the enumerated files into one row per trial.
    fn ingest(&self, sources: &[SourceFile]) -> Result<Ingested>;
}

/// `Node_<n>` directories, each holding row-per-trial CSV files.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDirectories {
    /// Directory name prefix before the node number
    pub prefix: String,
    /// File extension to pick up (case-insensitive)
    pub extension: String,
    /// Column the node number is written to
    pub tag_column: String,
    /// Restrict to these nodes; every listed directory must exist
    pub nodes: Option<Vec<u32>>,
}

impl Default for NodeDirectories {
    fn default() -> Self {
        Self {
            prefix: "Node_".to_string(),
            extension: "csv".to_string(),
            tag_column: "Nodes".to_string(),
            nodes: None,
        }
    }
}

impl NodeDirectories {
    fn node_number(&self, name: &str) -> Option<u32> {
        name.strip_prefix(&self.prefix)?.parse().ok()
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }

    fn node_directories(&self, root: &Path) -> Result<BTreeMap<u32, PathBuf>> {
        let mut found = BTreeMap::new();
        for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| JoinError::io(root, e.into()))?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match self.node_number(&name) {
                Some(number) => {
                    let path = entry.into_path();
                    if let Some(previous) = found.insert(number, path.clone()) {
                        let (first, second) = if previous < path {
                            (previous, path)
                        } else {
                            (path, previous)
                        };
                        return Err(JoinError::discovery(
                            &second,
                            format!(
                                "node {} is also provided by {}",
                                number,
                                first.display()
                            ),
                        ));
                    }
                }
                None => debug!(directory = %name, "ignoring non-node directory"),
            }
        }
        Ok(found)
    }

    fn files_in(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| JoinError::io(directory, e.into()))?;
            if entry.file_type().is_file() && self.has_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

impl SourceLayout for NodeDirectories {
    fn enumerate(&self, root: &Path) -> Result<Vec<SourceFile>> {
        if !root.is_dir() {
            return Err(JoinError::discovery(root, "input directory does not exist"));
        }

        let found = self.node_directories(root)?;
        let selected: Vec<(u32, PathBuf)> = match &self.nodes {
            Some(nodes) => nodes
                .iter()
                .map(|number| {
                    found.get(number).cloned().map(|dir| (*number, dir)).ok_or_else(|| {
                        JoinError::discovery(
                            root.join(format!("{}{}", self.prefix, number)),
                            "node directory does not exist",
                        )
                    })
                })
                .collect::<Result<_>>()?,
            None => found.into_iter().collect(),
        };

        if selected.is_empty() {
            return Err(JoinError::discovery(
                root,
                format!("no '{}<n>' directories found", self.prefix),
            ));
        }

        let mut sources = Vec::new();
        for (number, directory) in selected {
            let files = self.files_in(&directory)?;
            debug!(node = number, files = files.len(), "scanned node directory");
            sources.extend(files.into_iter().map(|path| SourceFile {
                path,
                origin: SourceOrigin::Node(number),
            }));
        }
        Ok(sources)
    }

    fn ingest(&self, sources: &[SourceFile]) -> Result<Ingested> {
        shape::stack_node_files(sources, &self.tag_column)
    }
}

/// One stage's measurement file, relative to the input root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricFile {
    /// Output column the stage's values land in
    pub metric: String,
    /// Path relative to the input root
    pub path: PathBuf,
}

impl MetricFile {
    pub fn new(metric: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            metric: metric.into(),
            path: path.into(),
        }
    }
}

/// Copy of a descriptor column into the trial rows under a new name.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRename {
    pub source: String,
    pub target: String,
}

impl ColumnRename {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Fixed stage-name to file mapping; one file per measured stage.
///
/// The first file is the descriptor: besides its stage values it supplies
/// the per-trial configuration columns shared by every stage.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFiles {
    pub files: Vec<MetricFile>,
    /// Column holding the stage value in every file
    pub value_column: String,
    /// Descriptor columns placed before the stage columns
    pub leading: Vec<ColumnRename>,
    /// Descriptor columns placed after the stage columns
    pub trailing: Vec<ColumnRename>,
}

impl MetricFiles {
    /// Stage files written by the image contrast benchmarks.
    ///
    /// With `thread_descriptors` the thread count, schedule and chunk size
    /// of each trial are carried as leading columns.
    pub fn image_pipeline(thread_descriptors: bool) -> Self {
        let leading = if thread_descriptors {
            vec![
                ColumnRename::new("Threads", "Num Threads"),
                ColumnRename::new("Schedule", "Schedule"),
                ColumnRename::new("ChunkSize", "ChunkSize"),
            ]
        } else {
            Vec::new()
        };

        Self {
            files: default_image_files(),
            value_column: "Time (s)".to_string(),
            leading,
            trailing: vec![ColumnRename::new("TotalTime", "Total(s)")],
        }
    }
}

/// Default stage mapping for the image benchmarks.
pub fn default_image_files() -> Vec<MetricFile> {
    vec![
        MetricFile::new("ReadGray(s)", "gray/time_read-pgm.csv"),
        MetricFile::new("ReadColor(s)", "color/time_read-ppm.csv"),
        MetricFile::new("Gray(s)", "gray/time_G.csv"),
        MetricFile::new("Hsl(s)", "color/time_HSL.csv"),
        MetricFile::new("Yuv(s)", "color/time_YUV.csv"),
        MetricFile::new("WriteGray(s)", "gray/time_write-pgm.csv"),
        MetricFile::new("WriteHsl(s)", "color/time_write-HSL.csv"),
        MetricFile::new("WriteYuv(s)", "color/time_write-YUV.csv"),
    ]
}

impl SourceLayout for MetricFiles {
    fn enumerate(&self, root: &Path) -> Result<Vec<SourceFile>> {
        if !root.is_dir() {
            return Err(JoinError::discovery(root, "input directory does not exist"));
        }

        self.files
            .iter()
            .map(|file| {
                let path = root.join(&file.path);
                if path.is_file() {
                    Ok(SourceFile {
                        path,
                        origin: SourceOrigin::Metric(file.metric.clone()),
                    })
                } else {
                    Err(JoinError::discovery(
                        path,
                        format!("measurement file for '{}' does not exist", file.metric),
                    ))
                }
            })
            .collect()
    }

    fn ingest(&self, sources: &[SourceFile]) -> Result<Ingested> {
        shape::assemble_trials(sources, self)
    }
}
