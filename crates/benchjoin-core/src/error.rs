use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JoinError {
    #[error("Source not found: {}: {reason}", path.display())]
    Discovery { path: PathBuf, reason: String },

    #[error("Shape mismatch in {}: {reason}", path.display())]
    ShapeMismatch { path: PathBuf, reason: String },

    #[error("Invalid value {value:?} in column '{column}' of {}", path.display())]
    InvalidValue {
        path: PathBuf,
        column: String,
        value: String,
    },

    #[error("No measurement rows found under {}", root.display())]
    EmptyInput { root: PathBuf },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("CSV error in {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl JoinError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        JoinError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        JoinError::Csv {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn shape(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        JoinError::ShapeMismatch {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn discovery(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        JoinError::Discovery {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, JoinError>;
