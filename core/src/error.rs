//! Error types for table loading and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal failure while reading a table directory. Propagated to the caller.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

impl TableError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TableError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Why a single table line was rejected. The loader logs it and moves on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineError {
    #[error("expected `word<TAB>code`, found {found} field(s)")]
    MissingFields { found: usize },

    #[error("invalid code `{0}` (expected 1-4 letters a-z)")]
    InvalidCode(String),

    #[error("invalid priority `{0}`")]
    InvalidPriority(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
