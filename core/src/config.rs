//! Loader and refresh configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for reading a code table directory.
///
/// Deserialized from TOML; every field has a default so partial files are
/// accepted.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TableConfig {
    /// Directory scanned for table files.
    pub table_dir: PathBuf,

    /// Recognised file extensions, compared case-insensitively, without the dot.
    pub extensions: Vec<String>,

    /// Character embedded in the code field to mark a boosted entry.
    pub boost_marker: char,

    /// Lines starting with any of these (after trimming) are comments.
    pub comment_prefixes: Vec<String>,

    /// Minimum time between two staleness checks, in milliseconds.
    /// 0 checks the directory on every access.
    pub refresh_interval_ms: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            table_dir: PathBuf::from("tables"),
            extensions: vec!["txt".to_string()],
            boost_marker: '#',
            comment_prefixes: vec!["#".to_string(), "---".to_string()],
            refresh_interval_ms: 0,
        }
    }
}

impl TableConfig {
    /// Default configuration reading from `dir`.
    pub fn with_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            table_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Whether `path` has one of the recognised extensions.
    pub fn is_table_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    /// Whether an already trimmed line is a comment.
    pub fn is_comment(&self, line: &str) -> bool {
        self.comment_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && line.starts_with(prefix.as_str()))
    }
}
