//! Front-end configuration.

use libcodetable_core::{ConfigError, TableConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Xingma-specific configuration that extends the base `TableConfig` from core.
///
/// This configuration includes:
/// - All loader options from `libcodetable_core::TableConfig` (flattened via serde)
/// - How many candidates a candidate list shows
/// - Whether candidate listings name the table file an entry came from
///
/// # Example
///
/// ```rust
/// use libxingma::XingmaConfig;
///
/// let config = XingmaConfig::from_toml_str("table_dir = \"wubi\"\ncandidate_limit = 5\n").unwrap();
/// assert_eq!(config.candidate_limit, 5);
/// assert_eq!(config.base().boost_marker, '#');
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct XingmaConfig {
    /// Base loader fields (table directory, extensions, marker, refresh interval)
    #[serde(flatten)]
    pub base: TableConfig,

    /// Maximum candidates shown for one code
    pub candidate_limit: usize,

    /// Print the source file next to each candidate
    pub show_source: bool,
}

impl Default for XingmaConfig {
    fn default() -> Self {
        Self {
            base: TableConfig::default(),
            // one per selection position: space, ;, ', 3-9
            candidate_limit: 10,
            show_source: false,
        }
    }
}

impl XingmaConfig {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_toml_str(&content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Convert this config into the base config for use with `TableStore::new()`
    pub fn into_base(self) -> TableConfig {
        self.base
    }

    pub fn base(&self) -> &TableConfig {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut TableConfig {
        &mut self.base
    }
}
