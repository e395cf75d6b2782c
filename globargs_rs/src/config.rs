//! Pattern tables declared in TOML.
//!
//! Default location is `.globargs/patterns.toml` under a project root:
//!
//! ```toml
//! [[pattern]]
//! expr = "$0"
//! matches = "command"
//!
//! [[pattern]]
//! expr = "-o"
//! args = "output"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::table::{PatternTable, TableBuilder};

/// Directory holding globargs project files.
pub const CONFIG_DIR: &str = ".globargs";

/// File name of the pattern table inside [`CONFIG_DIR`].
pub const TABLE_FILE: &str = "patterns.toml";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    #[serde(rename = "pattern")]
    pub patterns: Vec<PatternConfig>,
}

/// One `[[pattern]]` row.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternConfig {
    /// Pattern expression, e.g. `-v`, `$+*.c`, `$0`.
    pub expr: String,
    /// Collector receiving the matched token.
    #[serde(default)]
    pub matches: Option<String>,
    /// Collector receiving the value token(s) that follow.
    #[serde(default)]
    pub args: Option<String>,
}

/// `<root>/.globargs/patterns.toml`
pub fn default_table_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(TABLE_FILE)
}

impl TableConfig {
    /// Load `.globargs/patterns.toml` from the given root directory.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        Self::load_from_path(&default_table_path(root))
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build the table. Collector names shared between rows refer to the
    /// same collector.
    pub fn build(&self) -> Result<PatternTable, ConfigError> {
        let mut builder = TableBuilder::new();
        for pattern in &self.patterns {
            let matches = pattern.matches.as_deref().map(|name| builder.collector(name));
            let args = pattern.args.as_deref().map(|name| builder.collector(name));
            builder.pattern(&pattern.expr, matches, args)?;
        }
        tracing::debug!("built pattern table with {} entries", self.patterns.len());
        Ok(builder.build())
    }
}
