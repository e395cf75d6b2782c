//! Error types for table construction, token matching, and config loading.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised while classifying a token stream.
///
/// Both kinds abort the parse at the offending token. Sequences collected
/// before the failure stay in the table and are released by
/// [`PatternTable::cleanup`](crate::PatternTable::cleanup).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The token matched no pattern in the table.
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    /// The token matched a value-taking pattern but no value follows it.
    #[error("missing argument for option {0}")]
    MissingArgument(String),
}

impl MatchError {
    /// The token the error refers to.
    pub fn token(&self) -> &str {
        match self {
            MatchError::UnknownOption(token) | MatchError::MissingArgument(token) => token,
        }
    }
}

/// Error raised while building a [`PatternTable`](crate::PatternTable).
#[derive(Error, Debug)]
pub enum TableError {
    /// Pattern text was empty.
    #[error("empty pattern expression")]
    EmptyExpression,

    /// `$` followed by something that is neither a quantifier nor a position.
    #[error("invalid constraint expression '{0}'")]
    InvalidExpression(String),

    /// `$<n>` where `n` does not fit a token index.
    #[error("invalid token position in '{expression}': {source}")]
    InvalidPosition {
        expression: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// The glob part of an expression failed to compile.
    #[error("invalid glob in '{expression}': {source}")]
    InvalidGlob {
        expression: String,
        #[source]
        source: globset::Error,
    },

    /// A slot refers to a collector that was not created by this builder.
    #[error("pattern '{expression}' refers to unknown collector #{id}")]
    UnknownCollector { expression: String, id: usize },

    /// The table would exceed [`MAX_PATTERNS`](crate::MAX_PATTERNS).
    #[error("pattern table holds at most {max} entries")]
    TooManyPatterns { max: usize },
}

/// Error raised while loading a pattern table from TOML.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Table(#[from] TableError),
}
