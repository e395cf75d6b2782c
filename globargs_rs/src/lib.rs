//! # globargs
//!
//! **Declarative command-line token matcher.** Describe the accepted tokens
//! as a table of glob patterns with quantifiers, hand over the raw argument
//! vector, and read back which tokens each pattern collected.
//!
//! ## Features
//!
//! - **Glob patterns** - `-v`, `--out*`, `*.c`, character classes
//! - **Quantifiers** - `$?` at most once, `$+` at least once, `$|` OR-groups
//! - **Positions** - `$0` matches the first token, whatever it is
//! - **Values** - a pattern with an args collector consumes the next token,
//!   split on commas
//! - **Shared collectors** - `-v` and `--verbose` can feed one list
//!
//! ## Quick Start
//!
//! ```rust
//! use globargs::TableBuilder;
//!
//! let mut builder = TableBuilder::new();
//! let command = builder.collector("command");
//! let files = builder.collector("files");
//! let include = builder.collector("include");
//! builder
//!     .pattern("$0", Some(command), None)?
//!     .pattern("-I", None, Some(include))?
//!     .pattern("$+*.c", Some(files), None)?;
//! let mut table = builder.build();
//!
//! table.parse(["cc", "-I", "inc,vendor", "main.c", "util.c"])?;
//! assert_eq!(table.values(include).map(|v| v.len()), Some(2));
//! assert_eq!(table.values(files).map(|v| v.len()), Some(2));
//!
//! let report = table.cleanup();
//! assert_eq!(report.sequences_released, 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! globargs --table patterns.toml -- cc -I inc main.c   # classify tokens
//! globargs --json -- -v -o out.txt                     # JSON collectors
//! globargs --explain                                   # show the table
//! ```

// ============================================================================
// Core Modules
// ============================================================================

/// Releasing the sequences a parse allocated.
pub mod cleanup;

/// Command-line front end for the `globargs` binary.
pub mod cli;

/// TOML pattern tables (`.globargs/patterns.toml`).
pub mod config;

/// Error types.
pub mod error;

/// The per-token classification pass.
pub mod matcher;

/// Pattern expression mini-language.
///
/// See [`PatternKind`](pattern::PatternKind) for the parsed form.
pub mod pattern;

/// Comma-separated value expansion.
pub mod split;

/// Generation-checked arena of result sequences.
pub mod store;

/// "Did you mean" suggestions for unknown options.
pub mod suggest;

/// Pattern table, collectors, and the builder.
pub mod table;

/// A collected token or value fragment.
pub type Value = std::rc::Rc<str>;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use cleanup::CleanupReport;
pub use config::TableConfig;
pub use error::{ConfigError, MatchError, TableError};
pub use pattern::{Glob, PatternKind};
pub use suggest::suggest_pattern;
pub use table::{
    CollectorId, CollectorSnapshot, MAX_PATTERNS, MatchSnapshot, PatternEntry, PatternTable,
    TableBuilder,
};
