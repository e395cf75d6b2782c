//! Command-line front end.
//!
//! `globargs [OPTIONS] -- <TOKENS>...` loads a pattern table (from
//! `--table`, the default `.globargs/patterns.toml`, and/or inline
//! `--pattern` rows), classifies the tokens and prints each collector.
//!
//! # Module Structure
//!
//! - [`colors`] - ANSI painter and `--color` handling
//! - [`render`] - text, JSON and `--explain` output

pub mod colors;
pub mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info};

use crate::config::{PatternConfig, TableConfig, default_table_path};
use crate::suggest::suggest_pattern;
use crate::table::PatternTable;
use colors::{ColorMode, Painter};
use render::{JsonReport, collectors_text, explain_text};

#[derive(Parser, Debug)]
#[command(name = "globargs")]
#[command(about = "Classify argument tokens against a glob pattern table")]
#[command(version)]
pub struct Args {
    /// Pattern table file (default: .globargs/patterns.toml)
    #[arg(long, short = 't', value_name = "PATH")]
    pub table: Option<PathBuf>,

    /// Inline pattern row: EXPR[;MATCHES[;ARGS]], appended after the file rows
    #[arg(long = "pattern", short = 'p', value_name = "ROW", allow_hyphen_values = true)]
    pub patterns: Vec<String>,

    /// Print collectors as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the compiled pattern table and exit
    #[arg(long)]
    pub explain: bool,

    /// Colorize output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Tokens to classify
    #[arg(last = true, value_name = "TOKENS")]
    pub tokens: Vec<String>,
}

/// Parse an inline `EXPR;MATCHES;ARGS` row. Empty fields mean "no slot".
pub fn parse_inline_pattern(row: &str) -> Result<PatternConfig> {
    let mut fields = row.split(';');
    let expr = fields.next().unwrap_or_default();
    if expr.is_empty() {
        bail!("--pattern '{row}': missing expression");
    }
    let slot = |field: Option<&str>| field.filter(|s| !s.is_empty()).map(str::to_string);
    let matches = slot(fields.next());
    let args = slot(fields.next());
    if fields.next().is_some() {
        bail!("--pattern '{row}': expected at most EXPR;MATCHES;ARGS");
    }
    Ok(PatternConfig {
        expr: expr.to_string(),
        matches,
        args,
    })
}

/// Assemble the table from the file and the inline rows.
pub fn load_table(args: &Args, root: &Path) -> Result<PatternTable> {
    let mut config = match &args.table {
        Some(path) => TableConfig::load_from_path(path)
            .with_context(|| format!("loading pattern table {}", path.display()))?,
        None => {
            let path = default_table_path(root);
            if path.exists() {
                TableConfig::load_from_path(&path)
                    .with_context(|| format!("loading pattern table {}", path.display()))?
            } else {
                TableConfig::default()
            }
        }
    };

    for row in &args.patterns {
        config.patterns.push(parse_inline_pattern(row)?);
    }
    if config.patterns.is_empty() {
        bail!(
            "no patterns: pass --table, --pattern, or create {}",
            default_table_path(Path::new(".")).display()
        );
    }

    config.build().context("building pattern table")
}

/// Run the CLI. Match errors are reported and turned into exit code 1.
pub fn run(args: &Args) -> Result<ExitCode> {
    let painter = Painter::new(args.color);
    let root = std::env::current_dir().context("reading current directory")?;
    let mut table = load_table(args, &root)?;
    info!("loaded {} patterns", table.entries().len());

    if args.explain {
        print!("{}", explain_text(&table, painter));
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = table.parse(&args.tokens).map(|_| ()).err();
    let snapshot = table.snapshot();
    let suggestion = outcome
        .as_ref()
        .and_then(|err| suggest_pattern(&table, err.token()))
        .map(str::to_string);
    let cleanup = table.cleanup();
    debug!("{cleanup:?}");

    if args.json {
        let report = JsonReport {
            ok: outcome.is_none(),
            error: outcome.as_ref().map(ToString::to_string),
            suggestion,
            collectors: snapshot,
            cleanup,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &outcome {
            None => print!("{}", collectors_text(&snapshot, painter)),
            Some(err) => {
                eprintln!("{} {err}", painter.error("error:"));
                if let Some(hint) = &suggestion {
                    eprintln!("{} did you mean '{hint}'?", painter.hint("hint:"));
                }
            }
        }
    }

    Ok(if outcome.is_none() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
