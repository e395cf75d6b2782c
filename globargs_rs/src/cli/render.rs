//! Human and JSON output.

use std::fmt::Write;

use serde::Serialize;

use super::colors::Painter;
use crate::cleanup::CleanupReport;
use crate::table::{MatchSnapshot, PatternTable};

/// JSON document printed by `--json`.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub collectors: MatchSnapshot,
    pub cleanup: CleanupReport,
}

/// One line per collector: `name: value value ...`.
pub fn collectors_text(snapshot: &MatchSnapshot, painter: Painter) -> String {
    let width = snapshot
        .collectors
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for collector in &snapshot.collectors {
        let padding = " ".repeat(width - collector.name.len());
        let values = if collector.values.is_empty() {
            painter.dim("(none)")
        } else {
            collector.values.join(" ")
        };
        let _ = writeln!(out, "{}:{padding} {values}", painter.name(&collector.name));
    }
    out
}

/// The compiled table, one entry per line.
pub fn explain_text(table: &PatternTable, painter: Painter) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", painter.header("Pattern table"));

    for (index, entry) in table.entries().iter().enumerate() {
        let kind = entry.kind();
        let mut line = format!(
            "  #{index:<3} {:<12} {}",
            kind.label(),
            painter.pattern(entry.expression())
        );
        if let Some(group) = kind.group() {
            let _ = write!(line, " group={group}");
        }
        if let Some(id) = entry.match_slot() {
            let _ = write!(line, " matches={}", collector_name(table, id.index()));
        }
        if let Some(id) = entry.args_slot() {
            let _ = write!(line, " args={}", collector_name(table, id.index()));
        }
        let _ = writeln!(out, "{line}");
    }
    out
}

fn collector_name(table: &PatternTable, index: usize) -> &str {
    table
        .collectors()
        .nth(index)
        .map_or("?", |(_, collector)| collector.name())
}
