//! Releasing what a parse allocated.

use serde::Serialize;
use tracing::debug;

use crate::table::PatternTable;

/// What a [`PatternTable::cleanup`] call released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Sequences released.
    pub sequences_released: usize,
    /// Slot visits that found their sequence already released, because the
    /// collector is shared with an earlier entry.
    pub aliased_skips: usize,
    /// Comma-split fragments dropped from the scratch ledgers.
    pub fragments_released: usize,
}

impl PatternTable {
    /// Release every collector sequence exactly once and drain the scratch
    /// ledgers.
    ///
    /// Collector handles are left in place but stale: [`values`] returns
    /// `None` for them until the next parse.
    ///
    /// [`values`]: PatternTable::values
    pub fn cleanup(&mut self) -> CleanupReport {
        let mut report = CleanupReport::default();

        for entry in &mut self.entries {
            for slot in [entry.match_slot(), entry.args_slot()].into_iter().flatten() {
                let Some(handle) = self.collectors[slot.index()].handle() else {
                    continue;
                };
                if self.store.release(handle) {
                    report.sequences_released += 1;
                } else {
                    report.aliased_skips += 1;
                }
            }

            report.fragments_released += entry.scratch.len();
            entry.scratch.clear();
        }

        debug!(
            "cleanup released {} sequences, {} fragments ({} aliased)",
            report.sequences_released, report.fragments_released, report.aliased_skips
        );
        report
    }
}
