//! "Did you mean" hints for unknown options.

use strsim::levenshtein;

use crate::pattern::PatternKind;
use crate::table::PatternTable;

/// Largest edit distance still worth suggesting.
const MAX_DISTANCE: usize = 2;

/// Suggest the closest literal, wildcard-free pattern for an unknown token.
/// Returns Some(pattern) if a close match is found (distance <= 2).
pub fn suggest_pattern<'t>(table: &'t PatternTable, token: &str) -> Option<&'t str> {
    let mut best_match: Option<(&str, usize)> = None;

    for entry in table.entries() {
        let PatternKind::Literal(glob) = entry.kind() else {
            continue;
        };
        let candidate = glob.as_str();
        if candidate.contains(['*', '?', '[', '{']) {
            continue;
        }

        let distance = levenshtein(token, candidate);
        if distance > MAX_DISTANCE {
            continue;
        }
        // Keep the first of equally close candidates (table order)
        if best_match.is_none_or(|(_, best)| distance < best) {
            best_match = Some((candidate, distance));
        }
    }

    best_match.map(|(candidate, _)| candidate)
}
