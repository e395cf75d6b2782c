//! Token classification.
//!
//! One left-to-right pass. For every token the table is scanned in order;
//! the first hard match wins, except that a pending `$?` candidate is held
//! in a one-slot buffer and decided once the scan is over:
//!
//! - a `$+`/`$|` hit discards the candidate, and if the mandatory entry
//!   already has occurrences its earliest one is handed over to the
//!   optional entry (redistribution);
//! - a literal hit loses to the candidate;
//! - a position hit beats it;
//! - with no hit at all the candidate is committed.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::Value;
use crate::error::MatchError;
use crate::pattern::{PatternKind, is_flag};
use crate::split::expand_value;
use crate::table::PatternTable;

/// Per-token scan state.
#[derive(Debug, Default)]
struct Scan {
    hit: Option<usize>,
    tentative: Option<usize>,
    /// First value-taking entry skipped because the token is the last one.
    gated: Option<usize>,
}

enum Step {
    Pass,
    Tentative,
    Mandatory { redistribute: bool },
    Hit,
}

impl PatternTable {
    /// Classify `tokens` into the table's collectors.
    ///
    /// The table is reset first. An empty (or `None`) token stream leaves
    /// it empty. On error the collectors keep whatever was gathered before
    /// the failing token; call [`cleanup`](Self::cleanup) either way.
    ///
    /// ```
    /// use globargs::{MatchError, TableBuilder};
    ///
    /// let mut builder = TableBuilder::new();
    /// let optional = builder.collector("first");
    /// let rest = builder.collector("rest");
    /// builder
    ///     .pattern("$?-f", Some(optional), None)?
    ///     .pattern("$+-f", Some(rest), None)?;
    /// let mut table = builder.build();
    ///
    /// table.parse(["-f", "-f"])?;
    /// assert_eq!(table.values(optional).map(|v| v.len()), Some(1));
    /// assert_eq!(table.values(rest).map(|v| v.len()), Some(1));
    ///
    /// let err = table.parse(["--bogus"]).unwrap_err();
    /// assert_eq!(err, MatchError::UnknownOption("--bogus".into()));
    /// table.cleanup();
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse<I>(&mut self, tokens: I) -> Result<&Self, MatchError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.reset();

        let stream: Vec<Value> = tokens
            .into_iter()
            .map(|token| Value::from(token.as_ref()))
            .collect();

        let mut cursor = 0;
        while cursor < stream.len() {
            if stream[cursor].is_empty() {
                cursor += 1;
                continue;
            }

            let index = self.classify(&stream, cursor)?;
            self.commit(index, &stream, &mut cursor)?;
            cursor += 1;
        }

        debug!(
            "parsed {} tokens against {} patterns ({} sequences live)",
            stream.len(),
            self.entries.len(),
            self.store.live()
        );
        Ok(self)
    }

    /// Pick the entry that owns the token at `position`.
    fn classify(&mut self, stream: &[Value], position: usize) -> Result<usize, MatchError> {
        let token: &str = &stream[position];
        let next = stream.get(position + 1);
        let value_follows = next.is_some_and(|next| !is_flag(next));

        let mut scan = Scan::default();
        for index in 0..self.entries.len() {
            match self.step(index, token, position, value_follows) {
                Step::Pass => {
                    if scan.gated.is_none()
                        && next.is_none()
                        && self.entries[index].takes_value()
                        && self.entries[index].kind().accepts(token, position)
                    {
                        scan.gated = Some(index);
                    }
                }
                Step::Tentative => {
                    trace!("'{}' held for optional pattern #{}", token, index);
                    scan.tentative = Some(index);
                }
                Step::Mandatory { redistribute } => {
                    match scan.tentative.take() {
                        Some(optional) if redistribute => self.redistribute(index, optional),
                        _ => {}
                    }
                    scan.hit = Some(index);
                    break;
                }
                Step::Hit => {
                    scan.hit = Some(index);
                    break;
                }
            }
        }

        let resolved = match (scan.hit, scan.tentative) {
            (Some(hit), Some(optional))
                if matches!(self.entries[hit].kind(), PatternKind::Literal(_)) =>
            {
                Some(optional)
            }
            (Some(hit), _) => Some(hit),
            (None, tentative) => tentative,
        };

        match resolved {
            Some(index) => {
                trace!(
                    "'{}' -> #{} {}",
                    token,
                    index,
                    self.entries[index].expression()
                );
                Ok(index)
            }
            None if scan.gated.is_some() => Err(MatchError::MissingArgument(token.to_string())),
            None => Err(MatchError::UnknownOption(token.to_string())),
        }
    }

    fn step(&self, index: usize, token: &str, position: usize, value_follows: bool) -> Step {
        let entry = &self.entries[index];
        if entry.takes_value() && !value_follows {
            return Step::Pass;
        }

        match entry.kind() {
            PatternKind::Optional(glob) => {
                if glob.is_match(token) && self.entry_count(index) == 0 {
                    Step::Tentative
                } else {
                    Step::Pass
                }
            }
            PatternKind::Required(glob) | PatternKind::Alternative { glob, .. } => {
                if !glob.is_match(token) {
                    return Step::Pass;
                }
                let count = match entry.kind().group() {
                    Some(group) => self.group_count(group),
                    None => self.entry_count(index),
                };
                Step::Mandatory {
                    redistribute: count > 0,
                }
            }
            kind => {
                if kind.accepts(token, position) {
                    Step::Hit
                } else {
                    Step::Pass
                }
            }
        }
    }

    /// Hand the earliest occurrence held by a mandatory entry over to the
    /// optional entry that also wanted the current token.
    fn redistribute(&mut self, mandatory: usize, optional: usize) {
        let from = &self.entries[mandatory];
        let to = &self.entries[optional];
        let slots = [
            (from.match_slot(), to.match_slot()),
            (from.args_slot(), to.args_slot()),
        ];

        for (source, target) in slots {
            let (Some(source), Some(target)) = (source, target) else {
                continue;
            };
            if source == target {
                continue;
            }
            let Some(handle) = self.collectors[source.index()].handle() else {
                continue;
            };
            if let Some(moved) = self.store.transfer_first(handle) {
                self.install(target, moved);
            }
        }

        debug!(
            "redistributed first occurrence from '{}' to '{}'",
            self.entries[mandatory].expression(),
            self.entries[optional].expression()
        );
    }

    /// Record the token (and its value, if the entry takes one).
    fn commit(
        &mut self,
        index: usize,
        stream: &[Value],
        cursor: &mut usize,
    ) -> Result<(), MatchError> {
        let token = Rc::clone(&stream[*cursor]);
        let match_slot = self.entries[index].match_slot();
        let args_slot = self.entries[index].args_slot();

        if let Some(id) = match_slot {
            self.append(id, Rc::clone(&token));
        }

        if let Some(id) = args_slot {
            let Some(value) = stream.get(*cursor + 1) else {
                return Err(MatchError::MissingArgument(token.to_string()));
            };
            *cursor += 1;

            let values = expand_value(value, &mut self.entries[index].scratch);
            debug!("'{}' takes {} value(s) from '{}'", token, values.len(), value);
            for value in values {
                self.append(id, value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{CollectorId, TableBuilder};

    fn strings(table: &PatternTable, id: CollectorId) -> Vec<String> {
        table
            .values(id)
            .map(|values| values.iter().map(|v| v.to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_literal_occurrences_in_order() {
        let mut builder = TableBuilder::new();
        let v = builder.collector("verbose");
        builder.pattern("-v", Some(v), None).unwrap();
        let mut table = builder.build();

        table.parse(["-v", "-v", "-v"]).unwrap();
        assert_eq!(strings(&table, v), ["-v", "-v", "-v"]);
        table.cleanup();
    }

    #[test]
    fn test_empty_and_absent_streams() {
        let mut builder = TableBuilder::new();
        let v = builder.collector("verbose");
        builder.pattern("-v", Some(v), None).unwrap();
        let mut table = builder.build();

        table.parse(Vec::<String>::new()).unwrap();
        assert!(table.values(v).is_none());
        table.parse(None::<&str>).unwrap();
        assert!(table.values(v).is_none());
    }

    #[test]
    fn test_empty_tokens_are_skipped() {
        let mut builder = TableBuilder::new();
        let first = builder.collector("first");
        builder.pattern("$1", Some(first), None).unwrap();
        builder.pattern("*", None, None).unwrap();
        let mut table = builder.build();

        table.parse(["", "cmd", "", "arg"]).unwrap();
        assert_eq!(strings(&table, first), ["cmd"]);
    }

    #[test]
    fn test_redistribution_keeps_earliest_in_optional() {
        let mut builder = TableBuilder::new();
        let opt = builder.collector("opt");
        let req = builder.collector("req");
        builder
            .pattern("$?-f", Some(opt), None)
            .unwrap()
            .pattern("$+-f", Some(req), None)
            .unwrap();
        let mut table = builder.build();

        table.parse(["-f", "-f"]).unwrap();
        assert_eq!(strings(&table, opt), ["-f"]);
        assert_eq!(strings(&table, req), ["-f"]);

        table.cleanup();
        table.parse(["-f", "-f", "-f"]).unwrap();
        assert_eq!(strings(&table, opt).len(), 1);
        assert_eq!(strings(&table, req).len(), 2);
    }

    #[test]
    fn test_redistribution_moves_the_first_token() {
        let mut builder = TableBuilder::new();
        let opt = builder.collector("opt");
        let req = builder.collector("req");
        builder
            .pattern("$?*.c", Some(opt), None)
            .unwrap()
            .pattern("$+*.c", Some(req), None)
            .unwrap();
        let mut table = builder.build();

        table.parse(["a.c", "b.c", "c.c"]).unwrap();
        assert_eq!(strings(&table, opt), ["a.c"]);
        assert_eq!(strings(&table, req), ["b.c", "c.c"]);
    }

    #[test]
    fn test_redistribution_moves_args_too() {
        let mut builder = TableBuilder::new();
        let first = builder.collector("first");
        let rest = builder.collector("rest");
        builder
            .pattern("$?-I", None, Some(first))
            .unwrap()
            .pattern("$+-I", None, Some(rest))
            .unwrap();
        let mut table = builder.build();

        table.parse(["-I", "inc", "-I", "lib,vendor"]).unwrap();
        assert_eq!(strings(&table, first), ["inc"]);
        assert_eq!(strings(&table, rest), ["lib", "vendor"]);
    }

    #[test]
    fn test_single_optional_occurrence() {
        let mut builder = TableBuilder::new();
        let opt = builder.collector("opt");
        builder.pattern("$?-q", Some(opt), None).unwrap();
        let mut table = builder.build();

        table.parse(["-q"]).unwrap();
        assert_eq!(strings(&table, opt), ["-q"]);

        let err = table.parse(["-q", "-q"]).unwrap_err();
        assert_eq!(err, MatchError::UnknownOption("-q".into()));
        assert_eq!(strings(&table, opt), ["-q"]);
    }

    #[test]
    fn test_optional_beats_later_literal_until_filled() {
        let mut builder = TableBuilder::new();
        let opt = builder.collector("opt");
        let lit = builder.collector("lit");
        builder
            .pattern("$?-f", Some(opt), None)
            .unwrap()
            .pattern("-f", Some(lit), None)
            .unwrap();
        let mut table = builder.build();

        table.parse(["-f", "-f", "-f"]).unwrap();
        assert_eq!(strings(&table, opt), ["-f"]);
        assert_eq!(strings(&table, lit), ["-f", "-f"]);
    }

    #[test]
    fn test_position_beats_optional() {
        let mut builder = TableBuilder::new();
        let opt = builder.collector("opt");
        let cmd = builder.collector("cmd");
        builder
            .pattern("$?*", Some(opt), None)
            .unwrap()
            .pattern("$0", Some(cmd), None)
            .unwrap();
        let mut table = builder.build();

        table.parse(["build", "target"]).unwrap();
        assert_eq!(strings(&table, cmd), ["build"]);
        assert_eq!(strings(&table, opt), ["target"]);
    }

    #[test]
    fn test_comma_split_values() {
        let mut builder = TableBuilder::new();
        let x = builder.collector("x");
        builder.pattern("-x", None, Some(x)).unwrap();
        let mut table = builder.build();

        table.parse(["-x", "a,b,c"]).unwrap();
        assert_eq!(strings(&table, x), ["a", "b", "c"]);
        assert_eq!(table.entries()[0].scratch().len(), 3);

        table.parse(["-x", "a"]).unwrap();
        assert_eq!(strings(&table, x), ["a"]);
        assert!(table.entries()[0].scratch().is_empty());
    }

    #[test]
    fn test_match_and_args_slots_together() {
        let mut builder = TableBuilder::new();
        let flag = builder.collector("flag");
        let value = builder.collector("value");
        builder.pattern("--out*", Some(flag), Some(value)).unwrap();
        let mut table = builder.build();

        table
            .parse(["--output", "a.txt", "--out", "b.txt"])
            .unwrap();
        assert_eq!(strings(&table, flag), ["--output", "--out"]);
        assert_eq!(strings(&table, value), ["a.txt", "b.txt"]);
    }

    #[test]
    fn test_unknown_option() {
        let mut builder = TableBuilder::new();
        builder.pattern("-v", None, None).unwrap();
        let mut table = builder.build();

        let err = table.parse(["--bogus"]).unwrap_err();
        assert_eq!(err, MatchError::UnknownOption("--bogus".into()));
        assert_eq!(err.to_string(), "unknown option '--bogus'");
    }

    #[test]
    fn test_missing_argument() {
        let mut builder = TableBuilder::new();
        let x = builder.collector("x");
        builder.pattern("-x", None, Some(x)).unwrap();
        let mut table = builder.build();

        let err = table.parse(["-x"]).unwrap_err();
        assert_eq!(err, MatchError::MissingArgument("-x".into()));
        assert_eq!(err.to_string(), "missing argument for option -x");

        table.cleanup();
    }

    #[test]
    fn test_flag_after_value_option_is_unknown() {
        let mut builder = TableBuilder::new();
        let x = builder.collector("x");
        builder
            .pattern("-x", None, Some(x))
            .unwrap()
            .pattern("-y", None, None)
            .unwrap();
        let mut table = builder.build();

        let err = table.parse(["-x", "-y"]).unwrap_err();
        assert_eq!(err, MatchError::UnknownOption("-x".into()));

        let err = table.parse(["-y", "-x"]).unwrap_err();
        assert_eq!(err, MatchError::MissingArgument("-x".into()));
        table.cleanup();
    }

    #[test]
    fn test_value_gate_falls_through_to_bare_flag() {
        let mut builder = TableBuilder::new();
        let with_value = builder.collector("with_value");
        let bare = builder.collector("bare");
        builder
            .pattern("-o", None, Some(with_value))
            .unwrap()
            .pattern("-o", Some(bare), None)
            .unwrap()
            .pattern("-v", None, None)
            .unwrap();
        let mut table = builder.build();

        table.parse(["-o", "-v", "-o", "file"]).unwrap();
        assert_eq!(strings(&table, bare), ["-o"]);
        assert_eq!(strings(&table, with_value), ["file"]);
    }

    #[test]
    fn test_plain_glob_does_not_swallow_flags() {
        let mut builder = TableBuilder::new();
        let files = builder.collector("files");
        builder.pattern("*", Some(files), None).unwrap();
        let mut table = builder.build();

        let err = table.parse(["a.c", "-v"]).unwrap_err();
        assert_eq!(err, MatchError::UnknownOption("-v".into()));
        assert_eq!(strings(&table, files), ["a.c"]);
    }

    #[test]
    fn test_shared_collector_keeps_input_order() {
        let mut builder = TableBuilder::new();
        let verbose = builder.collector("verbose");
        builder
            .pattern("-v", Some(verbose), None)
            .unwrap()
            .pattern("--verbose", Some(verbose), None)
            .unwrap();
        let mut table = builder.build();

        table.parse(["--verbose", "-v", "--verbose"]).unwrap();
        assert_eq!(strings(&table, verbose), ["--verbose", "-v", "--verbose"]);
        assert_eq!(table.live_sequences(), 1);
    }

    #[test]
    fn test_redistribution_within_shared_collector_is_a_no_op() {
        let mut builder = TableBuilder::new();
        let all = builder.collector("all");
        builder
            .pattern("$?-f", Some(all), None)
            .unwrap()
            .pattern("$+-f", Some(all), None)
            .unwrap();
        let mut table = builder.build();

        table.parse(["-f", "-f"]).unwrap();
        assert_eq!(strings(&table, all), ["-f", "-f"]);
    }

    #[test]
    fn test_or_group_counts_whole_group() {
        let mut builder = TableBuilder::new();
        let json = builder.collector("json");
        let yaml = builder.collector("yaml");
        builder
            .pattern("$|--json", Some(json), None)
            .unwrap()
            .pattern("$|--yaml", Some(yaml), None)
            .unwrap();
        let mut table = builder.build();

        table.parse(["--yaml", "--json", "--yaml"]).unwrap();
        assert_eq!(strings(&table, json), ["--json"]);
        assert_eq!(strings(&table, yaml), ["--yaml", "--yaml"]);

        let group = table.entries()[0].kind().group().unwrap();
        assert_eq!(table.group_count(group), 3);
    }

    #[test]
    fn test_optional_against_or_group_member() {
        let mut builder = TableBuilder::new();
        let opt = builder.collector("opt");
        let json = builder.collector("json");
        let yaml = builder.collector("yaml");
        builder
            .pattern("$?--json", Some(opt), None)
            .unwrap()
            .pattern("$|--json", Some(json), None)
            .unwrap()
            .pattern("$|--yaml", Some(yaml), None)
            .unwrap();
        let mut table = builder.build();

        table.parse(["--json", "--json"]).unwrap();
        assert_eq!(strings(&table, opt), ["--json"]);
        assert_eq!(strings(&table, json), ["--json"]);
        assert_eq!(table.live_sequences(), 2);

        // The group already has an occurrence, but not in the hit entry's
        // own collector: nothing to hand over.
        table.parse(["--yaml", "--json"]).unwrap();
        assert!(strings(&table, opt).is_empty());
        assert_eq!(strings(&table, json), ["--json"]);
        assert_eq!(strings(&table, yaml), ["--yaml"]);
        table.cleanup();
    }

    #[test]
    fn test_redistribution_from_shared_match_and_args_collector() {
        let mut builder = TableBuilder::new();
        let first = builder.collector("first");
        let all = builder.collector("all");
        builder
            .pattern("$?-I", None, Some(first))
            .unwrap()
            .pattern("$+-I", Some(all), Some(all))
            .unwrap();
        let mut table = builder.build();

        table.parse(["-I", "a", "-I", "b"]).unwrap();
        // Whatever sits first in the shared sequence moves, here the flag.
        assert_eq!(strings(&table, first), ["-I"]);
        assert_eq!(strings(&table, all), ["a", "-I", "b"]);

        let report = table.cleanup();
        assert_eq!(report.sequences_released, 2);
        assert_eq!(report.aliased_skips, 1);
        assert_eq!(table.live_sequences(), 0);
    }

    #[test]
    fn test_optional_with_value_loses_to_lookahead_gate() {
        let mut builder = TableBuilder::new();
        let opt = builder.collector("opt");
        let bare = builder.collector("bare");
        builder
            .pattern("$?-o", None, Some(opt))
            .unwrap()
            .pattern("-o", Some(bare), None)
            .unwrap()
            .pattern("-v", None, None)
            .unwrap();
        let mut table = builder.build();

        table.parse(["-o", "-v", "-o", "out.txt"]).unwrap();
        assert_eq!(strings(&table, bare), ["-o"]);
        assert_eq!(strings(&table, opt), ["out.txt"]);

        table.parse(["-o"]).unwrap();
        assert_eq!(strings(&table, bare), ["-o"]);
        assert!(table.values(opt).is_none());
        table.cleanup();
    }

    #[test]
    fn test_required_absent_is_not_an_error() {
        let mut builder = TableBuilder::new();
        let req = builder.collector("req");
        builder
            .pattern("$+*.c", Some(req), None)
            .unwrap()
            .pattern("-v", None, None)
            .unwrap();
        let mut table = builder.build();

        table.parse(["-v"]).unwrap();
        assert!(table.values(req).is_none());

        let err = table.parse(["-v", "--nope"]).unwrap_err();
        assert_eq!(err, MatchError::UnknownOption("--nope".into()));
    }

    #[test]
    fn test_reparse_starts_from_clean_collectors() {
        let mut builder = TableBuilder::new();
        let v = builder.collector("v");
        builder.pattern("-v", Some(v), None).unwrap();
        let mut table = builder.build();

        table.parse(["-v", "-v"]).unwrap();
        table.cleanup();
        table.parse(["-v"]).unwrap();
        assert_eq!(strings(&table, v), ["-v"]);
        assert_eq!(table.live_sequences(), 1);
    }

    #[test]
    fn test_reparse_without_cleanup_does_not_leak() {
        let mut builder = TableBuilder::new();
        let v = builder.collector("v");
        let out = builder.collector("out");
        builder
            .pattern("-v", Some(v), None)
            .unwrap()
            .pattern("-o", None, Some(out))
            .unwrap();
        let mut table = builder.build();

        for _ in 0..100 {
            table.parse(["-v", "-o", "a,b"]).unwrap();
            assert_eq!(table.live_sequences(), 2);
        }
        let report = table.cleanup();
        assert_eq!(report.sequences_released, 2);
        assert_eq!(table.live_sequences(), 0);
    }
}
