//! The pattern table: ordered entries plus the collectors they write into.

use serde::Serialize;

use crate::Value;
use crate::error::TableError;
use crate::pattern::PatternKind;
use crate::store::{SeqHandle, SequenceStore};

/// Upper bound on entries per table.
pub const MAX_PATTERNS: usize = 256;

/// Identifies a collector within the table that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectorId(usize);

impl CollectorId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Named output location. Starts uninitialized and gets a sequence on the
/// first write. Several entries may point at the same collector.
#[derive(Debug)]
pub struct Collector {
    name: String,
    handle: Option<SeqHandle>,
}

impl Collector {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> Option<SeqHandle> {
        self.handle
    }
}

/// One row of the table.
#[derive(Debug)]
pub struct PatternEntry {
    expression: String,
    kind: PatternKind,
    match_slot: Option<CollectorId>,
    args_slot: Option<CollectorId>,
    /// Fragments the engine allocated while comma-splitting values.
    pub(crate) scratch: Vec<Value>,
}

impl PatternEntry {
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn kind(&self) -> &PatternKind {
        &self.kind
    }

    pub fn match_slot(&self) -> Option<CollectorId> {
        self.match_slot
    }

    pub fn args_slot(&self) -> Option<CollectorId> {
        self.args_slot
    }

    /// Whether a value token must follow this pattern.
    pub fn takes_value(&self) -> bool {
        self.args_slot.is_some()
    }

    pub fn scratch(&self) -> &[Value] {
        &self.scratch
    }
}

/// Builds a [`PatternTable`] entry by entry.
///
/// ```
/// use globargs::TableBuilder;
///
/// let mut builder = TableBuilder::new();
/// let verbose = builder.collector("verbose");
/// let output = builder.collector("output");
/// builder
///     .pattern("-v", Some(verbose), None)?
///     .pattern("--verbose", Some(verbose), None)?
///     .pattern("-o", None, Some(output))?;
/// let mut table = builder.build();
///
/// table.parse(["-v", "-o", "a.out,b.out"])?;
/// assert_eq!(table.values(verbose).map(|v| v.len()), Some(1));
/// assert_eq!(table.values(output).map(|v| v.len()), Some(2));
/// table.cleanup();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct TableBuilder {
    entries: Vec<PatternEntry>,
    collectors: Vec<Collector>,
    /// Entry indices of each OR-group; group `n` lives at `n - 1`.
    groups: Vec<Vec<usize>>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the collector with this name.
    pub fn collector(&mut self, name: impl Into<String>) -> CollectorId {
        let name = name.into();
        if let Some(index) = self.collectors.iter().position(|c| c.name == name) {
            return CollectorId(index);
        }
        self.collectors.push(Collector { name, handle: None });
        CollectorId(self.collectors.len() - 1)
    }

    /// Append an entry. Adjacent `$|` entries form one OR-group.
    pub fn pattern(
        &mut self,
        expression: &str,
        match_slot: Option<CollectorId>,
        args_slot: Option<CollectorId>,
    ) -> Result<&mut Self, TableError> {
        if self.entries.len() >= MAX_PATTERNS {
            return Err(TableError::TooManyPatterns { max: MAX_PATTERNS });
        }
        for id in [match_slot, args_slot].into_iter().flatten() {
            if id.0 >= self.collectors.len() {
                return Err(TableError::UnknownCollector {
                    expression: expression.to_string(),
                    id: id.0,
                });
            }
        }

        let mut kind = PatternKind::parse(expression)?;
        if kind.group().is_some() {
            let previous = self.entries.last().and_then(|e| e.kind.group());
            let group = match previous {
                Some(group) => group,
                None => {
                    self.groups.push(Vec::new());
                    self.groups.len()
                }
            };
            self.groups[group - 1].push(self.entries.len());
            kind.set_group(group);
        }

        self.entries.push(PatternEntry {
            expression: expression.to_string(),
            kind,
            match_slot,
            args_slot,
            scratch: Vec::new(),
        });
        Ok(self)
    }

    pub fn build(self) -> PatternTable {
        PatternTable {
            entries: self.entries,
            collectors: self.collectors,
            groups: self.groups,
            store: SequenceStore::new(),
        }
    }
}

/// Caller-owned, reusable pattern table.
///
/// [`parse`](Self::parse) fills the collectors; [`cleanup`](Self::cleanup)
/// releases what the parse allocated.
#[derive(Debug)]
pub struct PatternTable {
    pub(crate) entries: Vec<PatternEntry>,
    pub(crate) collectors: Vec<Collector>,
    pub(crate) groups: Vec<Vec<usize>>,
    pub(crate) store: SequenceStore,
}

impl PatternTable {
    pub fn builder() -> TableBuilder {
        TableBuilder::new()
    }

    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    pub fn collectors(&self) -> impl Iterator<Item = (CollectorId, &Collector)> {
        self.collectors
            .iter()
            .enumerate()
            .map(|(index, c)| (CollectorId(index), c))
    }

    /// Look up a collector by name.
    pub fn collector(&self, name: &str) -> Option<CollectorId> {
        self.collectors
            .iter()
            .position(|c| c.name == name)
            .map(CollectorId)
    }

    /// Values gathered by a collector; `None` while uninitialized or after
    /// cleanup.
    pub fn values(&self, id: CollectorId) -> Option<&[Value]> {
        let handle = self.collectors.get(id.0)?.handle?;
        self.store.get(handle)
    }

    pub fn values_by_name(&self, name: &str) -> Option<&[Value]> {
        self.values(self.collector(name)?)
    }

    /// Number of sequences currently allocated in the table's store.
    pub fn live_sequences(&self) -> usize {
        self.store.live()
    }

    /// Forget every collector's sequence and clear the scratch ledgers.
    ///
    /// Allocates nothing. Sequences left over from a parse that was never
    /// cleaned up are released here.
    pub fn reset(&mut self) {
        for collector in &mut self.collectors {
            collector.handle = None;
        }
        for entry in &mut self.entries {
            entry.scratch.clear();
        }

        let released = self.store.clear();
        if released > 0 {
            tracing::warn!(released, "pattern table reset without cleanup");
        }
    }

    pub(crate) fn collector_len(&self, id: Option<CollectorId>) -> usize {
        id.and_then(|id| self.collectors[id.0].handle)
            .map_or(0, |handle| self.store.len(handle))
    }

    /// Match count plus args count of one entry.
    pub(crate) fn entry_count(&self, index: usize) -> usize {
        let entry = &self.entries[index];
        self.collector_len(entry.match_slot) + self.collector_len(entry.args_slot)
    }

    /// Entry indices belonging to an OR-group, in table order.
    pub fn group_members(&self, group: usize) -> &[usize] {
        group
            .checked_sub(1)
            .and_then(|slot| self.groups.get(slot))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Combined count of every member of an OR-group.
    pub(crate) fn group_count(&self, group: usize) -> usize {
        self.group_members(group)
            .iter()
            .map(|&index| self.entry_count(index))
            .sum()
    }

    /// Append to a collector, allocating its sequence on first write.
    pub(crate) fn append(&mut self, id: CollectorId, value: Value) {
        let handle = match self.collectors[id.0].handle {
            Some(handle) if self.store.is_live(handle) => handle,
            _ => {
                let handle = self.store.allocate();
                self.collectors[id.0].handle = Some(handle);
                handle
            }
        };
        self.store.push(handle, value);
    }

    /// Point a collector at a different sequence, releasing the one it held.
    pub(crate) fn install(&mut self, id: CollectorId, handle: SeqHandle) {
        if let Some(previous) = self.collectors[id.0].handle.replace(handle) {
            self.store.release(previous);
        }
    }

    /// Owned copy of every collector's values, in collector order.
    pub fn snapshot(&self) -> MatchSnapshot {
        let collectors = self
            .collectors()
            .map(|(id, collector)| CollectorSnapshot {
                name: collector.name.clone(),
                values: self
                    .values(id)
                    .map(|values| values.iter().map(|v| v.to_string()).collect())
                    .unwrap_or_default(),
            })
            .collect();
        MatchSnapshot { collectors }
    }
}

/// Serializable view of a parsed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSnapshot {
    pub collectors: Vec<CollectorSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectorSnapshot {
    pub name: String,
    pub values: Vec<String>,
}
