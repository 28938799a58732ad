//! Top-down multilevel index search with block-access accounting.
//!
//! The search is a small state machine:
//!
//! ```text
//! AtLevel(top) -> AtLevel(top-1) -> ... -> AtLevel(1) -> AtData -> Found
//!       \               \                       \            \
//!        +---------------+-----------------------+------------+--> NotFound
//! ```
//!
//! The top level is scanned in full. Every lower level is scanned only inside
//! the block the parent entry points at, and the data level only inside the
//! data block level 1 points at. A window that holds no matching entry ends
//! the search immediately.

use crate::calculator::Configuration;
use crate::level::{IndexEntry, Level};
use std::ops::ControlFlow;
use strata_common::{DataRecord, RecordId};

/// A state of the search state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Scanning a window of index level `k`.
    AtLevel(usize),
    /// Scanning one data block.
    AtData,
    /// The key was found.
    Found,
    /// The key is not present.
    NotFound,
}

/// Progress notifications emitted while a search runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// The search begins in `state`.
    Started { id: RecordId, state: SearchState },
    /// The search moved between states.
    Transition { from: SearchState, to: SearchState },
    /// An index entry was read.
    ProbeEntry {
        level: usize,
        position: usize,
        entry: IndexEntry,
        matched: bool,
    },
    /// A data record was read.
    ProbeRecord {
        position: usize,
        id: RecordId,
        matched: bool,
    },
}

/// Receives search progress. Returning `ControlFlow::Break` cancels the search.
pub trait ProgressSink {
    fn on_event(&mut self, event: &SearchEvent) -> ControlFlow<()>;
}

impl<F> ProgressSink for F
where
    F: FnMut(&SearchEvent) -> ControlFlow<()>,
{
    fn on_event(&mut self, event: &SearchEvent) -> ControlFlow<()> {
        self(event)
    }
}

/// Sink that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    #[inline]
    fn on_event(&mut self, _event: &SearchEvent) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found,
    NotFound,
    /// The progress sink stopped the search.
    Cancelled,
}

/// Result and cost of one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// How the search ended.
    pub outcome: SearchOutcome,
    /// The matching record, if found.
    pub record: Option<DataRecord>,
    /// Entries read per index level; position 0 is level 1.
    pub level_accesses: Vec<usize>,
    /// Data records read.
    pub data_accesses: usize,
    /// Index levels whose block was read.
    pub levels_visited: usize,
    /// Whether a data block was read.
    pub data_block_read: bool,
}

impl SearchResult {
    fn new(index_levels: usize) -> Self {
        Self {
            outcome: SearchOutcome::NotFound,
            record: None,
            level_accesses: vec![0; index_levels],
            data_accesses: 0,
            levels_visited: 0,
            data_block_read: false,
        }
    }

    /// Ends the search as cancelled. A cancelled result never carries a record.
    fn cancelled(mut self) -> Self {
        self.outcome = SearchOutcome::Cancelled;
        self.record = None;
        self
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        self.outcome == SearchOutcome::Found
    }

    /// Entries read at `level` (1-based); 0 for levels that do not exist.
    pub fn accesses_at(&self, level: usize) -> usize {
        level
            .checked_sub(1)
            .and_then(|i| self.level_accesses.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// Entries read across all index levels.
    pub fn index_accesses(&self) -> usize {
        self.level_accesses.iter().sum()
    }

    /// Index entries plus data records read.
    pub fn total_accesses(&self) -> usize {
        self.index_accesses() + self.data_accesses
    }

    /// Blocks read: one per visited index level plus the data block.
    pub fn blocks_read(&self) -> usize {
        self.levels_visited + usize::from(self.data_block_read)
    }

    /// Simulated bytes read.
    ///
    /// Each index access is charged a full block, each data access one record.
    pub fn bytes_read(&self, configuration: &Configuration) -> usize {
        self.index_accesses() * configuration.block_size_bytes()
            + self.data_accesses * configuration.data_record_size_bytes()
    }
}

/// Searches a level sequence and its records.
///
/// Borrows everything it reads; it never mutates levels or records, so a
/// search can be abandoned at any point.
pub struct SearchEngine<'a> {
    levels: &'a [Level],
    records: &'a [DataRecord],
    data_per_block: usize,
    index_per_block: usize,
}

impl<'a> SearchEngine<'a> {
    /// Creates an engine over `levels` (bottom first) built from `records`.
    pub fn new(
        levels: &'a [Level],
        records: &'a [DataRecord],
        configuration: &Configuration,
    ) -> Self {
        Self {
            levels,
            records,
            data_per_block: configuration.data_records_per_block(),
            index_per_block: configuration.index_records_per_block(),
        }
    }

    /// Searches for `id` without progress reporting.
    pub fn search(&self, id: RecordId) -> SearchResult {
        self.search_with_progress(id, &mut NoProgress)
    }

    /// Searches for `id`, reporting every transition and probe to `sink`.
    ///
    /// Once the sink breaks, no further events are delivered and the result
    /// carries `SearchOutcome::Cancelled`, no record, and the counters
    /// accumulated so far.
    pub fn search_with_progress<S>(&self, id: RecordId, sink: &mut S) -> SearchResult
    where
        S: ProgressSink + ?Sized,
    {
        let top = self.levels.len();
        let mut result = SearchResult::new(top);

        let mut state = if top == 0 {
            SearchState::NotFound
        } else {
            SearchState::AtLevel(top)
        };
        if sink.on_event(&SearchEvent::Started { id, state }).is_break() {
            return result.cancelled();
        }

        // Position in the level (or record store) below the current state.
        let mut pointer = 0;
        loop {
            let next = match state {
                SearchState::AtLevel(k) => {
                    let level = &self.levels[k - 1];
                    let window = if k == top {
                        0..level.len()
                    } else {
                        level.window(pointer, self.index_per_block)
                    };
                    result.levels_visited += 1;

                    let mut next = SearchState::NotFound;
                    for position in window {
                        let entry = level.entries()[position];
                        result.level_accesses[k - 1] += 1;
                        let matched = entry.covers(id);
                        let event = SearchEvent::ProbeEntry {
                            level: k,
                            position,
                            entry,
                            matched,
                        };
                        if sink.on_event(&event).is_break() {
                            return result.cancelled();
                        }
                        if matched {
                            pointer = entry.pointer;
                            next = if k == 1 {
                                SearchState::AtData
                            } else {
                                SearchState::AtLevel(k - 1)
                            };
                            break;
                        }
                    }
                    next
                }
                SearchState::AtData => {
                    let end = pointer
                        .saturating_add(self.data_per_block)
                        .min(self.records.len());
                    result.data_block_read = true;

                    let mut next = SearchState::NotFound;
                    for position in pointer.min(end)..end {
                        let record = &self.records[position];
                        result.data_accesses += 1;
                        let matched = record.id == id;
                        let event = SearchEvent::ProbeRecord {
                            position,
                            id: record.id,
                            matched,
                        };
                        if sink.on_event(&event).is_break() {
                            return result.cancelled();
                        }
                        if matched {
                            result.record = Some(record.clone());
                            next = SearchState::Found;
                            break;
                        }
                    }
                    next
                }
                SearchState::Found => {
                    result.outcome = SearchOutcome::Found;
                    return result;
                }
                SearchState::NotFound => {
                    result.outcome = SearchOutcome::NotFound;
                    return result;
                }
            };

            let event = SearchEvent::Transition {
                from: state,
                to: next,
            };
            if sink.on_event(&event).is_break() {
                return result.cancelled();
            }
            state = next;
        }
    }
}

/// Cost of finding a key by scanning every record in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanCost {
    /// Whether the key was found.
    pub found: bool,
    /// Records read before stopping.
    pub records_read: usize,
    /// Data blocks touched.
    pub blocks_read: usize,
}

/// Returns the cost of a sequential scan for `id`, the baseline an index beats.
///
/// Records are sorted, so the scan stops at the first id greater than `id`.
pub fn scan_without_index(records: &[DataRecord], id: RecordId, data_per_block: usize) -> ScanCost {
    let data_per_block = data_per_block.max(1);
    let mut records_read = 0;
    let mut found = false;
    for record in records {
        records_read += 1;
        if record.id >= id {
            found = record.id == id;
            break;
        }
    }
    ScanCost {
        found,
        records_read,
        blocks_read: records_read.div_ceil(data_per_block),
    }
}
