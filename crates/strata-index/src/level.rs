//! Index entries and levels.

use std::ops::Range;
use strata_common::RecordId;

/// What an index entry's `pointer` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    /// Position of the first record of a data block.
    Data,
    /// Position of the first entry of a block in the given index level.
    Level(usize),
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetType::Data => write!(f, "DATA"),
            TargetType::Level(n) => write!(f, "LEVEL_{}", n),
        }
    }
}

/// One entry of a sparse index level, describing one block of the level below.
///
/// `pointer` is a position, never a byte offset: for level 1 it indexes the
/// record store, for level `k > 1` it indexes level `k - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexEntry {
    /// Level this entry belongs to (>= 1).
    pub level: usize,
    /// Block number of the described block within the level below.
    pub block_id: usize,
    /// Smallest key in the described block.
    pub first_key: RecordId,
    /// Largest key in the described block.
    pub last_key: RecordId,
    /// Position of the described block's first element in the level below.
    pub pointer: usize,
    /// Kind of structure `pointer` refers to.
    pub target: TargetType,
}

impl IndexEntry {
    /// Returns true if `id` falls inside `[first_key, last_key]`.
    #[inline]
    pub fn covers(&self, id: RecordId) -> bool {
        self.first_key <= id && id <= self.last_key
    }
}

impl std::fmt::Display for IndexEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "L{} #{} [{}..{}] -> {}@{}",
            self.level, self.block_id, self.first_key, self.last_key, self.target, self.pointer
        )
    }
}

/// An ordered sequence of entries that all share one level number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    number: usize,
    entries: Vec<IndexEntry>,
}

impl Level {
    pub(crate) fn new(number: usize, entries: Vec<IndexEntry>) -> Self {
        debug_assert!(entries.iter().all(|e| e.level == number));
        Self { number, entries }
    }

    /// Level number (1 = points at data).
    #[inline]
    pub fn number(&self) -> usize {
        self.number
    }

    #[inline]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&IndexEntry> {
        self.entries.get(position)
    }

    /// Returns `[start, start + width)` clamped to the level length.
    pub fn window(&self, start: usize, width: usize) -> Range<usize> {
        let end = start.saturating_add(width).min(self.entries.len());
        start.min(end)..end
    }

    /// Number of index blocks this level occupies with the given fan-out.
    pub fn blocks(&self, index_per_block: usize) -> usize {
        self.entries.len().div_ceil(index_per_block.max(1))
    }

    /// Key range covered by the whole level.
    pub fn key_range(&self) -> Option<(RecordId, RecordId)> {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => Some((first.first_key, last.last_key)),
            _ => None,
        }
    }
}
