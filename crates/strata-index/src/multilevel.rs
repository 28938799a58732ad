//! The multilevel index aggregate: records, configuration, and derived levels.

use crate::builder::build_levels;
use crate::calculator::{Configuration, geometry};
use crate::level::Level;
use crate::search::{ProgressSink, SearchEngine, SearchResult};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use strata_common::{DataRecord, IndexConfig, RecordId, Result};
use strata_store::RecordStore;
use tracing::{debug, trace, warn};

/// One complete, immutable state of a multilevel index.
///
/// Levels are derived from `records` under `configuration` and never patched;
/// any change produces a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSnapshot {
    configuration: Configuration,
    records: RecordStore,
    levels: Vec<Level>,
}

impl IndexSnapshot {
    /// Builds every level for `records` using the geometry of `configuration`.
    fn build(configuration: &Configuration, records: RecordStore) -> Self {
        let configuration = configuration.with_record_count(records.len());
        let levels = build_levels(
            records.as_slice(),
            configuration.data_records_per_block(),
            configuration.index_records_per_block(),
        );
        debug_assert_eq!(
            levels.len(),
            configuration.index_levels(),
            "built levels disagree with the level calculation"
        );
        Self {
            configuration,
            records,
            levels,
        }
    }

    #[inline]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    #[inline]
    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// Index levels, level 1 first.
    #[inline]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Returns level `number` (1-based).
    pub fn level(&self, number: usize) -> Option<&Level> {
        number.checked_sub(1).and_then(|i| self.levels.get(i))
    }

    /// Returns the topmost level, if any records exist.
    pub fn top_level(&self) -> Option<&Level> {
        self.levels.last()
    }

    /// Returns a search engine over this snapshot.
    pub fn engine(&self) -> SearchEngine<'_> {
        SearchEngine::new(&self.levels, self.records.as_slice(), &self.configuration)
    }

    pub fn search(&self, id: RecordId) -> SearchResult {
        self.engine().search(id)
    }

    pub fn search_with_progress<S>(&self, id: RecordId, sink: &mut S) -> SearchResult
    where
        S: ProgressSink + ?Sized,
    {
        self.engine().search_with_progress(id, sink)
    }
}

/// A multilevel sparse index over a sorted record store.
///
/// Readers take an `Arc` of the current snapshot and work on it without
/// holding any lock. Writers are serialized, build a complete new snapshot
/// off-lock, and publish it with a single pointer swap, so a partially built
/// index is never observable.
///
/// Every mutation rebuilds all levels from scratch; block ids and pointers
/// are position-derived and cannot be patched in place.
pub struct MultilevelIndex {
    /// Current published state.
    current: RwLock<Arc<IndexSnapshot>>,
    /// Serializes writers.
    writer: Mutex<()>,
}

impl MultilevelIndex {
    /// Creates an index over `records` (any order, unique ids).
    pub fn new(config: IndexConfig, records: Vec<DataRecord>) -> Result<Self> {
        Self::from_store(config, RecordStore::from_records(records)?)
    }

    /// Creates an index over an existing store.
    pub fn from_store(config: IndexConfig, records: RecordStore) -> Result<Self> {
        let configuration = geometry(&config)?;
        let snapshot = IndexSnapshot::build(&configuration, records);
        debug!(
            records = snapshot.records.len(),
            levels = snapshot.levels.len(),
            fanout = snapshot.configuration.index_records_per_block(),
            "built multilevel index"
        );
        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
        })
    }

    /// Creates an index with no records.
    pub fn empty(config: IndexConfig) -> Result<Self> {
        Self::from_store(config, RecordStore::new())
    }

    /// Returns the current snapshot.
    #[inline]
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Returns the current configuration.
    pub fn configuration(&self) -> Configuration {
        *self.current.read().configuration()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.current.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of index levels (excluding the data level).
    pub fn level_count(&self) -> usize {
        self.current.read().levels.len()
    }

    /// Recomputes configuration and levels from the current records.
    pub fn rebuild(&self) {
        let _guard = self.writer.lock();
        let current = self.snapshot();
        self.publish(IndexSnapshot::build(&current.configuration, current.records.clone()));
    }

    /// Inserts a record and rebuilds the whole index.
    ///
    /// Fails with `DuplicateKey` if the id exists; nothing changes in that case.
    pub fn insert(&self, record: DataRecord) -> Result<()> {
        let _guard = self.writer.lock();
        let current = self.snapshot();

        let mut records = current.records.clone();
        if let Err(e) = records.insert(record) {
            warn!(error = %e, "rejected insert");
            return Err(e);
        }
        self.publish(IndexSnapshot::build(&current.configuration, records));
        Ok(())
    }

    /// Deletes the record with `id` and rebuilds the whole index.
    ///
    /// Returns false, changing nothing, if no such record exists.
    pub fn delete(&self, id: RecordId) -> bool {
        let _guard = self.writer.lock();
        let current = self.snapshot();
        if !current.records.contains(id) {
            trace!(id, "delete of absent id");
            return false;
        }

        let mut records = current.records.clone();
        records.remove(id);
        self.publish(IndexSnapshot::build(&current.configuration, records));
        true
    }

    /// Replaces the block and record sizes and rebuilds.
    ///
    /// An invalid config is rejected and the index keeps its current state.
    pub fn reconfigure(&self, config: IndexConfig) -> Result<()> {
        let _guard = self.writer.lock();
        let current = self.snapshot();
        let configuration = geometry(&config).inspect_err(|e| {
            warn!(error = %e, "rejected configuration");
        })?;
        self.publish(IndexSnapshot::build(&configuration, current.records.clone()));
        Ok(())
    }

    /// Searches the current snapshot.
    pub fn search(&self, id: RecordId) -> SearchResult {
        let result = self.snapshot().search(id);
        trace!(
            id,
            outcome = ?result.outcome,
            index_accesses = result.index_accesses(),
            data_accesses = result.data_accesses,
            "search complete"
        );
        result
    }

    /// Searches the current snapshot, reporting progress to `sink`.
    pub fn search_with_progress<S>(&self, id: RecordId, sink: &mut S) -> SearchResult
    where
        S: ProgressSink + ?Sized,
    {
        self.snapshot().search_with_progress(id, sink)
    }

    /// Returns a clone of the record with `id`, if present.
    pub fn get(&self, id: RecordId) -> Option<DataRecord> {
        self.current.read().records.get(id).cloned()
    }

    /// Swaps in a fully built snapshot. Caller must hold the writer lock.
    fn publish(&self, snapshot: IndexSnapshot) {
        debug!(
            records = snapshot.records.len(),
            levels = snapshot.levels.len(),
            total_levels = snapshot.configuration.total_levels(),
            "published index snapshot"
        );
        *self.current.write() = Arc::new(snapshot);
    }
}

impl std::fmt::Debug for MultilevelIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("MultilevelIndex")
            .field("records", &snapshot.records.len())
            .field("levels", &snapshot.levels.len())
            .field("configuration", &snapshot.configuration)
            .finish()
    }
}
