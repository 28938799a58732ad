//! Sorted in-memory record store.

use crate::text::{format_records, parse_records};
use std::path::Path;
use strata_common::{DataRecord, RecordId, Result, StrataError};
use tracing::debug;

/// The sorted collection of data records that every index level is derived from.
///
/// Records are kept in ascending `id` order with no duplicates. Positions in
/// `as_slice()` are what level 1 index entries point at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<DataRecord>,
}

impl RecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Creates a store from records in any order.
    ///
    /// Fails with `DuplicateKey` if two records share an id.
    pub fn from_records(mut records: Vec<DataRecord>) -> Result<Self> {
        records.sort_by_key(|r| r.id);
        if let Some(pair) = records.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(StrataError::DuplicateKey { id: pair[0].id });
        }
        Ok(Self { records })
    }

    /// Loads a store from a text file with one `id,name,age` record per line.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let store = Self::from_records(parse_records(&text)?)?;
        debug!(path = %path.display(), records = store.len(), "loaded records");
        Ok(store)
    }

    /// Writes the store to a text file, replacing any existing content.
    ///
    /// Nothing is written if a record name cannot be represented as one line.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, format_records(&self.records)?)?;
        debug!(path = %path.display(), records = self.len(), "saved records");
        Ok(())
    }

    /// Returns the number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the records in ascending id order.
    #[inline]
    pub fn as_slice(&self) -> &[DataRecord] {
        &self.records
    }

    /// Iterates the records in ascending id order.
    pub fn iter(&self) -> std::slice::Iter<'_, DataRecord> {
        self.records.iter()
    }

    /// Returns the position of `id`, if present.
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.records.binary_search_by_key(&id, |r| r.id).ok()
    }

    /// Looks up a record by id.
    pub fn get(&self, id: RecordId) -> Option<&DataRecord> {
        self.position(id).map(|pos| &self.records[pos])
    }

    /// Returns true if a record with `id` exists.
    pub fn contains(&self, id: RecordId) -> bool {
        self.position(id).is_some()
    }

    /// Inserts a record at its sorted position.
    ///
    /// Fails with `DuplicateKey` and leaves the store unchanged if the id exists.
    pub fn insert(&mut self, record: DataRecord) -> Result<()> {
        match self.records.binary_search_by_key(&record.id, |r| r.id) {
            Ok(_) => Err(StrataError::DuplicateKey { id: record.id }),
            Err(pos) => {
                self.records.insert(pos, record);
                Ok(())
            }
        }
    }

    /// Removes and returns the record with `id`, or None if absent.
    pub fn remove(&mut self, id: RecordId) -> Option<DataRecord> {
        self.position(id).map(|pos| self.records.remove(pos))
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a DataRecord;
    type IntoIter = std::slice::Iter<'a, DataRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
