//! Data records held by the record store.

use serde::{Deserialize, Serialize};

/// Primary key of a data record.
pub type RecordId = i64;

/// A data record `(id, name, age)`.
///
/// Records are replaced, never edited in place; the store keeps them sorted by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataRecord {
    /// Unique key.
    pub id: RecordId,
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: u32,
}

impl DataRecord {
    /// Creates a new record.
    pub fn new(id: RecordId, name: impl Into<String>, age: u32) -> Self {
        Self {
            id,
            name: name.into(),
            age,
        }
    }
}

impl std::fmt::Display for DataRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.id, self.name, self.age)
    }
}
