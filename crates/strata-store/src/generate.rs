//! Random dataset generation.

use rand::Rng;
use rand::seq::SliceRandom;
use strata_common::{DataRecord, RecordId};
use tracing::warn;

const NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "Dave", "Erin", "Frank", "Grace", "Heidi", "Ivan", "Judy",
    "Mallory", "Niaj", "Olivia", "Peggy", "Rupert", "Sybil", "Trent", "Victor", "Walter",
];

/// Parameters for `generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Number of records to produce.
    pub count: usize,
    /// Id of the first record.
    pub first_id: RecordId,
    /// Largest gap between consecutive ids (at least 1).
    pub max_id_gap: RecordId,
    /// Inclusive age range.
    pub min_age: u32,
    pub max_age: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            first_id: 1,
            max_id_gap: 5,
            min_age: 18,
            max_age: 90,
        }
    }
}

/// Generates records with strictly ascending, unique ids.
///
/// Gaps between ids are random so that lookups of absent keys fall inside
/// indexed ranges, not only outside them. Generation stops early, returning
/// fewer than `count` records, once the next id would exceed `RecordId::MAX`.
pub fn generate<R: Rng>(config: &GeneratorConfig, rng: &mut R) -> Vec<DataRecord> {
    let max_gap = config.max_id_gap.max(1);
    let (min_age, max_age) = if config.min_age <= config.max_age {
        (config.min_age, config.max_age)
    } else {
        (config.max_age, config.min_age)
    };

    if config.count == 0 {
        return Vec::new();
    }

    let mut records = Vec::with_capacity(config.count);
    let mut id = config.first_id;
    loop {
        let name = NAMES.choose(rng).copied().unwrap_or("Anonymous");
        records.push(DataRecord::new(id, name, rng.gen_range(min_age..=max_age)));
        if records.len() >= config.count {
            break;
        }
        match id.checked_add(rng.gen_range(1..=max_gap)) {
            Some(next) => id = next,
            None => {
                warn!(
                    generated = records.len(),
                    requested = config.count,
                    "record id space exhausted"
                );
                break;
            }
        }
    }
    records
}
