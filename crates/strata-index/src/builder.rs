//! Builds sparse index levels bottom-up.

use crate::level::{IndexEntry, Level, TargetType};
use strata_common::{DataRecord, MIN_FANOUT, Result, StrataError};

/// Builds level 1: one entry per block of `data_per_block` consecutive records.
///
/// `records` must be sorted by id. The last block may be short.
pub fn build_level1(records: &[DataRecord], data_per_block: usize) -> Level {
    let data_per_block = data_per_block.max(1);
    let entries = records
        .chunks(data_per_block)
        .enumerate()
        .map(|(block_id, block)| IndexEntry {
            level: 1,
            block_id,
            first_key: block[0].id,
            last_key: block[block.len() - 1].id,
            pointer: block_id * data_per_block,
            target: TargetType::Data,
        })
        .collect();
    Level::new(1, entries)
}

/// Builds level `level_number` with one entry per block of `index_per_block`
/// entries of `lower`.
pub fn build_upper_level(lower: &Level, level_number: usize, index_per_block: usize) -> Level {
    let index_per_block = index_per_block.max(1);
    let entries = lower
        .entries()
        .chunks(index_per_block)
        .enumerate()
        .map(|(block_id, block)| IndexEntry {
            level: level_number,
            block_id,
            first_key: block[0].first_key,
            last_key: block[block.len() - 1].last_key,
            pointer: block_id * index_per_block,
            target: TargetType::Level(level_number - 1),
        })
        .collect();
    Level::new(level_number, entries)
}

/// Builds every index level, bottom first, until one level fits in a block.
///
/// Returns no levels for no records. Fails if `index_per_block` is below
/// `MIN_FANOUT` (levels would never shrink) or `data_per_block` is zero.
pub fn build_all(
    records: &[DataRecord],
    data_per_block: usize,
    index_per_block: usize,
) -> Result<Vec<Level>> {
    if data_per_block == 0 {
        return Err(StrataError::invalid_parameter("data_per_block", data_per_block));
    }
    if index_per_block < MIN_FANOUT {
        return Err(StrataError::ConfigError(format!(
            "index fan-out {} is below {}: levels would never shrink",
            index_per_block, MIN_FANOUT
        )));
    }
    Ok(build_levels(records, data_per_block, index_per_block))
}

/// Builds the levels for a fan-out already known to be at least `MIN_FANOUT`.
pub(crate) fn build_levels(
    records: &[DataRecord],
    data_per_block: usize,
    index_per_block: usize,
) -> Vec<Level> {
    let mut levels = Vec::new();
    if records.is_empty() {
        return levels;
    }

    let mut current = build_level1(records, data_per_block);
    while current.len() > index_per_block {
        let next = build_upper_level(&current, current.number() + 1, index_per_block);
        levels.push(current);
        current = next;
    }
    levels.push(current);
    levels
}
