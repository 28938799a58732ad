//! Level-count and block-geometry calculations.

use strata_common::{IndexConfig, MIN_FANOUT, Result, StrataError};

/// Returns the total number of levels a dataset needs, counting the data level.
///
/// `required_levels(n, d, f) - 1` is the number of index levels that
/// `build_all` produces for `n` records. An empty dataset needs a single
/// (empty) level.
///
/// `data_per_block` is clamped to 1 and `index_per_block` to `MIN_FANOUT`, so
/// the function neither divides by zero nor loops forever.
pub fn required_levels(
    total_records: usize,
    data_per_block: usize,
    index_per_block: usize,
) -> usize {
    if total_records == 0 {
        return 1;
    }

    let data_per_block = data_per_block.max(1);
    let index_per_block = index_per_block.max(MIN_FANOUT);

    // Entries in level 1 = number of data blocks.
    let mut entries = total_records.div_ceil(data_per_block);
    let mut index_levels = 1;
    while entries > index_per_block {
        entries = entries.div_ceil(index_per_block);
        index_levels += 1;
    }

    index_levels + 1
}

/// Entry and block counts of one index level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelPlan {
    /// Level number (1 = points at data blocks).
    pub level: usize,
    /// Number of index entries in the level.
    pub entries: usize,
    /// Number of index blocks the entries occupy.
    pub blocks: usize,
}

/// Returns the per-level breakdown, bottom level first.
///
/// Empty for an empty dataset. Each level's block count is the entry count of
/// the level above it.
pub fn level_plan(
    total_records: usize,
    data_per_block: usize,
    index_per_block: usize,
) -> Vec<LevelPlan> {
    let mut plan = Vec::new();
    if total_records == 0 {
        return plan;
    }

    let data_per_block = data_per_block.max(1);
    let index_per_block = index_per_block.max(MIN_FANOUT);

    let mut entries = total_records.div_ceil(data_per_block);
    let mut level = 1;
    loop {
        let blocks = entries.div_ceil(index_per_block);
        plan.push(LevelPlan {
            level,
            entries,
            blocks,
        });
        if entries <= index_per_block {
            break;
        }
        entries = blocks;
        level += 1;
    }
    plan
}

/// Derived, immutable block geometry for a dataset.
///
/// Only obtainable from a validated `IndexConfig`, so every `Configuration`
/// carries a fan-out of at least `MIN_FANOUT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    block_size_bytes: usize,
    data_record_size_bytes: usize,
    index_record_size_bytes: usize,
    data_records_per_block: usize,
    index_records_per_block: usize,
    record_count: usize,
    total_levels: usize,
}

/// Validates `config` and derives the geometry for `record_count` records.
///
/// `record_count` must be positive. Indexes that become empty keep their
/// geometry through `Configuration::with_record_count`.
pub fn configure(record_count: usize, config: &IndexConfig) -> Result<Configuration> {
    if record_count == 0 {
        return Err(StrataError::invalid_parameter("record_count", record_count));
    }
    Ok(geometry(config)?.with_record_count(record_count))
}

/// Validates `config` and derives its geometry for an empty dataset.
pub(crate) fn geometry(config: &IndexConfig) -> Result<Configuration> {
    config.validate()?;

    Ok(Configuration {
        block_size_bytes: config.block_size_bytes,
        data_record_size_bytes: config.data_record_size_bytes,
        index_record_size_bytes: config.index_record_size_bytes,
        data_records_per_block: config.data_records_per_block(),
        index_records_per_block: config.index_records_per_block(),
        record_count: 0,
        total_levels: 1,
    })
}

impl Configuration {
    /// Returns the same geometry recomputed for a different record count.
    pub fn with_record_count(&self, record_count: usize) -> Self {
        Self {
            record_count,
            total_levels: required_levels(
                record_count,
                self.data_records_per_block,
                self.index_records_per_block,
            ),
            ..*self
        }
    }

    /// Returns the byte sizes this geometry was derived from.
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig::new(
            self.block_size_bytes,
            self.data_record_size_bytes,
            self.index_record_size_bytes,
        )
    }

    #[inline]
    pub fn block_size_bytes(&self) -> usize {
        self.block_size_bytes
    }

    #[inline]
    pub fn data_record_size_bytes(&self) -> usize {
        self.data_record_size_bytes
    }

    #[inline]
    pub fn index_record_size_bytes(&self) -> usize {
        self.index_record_size_bytes
    }

    /// Data records per block.
    #[inline]
    pub fn data_records_per_block(&self) -> usize {
        self.data_records_per_block
    }

    /// Index entries per block (fan-out).
    #[inline]
    pub fn index_records_per_block(&self) -> usize {
        self.index_records_per_block
    }

    #[inline]
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Total levels including the data level.
    #[inline]
    pub fn total_levels(&self) -> usize {
        self.total_levels
    }

    /// Number of index levels (excludes the data level).
    #[inline]
    pub fn index_levels(&self) -> usize {
        self.total_levels - 1
    }

    /// Number of data blocks the records occupy.
    pub fn data_blocks(&self) -> usize {
        self.record_count.div_ceil(self.data_records_per_block)
    }

    /// Per-level entry and block breakdown for this geometry.
    pub fn level_plan(&self) -> Vec<LevelPlan> {
        level_plan(
            self.record_count,
            self.data_records_per_block,
            self.index_records_per_block,
        )
    }
}
