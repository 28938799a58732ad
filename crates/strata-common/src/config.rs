//! Block and record size configuration for Strata.

use crate::error::{Result, StrataError};
use serde::{Deserialize, Serialize};

/// Smallest block size accepted, in bytes.
pub const MIN_BLOCK_SIZE_BYTES: usize = 32;

/// Smallest data or index record size accepted, in bytes.
pub const MIN_RECORD_SIZE_BYTES: usize = 4;

/// Smallest index fan-out (index records per block) that lets levels shrink.
pub const MIN_FANOUT: usize = 2;

/// Byte sizes that determine how many records fit in one logical block.
///
/// Blocks are an accounting unit only: nothing is laid out on disk. The sizes
/// decide the records per data block, the index fan-out, and the simulated
/// bytes read by a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Size of one block in bytes.
    pub block_size_bytes: usize,
    /// Size of one data record in bytes.
    pub data_record_size_bytes: usize,
    /// Size of one index entry in bytes.
    pub index_record_size_bytes: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            block_size_bytes: 512,
            data_record_size_bytes: 64,  // 8 records per data block
            index_record_size_bytes: 16, // fan-out of 32
        }
    }
}

impl IndexConfig {
    /// Creates a config from the three byte sizes.
    pub fn new(
        block_size_bytes: usize,
        data_record_size_bytes: usize,
        index_record_size_bytes: usize,
    ) -> Self {
        Self {
            block_size_bytes,
            data_record_size_bytes,
            index_record_size_bytes,
        }
    }

    /// Checks the sizes before anything is built from them.
    pub fn validate(&self) -> Result<()> {
        if self.block_size_bytes < MIN_BLOCK_SIZE_BYTES {
            return Err(StrataError::invalid_parameter(
                "block_size_bytes",
                self.block_size_bytes,
            ));
        }
        if self.data_record_size_bytes < MIN_RECORD_SIZE_BYTES {
            return Err(StrataError::invalid_parameter(
                "data_record_size_bytes",
                self.data_record_size_bytes,
            ));
        }
        if self.index_record_size_bytes < MIN_RECORD_SIZE_BYTES {
            return Err(StrataError::invalid_parameter(
                "index_record_size_bytes",
                self.index_record_size_bytes,
            ));
        }

        let largest = self.data_record_size_bytes.max(self.index_record_size_bytes);
        if self.block_size_bytes < largest {
            return Err(StrataError::ConfigError(format!(
                "block size {} is smaller than record size {}",
                self.block_size_bytes, largest
            )));
        }

        let fanout = self.index_records_per_block();
        if fanout < MIN_FANOUT {
            return Err(StrataError::ConfigError(format!(
                "index fan-out {} is below {}: levels would never shrink",
                fanout, MIN_FANOUT
            )));
        }

        Ok(())
    }

    /// Returns the number of data records per block (at least 1).
    pub fn data_records_per_block(&self) -> usize {
        (self.block_size_bytes / self.data_record_size_bytes.max(1)).max(1)
    }

    /// Returns the number of index entries per block (the fan-out).
    pub fn index_records_per_block(&self) -> usize {
        self.block_size_bytes / self.index_record_size_bytes.max(1)
    }
}
