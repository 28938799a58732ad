//! Strata common types, errors, and configuration.
//!
//! This crate provides shared definitions used across all Strata components.

pub mod config;
pub mod error;
pub mod record;

pub use config::{IndexConfig, MIN_BLOCK_SIZE_BYTES, MIN_FANOUT, MIN_RECORD_SIZE_BYTES};
pub use error::{Result, StrataError};
pub use record::{DataRecord, RecordId};
