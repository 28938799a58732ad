//! Record storage for Strata.
//!
//! This crate provides:
//! - `RecordStore`, the sorted in-memory collection of data records
//! - Plain-text persistence, one `id,name,age` record per line
//! - Random dataset generation for demonstrations

mod generate;
mod store;
mod text;

pub use generate::{GeneratorConfig, generate};
pub use store::RecordStore;
pub use text::{format_records, parse_records};
