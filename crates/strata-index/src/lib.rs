//! Multilevel sparse index engine for Strata.
//!
//! The engine derives how many index levels a dataset needs, builds each
//! level from the one below, and searches top-down while counting simulated
//! block accesses.
//!
//! ```text
//! level 2   [10..120 -> 0] [130..150 -> 4]                 (top, one block)
//!               |
//! level 1   [10..30 -> 0] [40..60 -> 3] [70..90 -> 6] [100..120 -> 9] | [130..150 -> 12]
//!                                          |
//! data      10 20 30 | 40 50 60 | 70 80 90 | 100 110 120 | 130 140 150
//! ```
//!
//! Every mutation rebuilds the whole hierarchy and publishes it as one
//! immutable `IndexSnapshot`, so readers never see a partially built index.

mod builder;
mod calculator;
mod level;
mod multilevel;
mod search;
mod task;

pub use builder::{build_all, build_level1, build_upper_level};
pub use calculator::{Configuration, LevelPlan, configure, level_plan, required_levels};
pub use level::{IndexEntry, Level, TargetType};
pub use multilevel::{IndexSnapshot, MultilevelIndex};
pub use search::{
    NoProgress, ProgressSink, ScanCost, SearchEngine, SearchEvent, SearchOutcome, SearchResult,
    SearchState, scan_without_index,
};
pub use task::{SearchTask, spawn_search};
