//! Time-bucketed index structures
//!
//! Building blocks for the date-tree view:
//!
//! - **Granularity**: truncation resolutions and bucket key normalization
//! - **BucketMap**: key -> payload map iterated in first-insertion order
//! - **DateTree**: recursive partition, one bucket map per granularity level
//!
//! # Architecture
//!
//! ```text
//! sorted (timestamp, value) pairs
//!        |
//! DateTree[year]  ->  BucketMap: 2020 -> subtree, 2021 -> subtree
//!        |
//! DateTree[month] ->  BucketMap: Dec -> subtree, ...
//!        |
//! DateTree[day]   ->  BucketMap: 30th -> [values], 31st -> [values]
//! ```

mod bucket_map;
mod date_tree;
mod granularity;

pub use bucket_map::BucketMap;
pub use date_tree::{DateTree, TreeChild, TreeError};
pub use granularity::{Granularity, DEFAULT_GRANULARITIES};

use serde::{Deserialize, Serialize};

/// Normalized identifier of a truncation window at some granularity
///
/// The wrapped value is the unix-seconds instant of the window's start, so
/// keys at one granularity compare chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BucketKey(pub i64);
