//! # Streamdex
//!
//! Derived-view index for timestamped stream archives. One snapshot of raw
//! stream and clip records goes in; four synchronized, read-only views come
//! out:
//!
//! - **by id**: direct stream lookup
//! - **in order**: the chronological sequence
//! - **by channel**: per-channel chronological groups
//! - **by date**: a hierarchical year -> month -> day bucket tree
//!
//! The whole build is one synchronous, all-or-nothing computation over an
//! in-memory snapshot; every view is immutable once built. Filtered and
//! reversed presentations are derived as fresh trees, never by mutation.
//!
//! ## Modules
//!
//! - [`model`]: raw snapshot records and resolved entities
//! - [`tree`]: granularities, ordered bucket maps, the date tree
//! - [`catalog`]: the derived-index builder and its views
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use streamdex::Catalog;
//!
//! let json = r#"{
//!     "streams": [
//!         { "id": "s1", "channel": "alpha", "published_at": "2021-03-04T10:00:00Z", "title": "Opening" },
//!         { "id": "s2", "channel": "alpha", "published_at": "2021-03-05T10:00:00Z", "title": "Day two" }
//!     ],
//!     "clips": [
//!         { "id": "c1", "title": "Best moments", "sources": ["s1", "s2"] }
//!     ]
//! }"#;
//!
//! let catalog = Catalog::from_json(json)?;
//!
//! assert_eq!(catalog.stream_by_id("s1").unwrap().clips.len(), 1);
//! assert_eq!(catalog.by_channel("alpha").len(), 2);
//! assert_eq!(catalog.by_date().total_entries(), 2);
//! # Ok::<(), streamdex::BuildError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod model;
pub mod tree;

// Re-export top-level types for convenience
pub use catalog::{Catalog, CatalogStats};

pub use model::{
    BuildError, BuildResult, Channel, Clip, ClipId, RawClip, RawSnapshot, RawStream, Stream,
    StreamId,
};

pub use tree::{
    BucketKey, BucketMap, DateTree, Granularity, TreeChild, TreeError, DEFAULT_GRANULARITIES,
};

pub use config::{Config, ConfigError, IndexConfig, LoggingConfig};
