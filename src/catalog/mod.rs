//! Derived-index builder and the synchronized views
//!
//! One raw snapshot in, one immutable [`Catalog`] out:
//!
//! ```text
//! RawSnapshot -> Catalog::build -> { by_id, in_order, by_channel, by_date }
//! ```
//!
//! Downstream consumers treat the catalog as read-only; filtered or
//! reordered presentations come from the tree's derived operations, never
//! from mutating the views.

mod builder;

pub use builder::{Catalog, CatalogStats};
