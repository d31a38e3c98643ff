//! Core entity types for the stream catalog
//!
//! A snapshot contains two record families loaded independently: streams (the
//! primary kind, one per archived broadcast) and clips (the secondary kind,
//! cut from one or more streams). Cross references between the two are arena
//! indices - [`StreamId`] and [`ClipId`] index the catalog's entity vectors -
//! which keeps the two-way graph cycle-free and lets every derived view share
//! the same records without copying.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Arena index of a stream within a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(pub u32);

/// Arena index of a clip within a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u32);

/// An archived broadcast
///
/// `clips` starts empty and is populated once during the build phase, in the
/// order clip records were processed; never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    /// Unique id from the raw snapshot (e.g. a video id)
    pub id: String,
    /// Channel the stream belongs to (the grouping category)
    pub channel: String,
    /// Publish instant, normalized to UTC
    pub published_at: DateTime<Utc>,
    /// Display title
    pub title: String,
    /// Clips cut from this stream, in clip-processing order
    pub clips: Vec<ClipId>,
}

/// A clip derived from zero or more streams
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// Unique id from the raw snapshot
    pub id: String,
    /// Display title
    pub title: String,
    /// Source streams the clip was cut from, dangling references dropped
    pub sources: Vec<StreamId>,
}

/// Channel metadata carried through from the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Upstream channel id
    pub id: String,
    /// Display name
    pub name: String,
    /// Avatar image URL, if the snapshot provides one
    #[serde(default)]
    pub image_url: Option<String>,
}
