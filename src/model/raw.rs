//! Raw snapshot records
//!
//! Wire shapes for the dataset snapshot, as produced by the archive updater.
//! The builder is agnostic to where the JSON came from (file, HTTP response,
//! test fixture); it only sees these structures.

use serde::Deserialize;
use std::collections::HashMap;

use crate::model::types::Channel;

/// A whole-dataset snapshot: every build starts from one of these
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnapshot {
    /// Channel id -> channel metadata
    #[serde(default)]
    pub channels: HashMap<String, Channel>,
    /// Stream records in chronological order (oldest first)
    #[serde(default)]
    pub streams: Vec<RawStream>,
    /// Clip records, each referencing its source streams by id
    #[serde(default)]
    pub clips: Vec<RawClip>,
}

impl RawSnapshot {
    /// Parse a snapshot from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A stream record as it appears in the snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct RawStream {
    /// Unique stream id
    pub id: String,
    /// Channel the stream belongs to
    pub channel: String,
    /// Publish timestamp; RFC 3339 or a bare `YYYY-MM-DD` date
    pub published_at: String,
    /// Display title
    pub title: String,
}

/// A clip record as it appears in the snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct RawClip {
    /// Unique clip id
    pub id: String,
    /// Display title
    pub title: String,
    /// Ids of the streams this clip was cut from
    #[serde(default)]
    pub sources: Vec<String>,
}
