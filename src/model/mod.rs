//! Data model: raw snapshot records and resolved entities
//!
//! - **raw**: wire shapes of the snapshot (serde DTOs)
//! - **types**: resolved `Stream`/`Clip`/`Channel` entities and arena ids
//! - **error**: build error taxonomy

pub mod error;
pub mod raw;
pub mod types;

pub use error::{BuildError, BuildResult};
pub use raw::{RawClip, RawSnapshot, RawStream};
pub use types::{Channel, Clip, ClipId, Stream, StreamId};

use chrono::{DateTime, NaiveDate, Utc};

/// Parse a snapshot timestamp
///
/// Accepts RFC 3339 (the updater's native format) and bare `YYYY-MM-DD`
/// dates, which normalize to midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = raw.parse::<NaiveDate>().ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}
