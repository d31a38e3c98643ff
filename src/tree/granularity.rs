//! Date granularities and bucket key normalization
//!
//! A [`Granularity`] names a truncation resolution for timestamps. Truncating
//! a timestamp to the start of its period and taking the unix seconds of that
//! instant yields a [`BucketKey`]: two timestamps that fall in the same period
//! always normalize to the same key. All truncation happens in UTC so a
//! dataset never straddles bucket boundaries because of timezone offsets.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::tree::BucketKey;

/// Truncation resolution for timestamp bucketing, coarsest to finest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Calendar year
    Year,
    /// Calendar month
    Month,
    /// Calendar day
    #[serde(alias = "date")]
    Day,
    /// Clock hour
    Hour,
}

impl Granularity {
    /// Truncate a timestamp to the start of this granularity's period (UTC)
    pub fn truncate(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let truncated = match self {
            Self::Year => ts
                .with_month(1)
                .and_then(|d| d.with_day(1))
                .and_then(|d| d.with_hour(0))
                .and_then(|d| d.with_minute(0))
                .and_then(|d| d.with_second(0))
                .and_then(|d| d.with_nanosecond(0)),
            Self::Month => ts
                .with_day(1)
                .and_then(|d| d.with_hour(0))
                .and_then(|d| d.with_minute(0))
                .and_then(|d| d.with_second(0))
                .and_then(|d| d.with_nanosecond(0)),
            Self::Day => ts
                .with_hour(0)
                .and_then(|d| d.with_minute(0))
                .and_then(|d| d.with_second(0))
                .and_then(|d| d.with_nanosecond(0)),
            Self::Hour => ts
                .with_minute(0)
                .and_then(|d| d.with_second(0))
                .and_then(|d| d.with_nanosecond(0)),
        };

        truncated.unwrap_or(ts)
    }

    /// Normalize a timestamp to its bucket key at this granularity
    ///
    /// Equal truncations yield equal keys; this is the sole property the
    /// bucket map relies on for addressing.
    pub fn normalize(&self, ts: DateTime<Utc>) -> BucketKey {
        BucketKey(self.truncate(ts).timestamp())
    }

    /// Render a heading for a bucket at this granularity
    pub fn label(&self, ts: DateTime<Utc>) -> String {
        match self {
            Self::Year => ts.format("%Y").to_string(),
            Self::Month => ts.format("%B %Y").to_string(),
            Self::Day => ts.format("%B %-d").to_string(),
            Self::Hour => ts.format("%B %-d, %H:00").to_string(),
        }
    }

    /// Parse from string
    ///
    /// Accepts `"date"` as an alias for day, matching the raw snapshot
    /// vocabulary.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "year" | "y" => Some(Self::Year),
            "month" | "m" => Some(Self::Month),
            "day" | "date" | "d" => Some(Self::Day),
            "hour" | "h" => Some(Self::Hour),
            _ => None,
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown granularity: {}", s))
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Year => write!(f, "year"),
            Self::Month => write!(f, "month"),
            Self::Day => write!(f, "day"),
            Self::Hour => write!(f, "hour"),
        }
    }
}

/// The default granularity sequence: year -> month -> day
pub const DEFAULT_GRANULARITIES: [Granularity; 3] =
    [Granularity::Year, Granularity::Month, Granularity::Day];

impl BucketKey {
    /// The start-of-period instant this key identifies
    pub fn as_datetime(&self) -> DateTime<Utc> {
        match Utc.timestamp_opt(self.0, 0) {
            chrono::LocalResult::Single(dt) => dt,
            // Keys are produced from valid timestamps, so this is unreachable
            // for keys that came out of `normalize`.
            _ => DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}
