//! Catalog builder
//!
//! Turns one raw snapshot into the four synchronized views in a single
//! synchronous pass:
//!
//! 1. streams parsed in input order -> `in_order`, indexed into `by_id`
//! 2. clip source ids resolved through `by_id`, links recorded on both sides
//! 3. `in_order` grouped by channel -> `by_channel`
//! 4. `in_order` bucketed into the `by_date` tree
//!
//! The build either completes and hands back a consistent, immutable catalog
//! or fails as a whole; the only lenient case is a clip referencing a stream
//! id absent from the snapshot, which drops that one link.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Instant;

use crate::model::{
    parse_timestamp, BuildError, BuildResult, Channel, Clip, ClipId, RawSnapshot, Stream, StreamId,
};
use crate::tree::{DateTree, Granularity, TreeError, DEFAULT_GRANULARITIES};

/// Immutable snapshot of the derived views
///
/// All views reference the same entity arenas; nothing is copied per view and
/// nothing is mutated after `build` returns. Duplicate stream ids resolve
/// last-write-wins in `by_id` while every record stays in `in_order` -
/// documented lenient behavior, not an error.
#[derive(Debug, Clone)]
pub struct Catalog {
    channels: HashMap<String, Channel>,
    streams: Vec<Stream>,
    clips: Vec<Clip>,
    by_id: HashMap<String, StreamId>,
    clips_by_id: HashMap<String, ClipId>,
    in_order: Vec<StreamId>,
    by_channel: HashMap<String, Vec<StreamId>>,
    by_date: DateTree<StreamId>,
    dropped_links: usize,
}

impl Catalog {
    /// Build a catalog with the default year/month/day date tree
    pub fn build(raw: RawSnapshot) -> BuildResult<Self> {
        Self::build_with_granularities(raw, &DEFAULT_GRANULARITIES)
    }

    /// Build a catalog from a JSON snapshot string
    pub fn from_json(json: &str) -> BuildResult<Self> {
        Self::build(RawSnapshot::from_json(json)?)
    }

    /// Build a catalog, bucketing the date tree at the given granularities
    pub fn build_with_granularities(
        raw: RawSnapshot,
        granularities: &[Granularity],
    ) -> BuildResult<Self> {
        // Configuration errors fail before any record is touched
        if granularities.is_empty() {
            return Err(TreeError::EmptyGranularities.into());
        }

        let started = Instant::now();

        // Pass 1: streams, in raw input order
        let mut streams = Vec::with_capacity(raw.streams.len());
        let mut by_id = HashMap::with_capacity(raw.streams.len());
        let mut in_order = Vec::with_capacity(raw.streams.len());

        for record in raw.streams {
            let published_at = parse_timestamp(&record.published_at).ok_or_else(|| {
                BuildError::MalformedTimestamp {
                    id: record.id.clone(),
                    value: record.published_at.clone(),
                }
            })?;

            let sid = StreamId(streams.len() as u32);
            by_id.insert(record.id.clone(), sid);
            in_order.push(sid);
            streams.push(Stream {
                id: record.id,
                channel: record.channel,
                published_at,
                title: record.title,
                clips: Vec::new(),
            });
        }

        // Pass 2: clips, resolving the link table on both sides
        let mut clips = Vec::with_capacity(raw.clips.len());
        let mut clips_by_id = HashMap::with_capacity(raw.clips.len());
        let mut dropped_links = 0usize;

        for record in raw.clips {
            let cid = ClipId(clips.len() as u32);
            let mut sources = Vec::with_capacity(record.sources.len());

            for source_id in &record.sources {
                match by_id.get(source_id) {
                    Some(&sid) => {
                        sources.push(sid);
                        streams[sid.0 as usize].clips.push(cid);
                    }
                    None => {
                        // The snapshot may legitimately reference streams
                        // outside a filtered subset; drop the link, keep the clip
                        dropped_links += 1;
                        tracing::debug!(
                            clip = %record.id,
                            source = %source_id,
                            "dropping link to unknown stream"
                        );
                    }
                }
            }

            clips_by_id.insert(record.id.clone(), cid);
            clips.push(Clip {
                id: record.id,
                title: record.title,
                sources,
            });
        }

        // Pass 3: group by channel, preserving relative chronological order
        let mut by_channel: HashMap<String, Vec<StreamId>> = HashMap::new();
        for &sid in &in_order {
            by_channel
                .entry(streams[sid.0 as usize].channel.clone())
                .or_default()
                .push(sid);
        }

        // Pass 4: the date tree over the chronological sequence
        let by_date = DateTree::new(
            in_order
                .iter()
                .map(|&sid| (streams[sid.0 as usize].published_at, sid))
                .collect(),
            granularities,
        )?;

        let catalog = Self {
            channels: raw.channels,
            streams,
            clips,
            by_id,
            clips_by_id,
            in_order,
            by_channel,
            by_date,
            dropped_links,
        };

        tracing::info!(
            streams = catalog.streams.len(),
            clips = catalog.clips.len(),
            channels = catalog.by_channel.len(),
            dropped_links,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "catalog built"
        );

        Ok(catalog)
    }

    /// Resolve a stream reference
    pub fn stream(&self, id: StreamId) -> &Stream {
        &self.streams[id.0 as usize]
    }

    /// Resolve a clip reference
    pub fn clip(&self, id: ClipId) -> &Clip {
        &self.clips[id.0 as usize]
    }

    /// Look up a stream by its snapshot id
    pub fn stream_by_id(&self, id: &str) -> Option<&Stream> {
        self.by_id.get(id).map(|&sid| self.stream(sid))
    }

    /// Look up a clip by its snapshot id
    pub fn clip_by_id(&self, id: &str) -> Option<&Clip> {
        self.clips_by_id.get(id).map(|&cid| self.clip(cid))
    }

    /// All streams in raw input (chronological) order
    pub fn in_order(&self) -> impl Iterator<Item = &Stream> {
        self.in_order.iter().map(move |&sid| self.stream(sid))
    }

    /// Streams of one channel, chronological; empty for unknown channels
    pub fn by_channel(&self, channel: &str) -> &[StreamId] {
        self.by_channel
            .get(channel)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Channels that have at least one stream
    pub fn channels_with_streams(&self) -> impl Iterator<Item = &str> {
        self.by_channel.keys().map(String::as_str)
    }

    /// Channel metadata from the snapshot
    pub fn channels(&self) -> &HashMap<String, Channel> {
        &self.channels
    }

    /// The time-bucketed tree over all streams
    pub fn by_date(&self) -> &DateTree<StreamId> {
        &self.by_date
    }

    /// A fresh date tree restricted to one channel's streams
    pub fn by_date_for_channel(&self, channel: &str) -> DateTree<StreamId> {
        self.by_date.prune(
            |&sid| self.stream(sid).channel == channel,
            |&sid| self.stream(sid).published_at,
        )
    }

    /// A fresh date tree with leaf order reversed when `newest_first` is set
    pub fn by_date_inverted(&self, newest_first: bool) -> DateTree<StreamId> {
        self.by_date
            .invert(newest_first, |&sid| self.stream(sid).published_at)
    }

    /// The timestamp extractor for this catalog's stream references
    ///
    /// Handy for `prune`/`invert` calls on trees derived from `by_date`.
    pub fn published_at(&self, sid: StreamId) -> DateTime<Utc> {
        self.stream(sid).published_at
    }

    /// Summary counters for logging and the CLI
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            streams: self.streams.len(),
            clips: self.clips.len(),
            channels: self.by_channel.len(),
            dropped_links: self.dropped_links,
            date_buckets: self.by_date.bucket_count(),
        }
    }
}

/// Catalog summary counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    /// Total stream records
    pub streams: usize,
    /// Total clip records
    pub clips: usize,
    /// Distinct channels with streams
    pub channels: usize,
    /// Clip source references dropped as dangling
    pub dropped_links: usize,
    /// Top-level buckets in the date tree
    pub date_buckets: usize,
}

impl std::fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} streams across {} channels, {} clips ({} dangling links dropped), {} top-level date buckets",
            self.streams, self.channels, self.clips, self.dropped_links, self.date_buckets
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawClip, RawStream};

    fn raw_stream(id: &str, channel: &str, published_at: &str) -> RawStream {
        RawStream {
            id: id.to_string(),
            channel: channel.to_string(),
            published_at: published_at.to_string(),
            title: format!("title of {}", id),
        }
    }

    fn raw_clip(id: &str, sources: &[&str]) -> RawClip {
        RawClip {
            id: id.to_string(),
            title: format!("clip {}", id),
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn snapshot(streams: Vec<RawStream>, clips: Vec<RawClip>) -> RawSnapshot {
        RawSnapshot {
            channels: HashMap::new(),
            streams,
            clips,
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let catalog = Catalog::build(snapshot(Vec::new(), Vec::new())).unwrap();

        assert_eq!(catalog.in_order().count(), 0);
        assert_eq!(catalog.by_date().total_entries(), 0);
        assert_eq!(catalog.stats().streams, 0);
    }

    #[test]
    fn test_in_order_preserves_input_order() {
        let catalog = Catalog::build(snapshot(
            vec![
                raw_stream("s1", "chA", "2021-01-01T00:00:00Z"),
                raw_stream("s2", "chB", "2021-01-02T00:00:00Z"),
                raw_stream("s3", "chA", "2021-01-03T00:00:00Z"),
            ],
            Vec::new(),
        ))
        .unwrap();

        let ids: Vec<&str> = catalog.in_order().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn test_link_resolution_is_bidirectional() {
        let catalog = Catalog::build(snapshot(
            vec![
                raw_stream("s1", "chA", "2021-01-01T00:00:00Z"),
                raw_stream("s2", "chA", "2021-01-02T00:00:00Z"),
            ],
            vec![raw_clip("c1", &["s1", "s2", "missing"])],
        ))
        .unwrap();

        let c1 = catalog.clip_by_id("c1").unwrap();
        assert_eq!(c1.sources.len(), 2);

        let s1 = catalog.stream_by_id("s1").unwrap();
        let s2 = catalog.stream_by_id("s2").unwrap();
        assert_eq!(s1.clips.len(), 1);
        assert_eq!(s2.clips.len(), 1);
        assert_eq!(catalog.clip(s1.clips[0]).id, "c1");

        // The dangling reference was dropped, not fatal
        assert_eq!(catalog.stats().dropped_links, 1);
    }

    #[test]
    fn test_stream_clips_follow_clip_processing_order() {
        let catalog = Catalog::build(snapshot(
            vec![raw_stream("s1", "chA", "2021-01-01T00:00:00Z")],
            vec![
                raw_clip("c1", &["s1"]),
                raw_clip("c2", &["s1"]),
                raw_clip("c3", &["s1"]),
            ],
        ))
        .unwrap();

        let s1 = catalog.stream_by_id("s1").unwrap();
        let clip_ids: Vec<&str> = s1
            .clips
            .iter()
            .map(|&cid| catalog.clip(cid).id.as_str())
            .collect();
        assert_eq!(clip_ids, vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn test_duplicate_stream_id_last_write_wins() {
        let catalog = Catalog::build(snapshot(
            vec![
                raw_stream("dup", "chA", "2021-01-01T00:00:00Z"),
                raw_stream("dup", "chB", "2021-01-02T00:00:00Z"),
            ],
            vec![raw_clip("c1", &["dup"])],
        ))
        .unwrap();

        // by_id resolves to the later record; both stay in in_order
        assert_eq!(catalog.stream_by_id("dup").unwrap().channel, "chB");
        assert_eq!(catalog.in_order().count(), 2);

        // Links resolve through by_id, so they land on the later record
        let dup = catalog.stream_by_id("dup").unwrap();
        assert_eq!(dup.clips.len(), 1);
    }

    #[test]
    fn test_by_channel_grouping_order() {
        let catalog = Catalog::build(snapshot(
            vec![
                raw_stream("a", "catX", "2021-01-01T00:00:00Z"),
                raw_stream("b", "catY", "2021-01-02T00:00:00Z"),
                raw_stream("c", "catX", "2021-01-03T00:00:00Z"),
            ],
            Vec::new(),
        ))
        .unwrap();

        let x: Vec<&str> = catalog
            .by_channel("catX")
            .iter()
            .map(|&sid| catalog.stream(sid).id.as_str())
            .collect();
        assert_eq!(x, vec!["a", "c"]);

        assert!(catalog.by_channel("catZ").is_empty());
    }

    #[test]
    fn test_by_date_covers_in_order() {
        let catalog = Catalog::build(snapshot(
            vec![
                raw_stream("s1", "chA", "2020-12-30T08:00:00Z"),
                raw_stream("s2", "chA", "2021-01-02T10:00:00Z"),
                raw_stream("s3", "chB", "2021-01-02T12:00:00Z"),
            ],
            Vec::new(),
        ))
        .unwrap();

        let tree = catalog.by_date();
        assert_eq!(tree.total_entries(), 3);
        assert_eq!(tree.bucket_count(), 2); // 2020, 2021

        let flattened: Vec<&str> = tree
            .flatten()
            .into_iter()
            .map(|sid| catalog.stream(sid).id.as_str())
            .collect();
        assert_eq!(flattened, vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn test_by_date_for_channel_prunes() {
        let catalog = Catalog::build(snapshot(
            vec![
                raw_stream("s1", "chA", "2021-01-01T00:00:00Z"),
                raw_stream("s2", "chB", "2021-01-02T00:00:00Z"),
                raw_stream("s3", "chA", "2021-02-03T00:00:00Z"),
            ],
            Vec::new(),
        ))
        .unwrap();

        let pruned = catalog.by_date_for_channel("chA");
        assert_eq!(pruned.total_entries(), 2);
        assert!(pruned
            .flatten()
            .iter()
            .all(|&sid| catalog.stream(sid).channel == "chA"));

        // The original tree is untouched
        assert_eq!(catalog.by_date().total_entries(), 3);
    }

    #[test]
    fn test_by_date_inverted() {
        let catalog = Catalog::build(snapshot(
            vec![
                raw_stream("s1", "chA", "2021-01-01T00:00:00Z"),
                raw_stream("s2", "chA", "2021-01-02T00:00:00Z"),
            ],
            Vec::new(),
        ))
        .unwrap();

        let newest_first: Vec<&str> = catalog
            .by_date_inverted(true)
            .flatten()
            .into_iter()
            .map(|sid| catalog.stream(sid).id.as_str())
            .collect();
        assert_eq!(newest_first, vec!["s2", "s1"]);

        let unchanged = catalog.by_date_inverted(false);
        assert_eq!(unchanged.flatten(), catalog.by_date().flatten());
    }

    #[test]
    fn test_malformed_timestamp_fails_whole_build() {
        let result = Catalog::build(snapshot(
            vec![
                raw_stream("s1", "chA", "2021-01-01T00:00:00Z"),
                raw_stream("s2", "chA", "yesterday-ish"),
            ],
            Vec::new(),
        ));

        assert!(matches!(
            result,
            Err(BuildError::MalformedTimestamp { ref id, .. }) if id == "s2"
        ));
    }

    #[test]
    fn test_empty_granularities_fail_fast() {
        let result = Catalog::build_with_granularities(snapshot(Vec::new(), Vec::new()), &[]);
        assert!(matches!(result, Err(BuildError::Tree(_))));
    }

    #[test]
    fn test_from_json_end_to_end() {
        let json = r#"{
            "channels": { "chA": { "id": "UC1", "name": "Alpha" } },
            "streams": [
                { "id": "s1", "channel": "chA", "published_at": "2021-03-04T10:00:00Z", "title": "First" },
                { "id": "s2", "channel": "chA", "published_at": "2021-03-05", "title": "Second" }
            ],
            "clips": [
                { "id": "c1", "title": "Best of", "sources": ["s2", "ghost"] }
            ]
        }"#;

        let catalog = Catalog::from_json(json).unwrap();
        let stats = catalog.stats();
        assert_eq!(stats.streams, 2);
        assert_eq!(stats.clips, 1);
        assert_eq!(stats.dropped_links, 1);
        assert_eq!(catalog.channels()["chA"].name, "Alpha");
        assert_eq!(
            catalog.stream_by_id("s2").unwrap().clips,
            vec![ClipId(0)]
        );
    }

    #[test]
    fn test_stats_display() {
        let catalog = Catalog::build(snapshot(
            vec![raw_stream("s1", "chA", "2021-01-01T00:00:00Z")],
            Vec::new(),
        ))
        .unwrap();

        let text = catalog.stats().to_string();
        assert!(text.contains("1 streams"));
        assert!(text.contains("1 channels"));
    }
}
