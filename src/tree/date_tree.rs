//! Hierarchical bucket tree
//!
//! Recursively partitions a time-sorted sequence of (timestamp, value) pairs
//! into one [`BucketMap`] per granularity level. With granularities
//! `[year, month, day]` the tree is three levels deep: year buckets hold
//! month subtrees, month buckets hold day subtrees, and day buckets hold the
//! terminal value lists.
//!
//! A node is either a branch (more granularities remain) or a leaf level - a
//! runtime tag checked via [`DateTree::is_bottom`], not a type-level shape.
//! Trees are immutable once built; `flatten`, `prune` and `invert` derive
//! brand-new trees and never touch the source.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::tree::{BucketKey, BucketMap, Granularity};

/// Errors from tree construction
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// At least one granularity level is required
    #[error("granularity sequence must not be empty")]
    EmptyGranularities,
}

/// A bucket's contents at one tree level
#[derive(Debug)]
pub enum TreeChild<'a, V> {
    /// A deeper subtree (this level is not the bottom)
    Branch(&'a DateTree<V>),
    /// Terminal values at the finest granularity
    Leaves(&'a [V]),
}

#[derive(Debug, Clone)]
enum Node<V> {
    Branch(BucketMap<DateTree<V>>),
    Leaf(BucketMap<Vec<V>>),
}

/// Time-bucketed tree over (timestamp, value) pairs
///
/// Construction expects entries sorted ascending by timestamp; bucket
/// iteration order is first-insertion order, which for sorted input is
/// chronological. Relative order of entries inside a bucket always equals
/// input order.
#[derive(Debug, Clone)]
pub struct DateTree<V> {
    /// Granularities from this level down; never empty
    granularities: Vec<Granularity>,
    node: Node<V>,
    total: usize,
}

impl<V> DateTree<V> {
    /// Build a tree from time-sorted entries and a granularity sequence
    ///
    /// Fails fast with [`TreeError::EmptyGranularities`] if no granularity is
    /// supplied. An empty entry sequence yields a tree with empty maps at
    /// every level.
    pub fn new(
        entries: Vec<(DateTime<Utc>, V)>,
        granularities: &[Granularity],
    ) -> Result<Self, TreeError> {
        if granularities.is_empty() {
            return Err(TreeError::EmptyGranularities);
        }
        Ok(Self::from_parts(entries, granularities))
    }

    /// Construction core; callers guarantee a non-empty granularity list
    fn from_parts(entries: Vec<(DateTime<Utc>, V)>, granularities: &[Granularity]) -> Self {
        let granularity = granularities[0];
        let rest = &granularities[1..];
        let total = entries.len();

        // Partition at this level's granularity. The map would lose the
        // original timestamps, so each bucket keeps its (timestamp, value)
        // pairs intact for deeper levels to re-normalize.
        let mut partitions: BucketMap<Vec<(DateTime<Utc>, V)>> = BucketMap::new(granularity);
        for (ts, value) in entries {
            match partitions.get_mut(ts) {
                Some(bucket) => bucket.push((ts, value)),
                None => partitions.put(ts, vec![(ts, value)]),
            }
        }

        let node = if rest.is_empty() {
            // Bottom level: timestamps are discarded, order preserved
            let mut leaves = BucketMap::new(granularity);
            for (key, bucket) in partitions.into_entries() {
                leaves.put(
                    key.as_datetime(),
                    bucket.into_iter().map(|(_, v)| v).collect(),
                );
            }
            Node::Leaf(leaves)
        } else {
            let mut children = BucketMap::new(granularity);
            for (key, bucket) in partitions.into_entries() {
                children.put(key.as_datetime(), DateTree::from_parts(bucket, rest));
            }
            Node::Branch(children)
        };

        Self {
            granularities: granularities.to_vec(),
            node,
            total,
        }
    }

    /// Look up the bucket for a timestamp at this level's granularity
    pub fn get(&self, ts: DateTime<Utc>) -> Option<TreeChild<'_, V>> {
        match &self.node {
            Node::Branch(map) => map.get(ts).map(TreeChild::Branch),
            Node::Leaf(map) => map.get(ts).map(|values| TreeChild::Leaves(values.as_slice())),
        }
    }

    /// Bucket keys at this level, in chronological (first-insertion) order
    pub fn keys(&self) -> Vec<BucketKey> {
        match &self.node {
            Node::Branch(map) => map.keys().collect(),
            Node::Leaf(map) => map.keys().collect(),
        }
    }

    /// Bucket contents at this level
    pub fn values(&self) -> Vec<TreeChild<'_, V>> {
        self.entries().into_iter().map(|(_, child)| child).collect()
    }

    /// (key, contents) pairs at this level
    pub fn entries(&self) -> Vec<(BucketKey, TreeChild<'_, V>)> {
        match &self.node {
            Node::Branch(map) => map
                .entries()
                .map(|(key, subtree)| (key, TreeChild::Branch(subtree)))
                .collect(),
            Node::Leaf(map) => map
                .entries()
                .map(|(key, values)| (key, TreeChild::Leaves(values.as_slice())))
                .collect(),
        }
    }

    /// True iff this level's buckets hold terminal value lists
    pub fn is_bottom(&self) -> bool {
        matches!(self.node, Node::Leaf(_))
    }

    /// The granularity this level buckets at
    pub fn granularity(&self) -> Granularity {
        self.granularities[0]
    }

    /// Granularities from this level down
    pub fn granularities(&self) -> &[Granularity] {
        &self.granularities
    }

    /// Count of all leaf values reachable from this node (cached)
    pub fn total_entries(&self) -> usize {
        self.total
    }

    /// Number of buckets at this level
    pub fn bucket_count(&self) -> usize {
        match &self.node {
            Node::Branch(map) => map.len(),
            Node::Leaf(map) => map.len(),
        }
    }
}

impl<V: Clone> DateTree<V> {
    /// All leaf values in bucket-iteration order, recomputed per call
    pub fn flatten(&self) -> Vec<V> {
        match &self.node {
            Node::Leaf(map) => map.values().flatten().cloned().collect(),
            Node::Branch(map) => map.values().flat_map(|subtree| subtree.flatten()).collect(),
        }
    }

    /// Rebuild a fresh tree from the leaf values that satisfy `keep`
    ///
    /// The new tree uses the same granularity sequence; the source tree is
    /// untouched. `date_of` recovers each value's timestamp for re-bucketing.
    pub fn prune<P, D>(&self, mut keep: P, mut date_of: D) -> Self
    where
        P: FnMut(&V) -> bool,
        D: FnMut(&V) -> DateTime<Utc>,
    {
        let entries: Vec<_> = self
            .flatten()
            .into_iter()
            .filter(|value| keep(value))
            .map(|value| (date_of(&value), value))
            .collect();
        Self::from_parts(entries, &self.granularities)
    }

    /// Rebuild with leaf order reversed when `newest_first` is set
    ///
    /// With the flag unset this is the identity (a clone of the tree).
    pub fn invert<D>(&self, newest_first: bool, mut date_of: D) -> Self
    where
        D: FnMut(&V) -> DateTime<Utc>,
    {
        if !newest_first {
            return self.clone();
        }

        let mut values = self.flatten();
        values.reverse();
        let entries: Vec<_> = values
            .into_iter()
            .map(|value| (date_of(&value), value))
            .collect();
        Self::from_parts(entries, &self.granularities)
    }
}
