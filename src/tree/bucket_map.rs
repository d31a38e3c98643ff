//! Ordered bucket map
//!
//! A map from normalized bucket key to an arbitrary payload that remembers
//! the order in which distinct keys were first inserted. Addressing uses a
//! `HashMap`; iteration walks the separate first-insertion list, so the two
//! concerns never interfere.
//!
//! Constructed from time-sorted entries, first-insertion order coincides with
//! chronological order of buckets - the tree builder relies on this. Feeding
//! unsorted entries is not an error, but iteration is then plain insertion
//! order; callers own the sorting precondition.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::tree::{BucketKey, Granularity};

/// Map from bucket key to payload, iterated in first-insertion order
#[derive(Debug, Clone)]
pub struct BucketMap<V> {
    granularity: Granularity,
    inner: HashMap<i64, V>,
    order: Vec<BucketKey>,
}

impl<V> BucketMap<V> {
    /// Create an empty map at the given granularity
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            inner: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Build a map from (timestamp, value) pairs
    ///
    /// Entries are expected to be sorted ascending by timestamp; later values
    /// for an already-seen bucket overwrite the earlier ones.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (DateTime<Utc>, V)>,
        granularity: Granularity,
    ) -> Self {
        let mut map = Self::new(granularity);
        for (ts, value) in entries {
            map.put(ts, value);
        }
        map
    }

    /// The granularity this map buckets at
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Insert or overwrite the value for a timestamp's bucket
    ///
    /// A new bucket key is appended to the iteration order; overwriting an
    /// existing bucket leaves the order untouched.
    pub fn put(&mut self, ts: DateTime<Utc>, value: V) {
        let key = self.granularity.normalize(ts);
        if self.inner.insert(key.0, value).is_none() {
            self.order.push(key);
        }
    }

    /// Look up the value for a timestamp's bucket
    pub fn get(&self, ts: DateTime<Utc>) -> Option<&V> {
        self.inner.get(&self.granularity.normalize(ts).0)
    }

    /// Mutable lookup for a timestamp's bucket
    pub fn get_mut(&mut self, ts: DateTime<Utc>) -> Option<&mut V> {
        self.inner.get_mut(&self.granularity.normalize(ts).0)
    }

    /// Look up by an already-normalized key
    pub fn get_key(&self, key: BucketKey) -> Option<&V> {
        self.inner.get(&key.0)
    }

    /// Whether the timestamp's bucket exists
    pub fn has(&self, ts: DateTime<Utc>) -> bool {
        self.inner.contains_key(&self.granularity.normalize(ts).0)
    }

    /// Number of distinct buckets
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the map holds no buckets
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Bucket keys in first-insertion order
    pub fn keys(&self) -> impl Iterator<Item = BucketKey> + '_ {
        self.order.iter().copied()
    }

    /// Values in first-insertion order of their keys
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.keys().filter_map(move |key| self.inner.get(&key.0))
    }

    /// (key, value) pairs in first-insertion order
    pub fn entries(&self) -> impl Iterator<Item = (BucketKey, &V)> {
        self.keys()
            .filter_map(move |key| self.inner.get(&key.0).map(|v| (key, v)))
    }

    /// Consume the map, yielding (key, value) pairs in first-insertion order
    pub fn into_entries(self) -> impl Iterator<Item = (BucketKey, V)> {
        let mut inner = self.inner;
        self.order
            .into_iter()
            .filter_map(move |key| inner.remove(&key.0).map(|v| (key, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_put_and_get() {
        let mut map = BucketMap::new(Granularity::Day);
        map.put(ts("2021-03-04T10:00:00Z"), "a");

        // Any timestamp in the same day hits the same bucket
        assert_eq!(map.get(ts("2021-03-04T23:30:00Z")), Some(&"a"));
        assert!(map.has(ts("2021-03-04T00:00:00Z")));
        assert!(!map.has(ts("2021-03-05T00:00:00Z")));
        assert_eq!(map.get(ts("2021-03-05T00:00:00Z")), None);
    }

    #[test]
    fn test_overwrite_keeps_order() {
        let mut map = BucketMap::new(Granularity::Day);
        map.put(ts("2021-03-04T10:00:00Z"), 1);
        map.put(ts("2021-03-05T10:00:00Z"), 2);
        map.put(ts("2021-03-04T12:00:00Z"), 3);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(ts("2021-03-04T00:00:00Z")), Some(&3));

        let days: Vec<u32> = map
            .keys()
            .map(|k| {
                use chrono::Datelike;
                k.as_datetime().day()
            })
            .collect();
        assert_eq!(days, vec![4, 5]);
    }

    #[test]
    fn test_iteration_is_first_insertion_order() {
        // Deliberately unsorted input: insertion order wins, not key order
        let entries = vec![
            (ts("2021-03-10T00:00:00Z"), "mar10"),
            (ts("2021-03-02T00:00:00Z"), "mar02"),
            (ts("2021-03-07T00:00:00Z"), "mar07"),
        ];
        let map = BucketMap::from_entries(entries, Granularity::Day);

        let values: Vec<_> = map.values().copied().collect();
        assert_eq!(values, vec!["mar10", "mar02", "mar07"]);
    }

    #[test]
    fn test_iterators_are_restartable() {
        let entries = vec![
            (ts("2021-03-01T00:00:00Z"), 1),
            (ts("2021-03-02T00:00:00Z"), 2),
        ];
        let map = BucketMap::from_entries(entries, Granularity::Day);

        let first: Vec<_> = map.keys().collect();
        let second: Vec<_> = map.keys().collect();
        assert_eq!(first, second);
        assert_eq!(map.entries().count(), 2);
        assert_eq!(map.entries().count(), 2);
    }

    #[test]
    fn test_into_entries_preserves_order() {
        let entries = vec![
            (ts("2021-02-01T00:00:00Z"), "feb"),
            (ts("2021-01-01T00:00:00Z"), "jan"),
            (ts("2021-03-01T00:00:00Z"), "mar"),
        ];
        let map = BucketMap::from_entries(entries, Granularity::Month);

        let drained: Vec<_> = map.into_entries().map(|(_, v)| v).collect();
        assert_eq!(drained, vec!["feb", "jan", "mar"]);
    }

    #[test]
    fn test_empty_map() {
        let map: BucketMap<()> = BucketMap::new(Granularity::Year);
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.keys().count(), 0);
    }
}
