//! Fixed-bucket hash table from key bytes to [`Statistic`].
//!
//! The bucket array never grows. Entries live in an append-only vector and
//! buckets hold `(hash, position)` pairs into it, so a long chain only costs
//! extra comparisons and never moves a statistic.

use crate::stats::Statistic;

struct Entry {
    key: Box<[u8]>,
    stat: Statistic,
}

/// Result of [`AggTable::lookup_or_insert`].
pub enum Lookup<'a> {
    /// First sighting; the statistic already holds the inserted value.
    Inserted(&'a mut Statistic),
    Found(&'a mut Statistic),
}

pub struct AggTable {
    buckets: Vec<Vec<(u64, u32)>>,
    entries: Vec<Entry>,
    mask: u64,
}

impl AggTable {
    /// `capacity` is the bucket count and must be a power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity.is_power_of_two(),
            "table capacity {capacity} is not a power of two"
        );
        Self {
            buckets: (0..capacity).map(|_| Vec::new()).collect(),
            entries: Vec::with_capacity(capacity),
            mask: capacity as u64 - 1,
        }
    }

    /// Finds the entry for `key`, or inserts `{min=max=total=value, count=1}`.
    ///
    /// `hash` must be [`crate::hash::fnv1a`] of `key`. The key is copied on
    /// insert, so the caller's buffer may be reused afterwards.
    #[inline]
    pub fn lookup_or_insert(&mut self, hash: u64, key: &[u8], value: i64) -> Lookup<'_> {
        let bucket = &mut self.buckets[(hash & self.mask) as usize];

        for &(stored_hash, position) in bucket.iter() {
            if stored_hash == hash && *self.entries[position as usize].key == *key {
                return Lookup::Found(&mut self.entries[position as usize].stat);
            }
        }

        let position = self.entries.len();
        bucket.push((hash, position as u32));
        self.entries.push(Entry {
            key: key.into(),
            stat: Statistic::new(value),
        });
        Lookup::Inserted(&mut self.entries[position].stat)
    }

    /// Folds one sample for `key`.
    #[inline]
    pub fn record(&mut self, hash: u64, key: &[u8], value: i64) {
        if let Lookup::Found(stat) = self.lookup_or_insert(hash, key, value) {
            stat.observe(value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// More distinct keys than buckets; lookups start degrading.
    pub fn is_over_capacity(&self) -> bool {
        self.entries.len() > self.buckets.len()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Statistic)> {
        self.entries.iter().map(|entry| (&*entry.key, &entry.stat))
    }

    pub fn into_entries(self) -> impl Iterator<Item = (Box<[u8]>, Statistic)> {
        self.entries.into_iter().map(|entry| (entry.key, entry.stat))
    }
}
