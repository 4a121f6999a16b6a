use std::collections::btree_map::{self, BTreeMap};

use crate::stats::Statistic;
use crate::table::AggTable;

/// Final per-key statistics, ordered by key bytes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    keys: BTreeMap<Box<[u8]>, Statistic>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one partial statistic for `key`.
    pub fn absorb(&mut self, key: Box<[u8]>, stat: Statistic) {
        self.keys
            .entry(key)
            .and_modify(|existing| existing.merge(&stat))
            .or_insert(stat);
    }

    #[cfg(test)]
    pub(crate) fn observe(&mut self, key: &[u8], value: i64) {
        match self.keys.get_mut(key) {
            Some(stat) => stat.observe(value),
            None => {
                self.keys.insert(key.into(), Statistic::new(value));
            }
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&Statistic> {
        self.keys.get(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Box<[u8]>, Statistic> {
        self.keys.iter()
    }
}

/// Folds every worker table into one summary.
///
/// The fold only uses min, max and addition, so the result does not depend
/// on how records were spread over chunks or workers.
pub fn merge<I>(tables: I) -> Summary
where
    I: IntoIterator<Item = AggTable>,
{
    let mut summary = Summary::new();
    for table in tables {
        for (key, stat) in table.into_entries() {
            summary.absorb(key, stat);
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::fnv1a;

    fn table_of(records: &[(&str, i64)]) -> AggTable {
        let mut table = AggTable::with_capacity(8);
        for (key, value) in records {
            table.record(fnv1a(key.as_bytes()), key.as_bytes(), *value);
        }
        table
    }

    #[test]
    fn combines_equal_keys() {
        let left = table_of(&[("Hamburg", 120), ("Berlin", 52)]);
        let right = table_of(&[("Hamburg", -35)]);
        let summary = merge([left, right]);

        assert_eq!(summary.len(), 2);
        let hamburg = summary.get(b"Hamburg").unwrap();
        assert_eq!((hamburg.min, hamburg.max, hamburg.total, hamburg.count), (-35, 120, 85, 2));
    }

    #[test]
    fn order_of_tables_does_not_matter() {
        let records = [("a", 10), ("b", -20), ("a", 35), ("c", 0), ("b", 999)];
        let forward = merge([table_of(&records[..2]), table_of(&records[2..])]);
        let backward = merge([table_of(&records[2..]), table_of(&records[..2])]);
        let split = merge(records.iter().map(|record| table_of(&[*record])));

        assert_eq!(forward, backward);
        assert_eq!(forward, split);
    }

    #[test]
    fn keys_iterate_in_byte_order() {
        let summary = merge([table_of(&[("b", 1), ("B", 1), ("a", 1), ("ab", 1)])]);
        let keys: Vec<_> = summary.iter().map(|(key, _)| key.to_vec()).collect();
        assert_eq!(
            keys,
            vec![b"B".to_vec(), b"a".to_vec(), b"ab".to_vec(), b"b".to_vec()]
        );
    }

    #[test]
    fn observe_matches_absorb() {
        let mut observed = Summary::new();
        observed.observe(b"x", 5);
        observed.observe(b"x", -5);

        let mut absorbed = Summary::new();
        absorbed.absorb(b"x".to_vec().into_boxed_slice(), Statistic::new(-5));
        absorbed.absorb(b"x".to_vec().into_boxed_slice(), Statistic::new(5));

        assert_eq!(observed, absorbed);
    }
}
