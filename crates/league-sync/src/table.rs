//! The materialized contents of one record family.

use std::collections::BTreeMap;

/// Id to record map for one family, remembering the order the store
/// listed the records in so unsorted views stay deterministic.
#[derive(Debug, Clone)]
pub struct FamilyTable<K, T> {
    by_id: BTreeMap<K, T>,
    order: Vec<K>,
}

impl<K, T> Default for FamilyTable<K, T> {
    fn default() -> Self {
        Self {
            by_id: BTreeMap::new(),
            order: Vec::new(),
        }
    }
}

impl<K: Ord + Copy, T: Clone> FamilyTable<K, T> {
    /// Replace the whole table with a fresh listing.
    pub fn replace(&mut self, records: Vec<T>, key: impl Fn(&T) -> K) {
        self.order = records.iter().map(&key).collect();
        self.by_id = records.into_iter().map(|r| (key(&r), r)).collect();
    }

    /// Look a record up by id.
    pub fn get(&self, id: &K) -> Option<&T> {
        self.by_id.get(id)
    }

    /// Number of records in the table.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Records in listing order.
    pub fn ordered(&self) -> Vec<T> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .cloned()
            .collect()
    }
}
