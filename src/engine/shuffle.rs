//! Keyed shuffle between pipeline stages.
//!
//! Collects every record under its driver key before a reduction runs. Keys
//! are kept ordered so reductions, and the report built from them, see
//! drivers in the same order on every run.

use std::collections::BTreeMap;
use std::collections::btree_map;

/// Records grouped by driver ID.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedShuffle<V> {
    groups: BTreeMap<String, Vec<V>>,
}

impl<V> Default for KeyedShuffle<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyedShuffle<V> {
    pub fn new() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }

    /// Append a record under `key`.
    pub fn push(&mut self, key: impl Into<String>, value: V) {
        self.groups.entry(key.into()).or_default().push(value);
    }

    /// Records for one key, in arrival order.
    pub fn get(&self, key: &str) -> Option<&[V]> {
        self.groups.get(key).map(|v| v.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.groups.keys()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total records across all keys.
    pub fn record_count(&self) -> usize {
        self.groups.values().map(|v| v.len()).sum()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<V>> {
        self.groups.iter()
    }

    /// Merge another shuffle into this one, appending per key.
    pub fn merge(&mut self, other: KeyedShuffle<V>) {
        for (key, mut values) in other.groups {
            self.groups.entry(key).or_default().append(&mut values);
        }
    }

    /// Hand the groups over to a reduction, keys ascending.
    pub fn into_groups(self) -> Vec<(String, Vec<V>)> {
        self.groups.into_iter().collect()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for KeyedShuffle<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut shuffle = KeyedShuffle::new();
        for (key, value) in iter {
            shuffle.push(key, value);
        }
        shuffle
    }
}

impl<V> IntoIterator for KeyedShuffle<V> {
    type Item = (String, Vec<V>);
    type IntoIter = btree_map::IntoIter<String, Vec<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}
