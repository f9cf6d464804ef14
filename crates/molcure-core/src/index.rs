//! Canonical-key deduplication index
//!
//! Collapses records that share a canonical key into a single entry. The
//! first identifier seen for a key is kept as its representative, so the
//! retained ids depend on input order while the key set does not.

use std::collections::hash_map::{self, Entry, HashMap};

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalKey;

/// Representative and occurrence count for one canonical key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub representative_id: String,
    pub frequency: u64,
}

/// Mapping from canonical key to [`IndexEntry`]. Iteration order is unspecified.
#[derive(Debug, Clone, Default)]
pub struct DeduplicationIndex {
    entries: HashMap<CanonicalKey, IndexEntry>,
    total_frequency: u64,
}

impl DeduplicationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            total_frequency: 0,
        }
    }

    /// Count one occurrence of `key`, returning its frequency afterwards.
    ///
    /// A new key takes `id` as its representative; later occurrences only
    /// increment the frequency.
    pub fn insert(&mut self, key: CanonicalKey, id: &str) -> u64 {
        self.total_frequency += 1;
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.frequency += 1;
                entry.frequency
            }
            Entry::Vacant(vacant) => {
                vacant.insert(IndexEntry {
                    representative_id: id.to_string(),
                    frequency: 1,
                });
                1
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&IndexEntry> {
        self.entries.get(key)
    }

    /// Number of distinct keys
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry frequencies, i.e. the number of inserts
    pub fn total_frequency(&self) -> u64 {
        self.total_frequency
    }

    pub fn entries(&self) -> hash_map::Iter<'_, CanonicalKey, IndexEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> hash_map::IntoIter<CanonicalKey, IndexEntry> {
        self.entries.into_iter()
    }

    pub(crate) fn into_keys(self) -> hash_map::IntoKeys<CanonicalKey, IndexEntry> {
        self.entries.into_keys()
    }
}

impl<'a> IntoIterator for &'a DeduplicationIndex {
    type Item = (&'a CanonicalKey, &'a IndexEntry);
    type IntoIter = hash_map::Iter<'a, CanonicalKey, IndexEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

impl IntoIterator for DeduplicationIndex {
    type Item = (CanonicalKey, IndexEntry);
    type IntoIter = hash_map::IntoIter<CanonicalKey, IndexEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> CanonicalKey {
        CanonicalKey::new(s)
    }

    #[test]
    fn test_first_seen_id_is_kept() {
        let mut index = DeduplicationIndex::new();
        assert_eq!(index.insert(key("CCO"), "id1"), 1);
        assert_eq!(index.insert(key("CCO"), "id2"), 2);
        assert_eq!(index.insert(key("CCN"), "id3"), 1);

        assert_eq!(index.size(), 2);
        let entry = index.get("CCO").unwrap();
        assert_eq!(entry.representative_id, "id1");
        assert_eq!(entry.frequency, 2);
    }

    #[test]
    fn test_contains_after_insert() {
        let mut index = DeduplicationIndex::with_capacity(4);
        assert!(index.is_empty());
        assert!(!index.contains("c1ccccc1"));
        index.insert(key("c1ccccc1"), "benzene");
        assert!(index.contains("c1ccccc1"));
        index.insert(key("Cc1ccccc1"), "toluene");
        assert!(index.contains("c1ccccc1"));
    }

    #[test]
    fn test_total_frequency_matches_entries() {
        let mut index = DeduplicationIndex::new();
        for (k, id) in [("A", "1"), ("B", "2"), ("A", "3"), ("A", "4"), ("C", "5")] {
            index.insert(key(k), id);
        }
        let sum: u64 = index.entries().map(|(_, e)| e.frequency).sum();
        assert_eq!(sum, 5);
        assert_eq!(index.total_frequency(), 5);
    }

    #[test]
    fn test_into_entries_consumes() {
        let mut index = DeduplicationIndex::new();
        index.insert(key("CCO"), "id1");
        index.insert(key("CCN"), "id2");
        let mut keys: Vec<String> = index.into_entries().map(|(k, _)| k.into_string()).collect();
        keys.sort();
        assert_eq!(keys, vec!["CCN", "CCO"]);
    }
}
