//! Size-bounded key/value map
//!
//! Holds at most `capacity` entries. Inserting a new key into a full store
//! evicts the entry with the smallest timestamp; among entries sharing that
//! timestamp the earliest inserted one goes first.

use std::fmt;
use std::sync::Arc;

use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::Clock;

/// Capacity used when no override is given
pub const DEFAULT_CAPACITY: usize = 8;

/// Entries keyed by name, in insertion order
pub type Entries = LinkedHashMap<String, Entry>;

/// A stored value with the time it was last written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "v")]
    pub value: Value,
    #[serde(rename = "t")]
    pub timestamp: u64,
}

pub struct BoundedStore {
    entries: Entries,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl BoundedStore {
    /// Build a store from previously persisted entries
    ///
    /// A capacity of zero is raised to one. If `entries` already exceeds the
    /// capacity, the oldest entries are dropped until it fits.
    #[must_use]
    pub fn new(entries: Entries, capacity: Option<usize>, clock: Arc<dyn Clock>) -> Self {
        let mut store = Self {
            entries,
            capacity: capacity.unwrap_or(DEFAULT_CAPACITY).max(1),
            clock,
        };
        while store.entries.len() > store.capacity {
            store.evict_oldest();
        }
        store
    }

    #[must_use]
    pub fn empty(capacity: Option<usize>, clock: Arc<dyn Clock>) -> Self {
        Self::new(Entries::new(), capacity, clock)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Insert or overwrite a value
    ///
    /// Overwriting keeps the key's position and never evicts.
    pub fn set(&mut self, key: &str, value: Value) {
        let timestamp = self.clock.now_ms();

        // `LinkedHashMap::insert` would move an existing key to the back
        if let Some(entry) = self.entries.get_mut(key) {
            entry.value = value;
            entry.timestamp = timestamp;
            return;
        }

        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        self.entries.insert(key.to_string(), Entry { value, timestamp });
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over `(key, entry)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Entry)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn entries(&self) -> &Entries {
        &self.entries
    }

    fn evict_oldest(&mut self) {
        // Strict `<` keeps the first-inserted key among equal timestamps
        let mut oldest: Option<(&String, u64)> = None;
        for (key, entry) in &self.entries {
            match oldest {
                Some((_, t)) if entry.timestamp >= t => {}
                _ => oldest = Some((key, entry.timestamp)),
            }
        }
        if let Some(key) = oldest.map(|(key, _)| key.clone()) {
            tracing::debug!(key = %key, "store.evict");
            self.entries.remove(&key);
        }
    }
}

impl fmt::Debug for BoundedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedStore")
            .field("entries", &self.entries)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;

    fn store_with_clock(capacity: usize) -> (BoundedStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let store = BoundedStore::empty(Some(capacity), clock.clone());
        (store, clock)
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let (mut store, clock) = store_with_clock(4);
        store.set("a", json!(1));
        clock.advance(1);
        store.set("b", json!(2));
        clock.advance(1);
        store.set("a", json!(3));

        let keys: Vec<&String> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(store.entries().get("a").map(|e| e.timestamp), Some(2));
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let (mut store, _clock) = store_with_clock(0);
        assert_eq!(store.capacity(), 1);
        store.set("a", json!(1));
        store.set("b", json!(2));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("b"), Some(&json!(2)));
    }

    #[test]
    fn test_oversized_input_is_trimmed_oldest_first() {
        let mut entries = Entries::new();
        for (key, t) in [("x", 5), ("y", 1), ("z", 3)] {
            entries.insert(
                key.to_string(),
                Entry {
                    value: json!(key),
                    timestamp: t,
                },
            );
        }
        let store = BoundedStore::new(entries, Some(2), Arc::new(ManualClock::new(0)));
        assert_eq!(store.len(), 2);
        assert!(store.get("y").is_none());
    }
}
