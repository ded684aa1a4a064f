use std::sync::Arc;

use ampstore::{BoundedStore, Entries, Entry, ManualClock, DEFAULT_CAPACITY};
use serde_json::json;

fn store(capacity: usize) -> (BoundedStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    (BoundedStore::empty(Some(capacity), clock.clone()), clock)
}

// --------------------------------------------------------------------
// Basic operations
//

#[test]
fn test_default_capacity() {
    let store = BoundedStore::empty(None, Arc::new(ManualClock::new(0)));
    assert_eq!(store.capacity(), DEFAULT_CAPACITY);
    assert_eq!(store.capacity(), 8);
    assert!(store.is_empty());
}

#[test]
fn test_set_get_remove() {
    let (mut store, _clock) = store(4);
    store.set("a", json!({"nested": [1, 2]}));
    assert_eq!(store.get("a"), Some(&json!({"nested": [1, 2]})));

    assert_eq!(store.remove("a"), Some(json!({"nested": [1, 2]})));
    assert_eq!(store.get("a"), None);

    // Removing again is a no-op
    assert_eq!(store.remove("a"), None);
    assert!(store.is_empty());
}

#[test]
fn test_timestamps_come_from_clock() {
    let (mut store, clock) = store(4);
    clock.set(42);
    store.set("a", json!(true));
    assert_eq!(store.entries().get("a").map(|e| e.timestamp), Some(42));
}

// --------------------------------------------------------------------
// Capacity and eviction
//

#[test]
fn test_never_exceeds_capacity() {
    for capacity in 1..6 {
        let (mut store, clock) = store(capacity);
        for i in 0..20 {
            store.set(&format!("k{}", i % 9), json!(i));
            clock.advance(i % 3);
            assert!(store.len() <= capacity);
        }
    }
}

#[test]
fn test_evicts_minimum_timestamp() {
    let (mut store, clock) = store(3);
    clock.set(10);
    store.set("a", json!(1));
    clock.set(5);
    store.set("b", json!(2));
    clock.set(20);
    store.set("c", json!(3));

    clock.set(30);
    store.set("d", json!(4));

    assert_eq!(store.get("b"), None);
    assert!(store.get("a").is_some());
    assert!(store.get("c").is_some());
    assert!(store.get("d").is_some());
}

#[test]
fn test_timestamp_tie_evicts_earliest_inserted() {
    let (mut store, _clock) = store(3);
    store.set("first", json!(1));
    store.set("second", json!(2));
    store.set("third", json!(3));

    store.set("fourth", json!(4));
    assert_eq!(store.get("first"), None);

    store.set("fifth", json!(5));
    assert_eq!(store.get("second"), None);
    assert_eq!(store.len(), 3);
}

#[test]
fn test_update_at_capacity_does_not_evict() {
    let (mut store, clock) = store(2);
    store.set("a", json!(1));
    clock.advance(1);
    store.set("b", json!(2));
    clock.advance(1);
    store.set("a", json!(10));

    assert_eq!(store.len(), 2);
    assert_eq!(store.get("a"), Some(&json!(10)));
    assert_eq!(store.get("b"), Some(&json!(2)));
}

#[test]
fn test_refresh_protects_from_eviction() {
    // capacity 2; k1@1, k2@2, k1 rewritten @3, k3 @3 evicts k2
    let (mut store, clock) = store(2);
    clock.set(1);
    store.set("k1", json!(1));
    clock.set(2);
    store.set("k2", json!(2));
    clock.set(3);
    store.set("k1", json!(4));
    store.set("k3", json!(3));

    assert_eq!(store.get("k2"), None);
    assert_eq!(store.get("k1"), Some(&json!(4)));
    assert_eq!(store.get("k3"), Some(&json!(3)));
}

#[test]
fn test_loaded_entries_take_part_in_eviction() {
    let mut entries = Entries::new();
    entries.insert(
        "old".to_string(),
        Entry {
            value: json!("x"),
            timestamp: 100,
        },
    );
    entries.insert(
        "older".to_string(),
        Entry {
            value: json!("y"),
            timestamp: 50,
        },
    );
    let clock = Arc::new(ManualClock::new(200));
    let mut store = BoundedStore::new(entries, Some(2), clock);

    store.set("new", json!("z"));
    assert_eq!(store.get("older"), None);
    assert_eq!(store.get("old"), Some(&json!("x")));
}
