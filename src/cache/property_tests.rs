//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify the store's bound and accounting invariants
//! under arbitrary operation sequences.

use proptest::prelude::*;

use crate::cache::CacheStore;
use crate::config::CacheConfig;
use std::time::Duration;

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;

fn test_config(max_entries: usize) -> CacheConfig {
    CacheConfig::new()
        .with_max_entries(max_entries)
        .with_default_ttl(Duration::from_secs(300))
}

// == Strategies ==
/// Generates valid cache keys (non-empty, within length limit)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,32}"
}

/// Generates cache values of varying weight
fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,64}"
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), valid_value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of operations, hit/miss counters reflect exactly
    // the read outcomes and the entry gauge matches the resident count.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new(&test_config(TEST_MAX_ENTRIES));
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    let _ = store.set(key, value, None);
                }
                CacheOp::Get { key } => {
                    match store.get(&key) {
                        Ok(_) => expected_hits += 1,
                        Err(_) => expected_misses += 1,
                    }
                }
                CacheOp::Delete { key } => {
                    let _ = store.delete(&key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "Total entries mismatch");
    }

    // Storing a pair and reading it back before expiry returns the exact
    // value that was stored.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in valid_value_strategy()) {
        let mut store = CacheStore::new(&test_config(TEST_MAX_ENTRIES));

        store.set(key.clone(), value.clone(), None).unwrap();

        let retrieved = store.get(&key).unwrap();
        prop_assert_eq!(retrieved, value, "Round-trip value mismatch");
    }

    // After a delete, a read reports the key as absent.
    #[test]
    fn prop_delete_removes_entry(key in valid_key_strategy(), value in valid_value_strategy()) {
        let mut store = CacheStore::new(&test_config(TEST_MAX_ENTRIES));

        store.set(key.clone(), value, None).unwrap();
        prop_assert!(store.has(&key), "Key should exist before delete");

        prop_assert!(store.delete(&key), "Delete should report the key as present");
        prop_assert!(store.get(&key).is_err(), "Key should not exist after delete");
    }

    // The entry count never exceeds the configured bound, and the
    // survivors are exactly the most recently inserted keys.
    #[test]
    fn prop_count_bound_holds(keys in prop::collection::vec(valid_key_strategy(), 1..40), max in 1usize..8) {
        let mut store = CacheStore::new(&test_config(max));

        let mut inserted = Vec::new();
        for key in keys {
            store.set(key.clone(), 1u32, None).unwrap();
            inserted.retain(|k| k != &key);
            inserted.push(key);
            prop_assert!(store.len() <= max, "Count bound violated");
        }

        // The last min(max, distinct) insertions are resident
        let survivors: Vec<&String> = inserted.iter().rev().take(max).collect();
        for key in survivors {
            prop_assert!(store.has(key), "Recently inserted key missing");
        }
    }

    // With a weigher configured, the cumulative weight never exceeds the
    // byte bound for values that individually fit.
    #[test]
    fn prop_byte_bound_holds(values in prop::collection::vec((valid_key_strategy(), "[a-z]{1,16}"), 1..30)) {
        let max_bytes = 32usize;
        let config = CacheConfig::new()
            .with_max_entries(TEST_MAX_ENTRIES)
            .with_max_bytes(max_bytes)
            .with_default_ttl(Duration::from_secs(300));
        let mut store = CacheStore::with_weigher(&config, |value: &String| value.len());

        for (key, value) in values {
            store.set(key, value, None).unwrap();
            let stats = store.stats();
            prop_assert!(stats.total_bytes <= max_bytes, "Byte bound violated");
            prop_assert_eq!(stats.total_entries, store.len());
        }
    }
}
