//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check store, persistence and badge-cache properties.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{
    load_cache, save_cache, shared, BadgeImage, BadgeKey, BadgeStore, CacheEntry, CacheStore,
    CacheValue, Ttl,
};

// == Test Configuration ==
const TEST_DEFAULT_TTL: Option<Duration> = Some(Duration::from_secs(300));

// == Strategies ==
/// Generates cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,64}".prop_map(|s| s)
}

/// Generates string values
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,256}".prop_map(|s| s)
}

/// Generates badge image bytes
fn svg_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..512)
}

fn ttl_strategy() -> impl Strategy<Value = Ttl> {
    prop_oneof![
        Just(Ttl::Default),
        Just(Ttl::Never),
        (1u64..86_400).prop_map(|secs| Ttl::After(Duration::from_secs(secs))),
    ]
}

/// A sequence of cache operations
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Statistics reflect the reads that actually happened
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new(TEST_DEFAULT_TTL);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value, Ttl::Default),
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "Total entries mismatch");
    }

    // Get immediately after Set returns the stored value, whatever the TTL
    #[test]
    fn prop_set_then_get(key in key_strategy(), value in value_strategy(), ttl in ttl_strategy()) {
        let mut store = CacheStore::new(TEST_DEFAULT_TTL);

        store.set(key.clone(), value.clone(), ttl);

        prop_assert_eq!(store.get(&key), Some(value));
    }

    // The last write for a key wins
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let mut store = CacheStore::new(TEST_DEFAULT_TTL);

        store.set(key.clone(), value1, Ttl::Default);
        store.set(key.clone(), value2.clone(), Ttl::Default);

        prop_assert_eq!(store.get(&key), Some(value2));
        prop_assert_eq!(store.len(), 1);
    }

    // Delete makes a key absent
    #[test]
    fn prop_delete_removes_entry(key in key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::new(TEST_DEFAULT_TTL);

        store.set(key.clone(), value, Ttl::Never);
        prop_assert!(store.delete(&key));
        prop_assert!(store.get(&key).is_none());
    }

    // Never-expiring entries survive any number of sweeps
    #[test]
    fn prop_never_expiring_survives_sweeps(
        entries in prop::collection::hash_map(key_strategy(), value_strategy(), 1..20),
        sweeps in 1usize..10
    ) {
        let mut store = CacheStore::new(Some(Duration::ZERO));
        for (key, value) in &entries {
            store.set(key.clone(), value.clone(), Ttl::Never);
        }

        for _ in 0..sweeps {
            prop_assert_eq!(store.cleanup_expired(), 0);
        }
        for (key, value) in &entries {
            prop_assert_eq!(store.get(key), Some(value.clone()));
        }
    }

    // Saving then loading reproduces the same keys, values and expiries
    #[test]
    fn prop_persistence_round_trip(
        badges in prop::collection::hash_map(key_strategy(), (svg_strategy(), ttl_strategy()), 0..20)
    ) {
        let mut store = CacheStore::new(TEST_DEFAULT_TTL);
        for (key, (svg, ttl)) in badges {
            store.set(key, CacheValue::Badge(BadgeImage { svg }), ttl);
        }
        let items = store.items();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        save_cache(&items, &path).unwrap();
        let loaded: HashMap<String, CacheEntry<CacheValue>> = load_cache(&path).unwrap();

        prop_assert_eq!(&loaded, &items);

        let mut restored = CacheStore::from_items(TEST_DEFAULT_TTL, loaded);
        for (key, entry) in items {
            prop_assert_eq!(restored.get(&key), Some(entry.value));
        }
    }

    // A cached badge is returned byte-identical without calling the renderer again
    #[test]
    fn prop_cached_badge_is_idempotent(track_id in key_strategy(), svg in svg_strategy()) {
        let badges = BadgeStore::new(shared(CacheStore::new(TEST_DEFAULT_TTL)), Ttl::Never);
        let key = BadgeKey::Track(track_id);
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let expected = &svg;

        let (first, second) = tokio_test::block_on(async {
            let first = badges
                .get_or_render(&key, || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(expected.clone())
                })
                .await
                .unwrap();
            let second = badges
                .get_or_render(&key, || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Vec::new())
                })
                .await
                .unwrap();
            (first, second)
        });

        prop_assert_eq!(&first, &svg);
        prop_assert_eq!(first, second);
        prop_assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // Once the TTL has elapsed the entry reads as absent, before any sweep
    #[test]
    fn prop_ttl_expiration_behavior(key in key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::new(TEST_DEFAULT_TTL);

        store.set(key.clone(), value.clone(), Ttl::After(Duration::from_millis(50)));
        prop_assert_eq!(store.get(&key), Some(value));

        sleep(Duration::from_millis(80));

        prop_assert!(store.get(&key).is_none(), "Entry should not be found after TTL expires");
    }
}
