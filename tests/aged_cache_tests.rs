//! Integration Tests for the Aged Cache
//!
//! Drives the public API end to end with a manual clock.

use aged_cache::{AgedCache, CacheError, Capacity, ManualClock, SharedCache};
use tracing_subscriber::EnvFilter;

// == Test Helpers ==

/// Installs a log subscriber once; set RUST_LOG=aged_cache=trace to see sweeps.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Creates a cache on a fresh manual clock.
fn create_test_cache<V>(capacity: Capacity) -> (AgedCache<String, V, ManualClock>, ManualClock) {
    init_tracing();
    let clock = ManualClock::new();
    (AgedCache::with_clock(clock.clone(), capacity), clock)
}

fn key(name: &str) -> String {
    name.to_string()
}

// == Expiration and Eviction ==

#[test]
fn test_empty_cache() {
    let (mut cache, _) = create_test_cache::<i32>(Capacity::Unbounded);

    assert!(cache.is_empty());
    assert_eq!(cache.size(), 0);
    assert_eq!(cache.get("x"), None);
}

#[test]
fn test_entry_expires_after_retention() {
    let (mut cache, clock) = create_test_cache(Capacity::Unbounded);

    cache.put(key("a"), 1, 50).unwrap();

    clock.advance_ms(10);
    assert_eq!(cache.get("a"), Some(&1));

    clock.advance_ms(50);
    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.size(), 0);
}

#[test]
fn test_bulk_expiry() {
    let (mut cache, clock) = create_test_cache(Capacity::Unbounded);

    for i in 0..100 {
        cache.put(format!("key{}", i), i, 10).unwrap();
    }
    assert_eq!(cache.size(), 100);

    clock.advance_ms(11);

    assert_eq!(cache.size(), 0);
    assert!(cache.is_empty());
    assert_eq!(cache.stats().expirations, 100);
}

#[test]
fn test_bounded_eviction_order() {
    let (mut cache, _) = create_test_cache(Capacity::Bounded(2));

    cache.put(key("a"), 1, 100).unwrap();
    cache.put(key("b"), 2, 50).unwrap();
    cache.put(key("c"), 3, 200).unwrap();

    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.get("a"), Some(&1));
    assert_eq!(cache.get("c"), Some(&3));
    assert_eq!(cache.size(), 2);
}

// == Duplicate Keys ==

#[test]
fn test_most_recent_wins() {
    let (mut cache, _) = create_test_cache(Capacity::Unbounded);

    cache.put(key("k"), "v1", 1_000).unwrap();
    cache.put(key("k"), "v2", 1_000).unwrap();

    assert_eq!(cache.get("k"), Some(&"v2"));
    // Both physical entries are live
    assert_eq!(cache.size(), 2);
}

#[test]
fn test_older_entry_resurfaces_when_newer_expires() {
    let (mut cache, clock) = create_test_cache(Capacity::Unbounded);

    cache.put(key("k"), "long", 1_000).unwrap();
    cache.put(key("k"), "short", 10).unwrap();
    assert_eq!(cache.get("k"), Some(&"short"));

    clock.advance_ms(20);

    assert_eq!(cache.get("k"), Some(&"long"));
    assert_eq!(cache.size(), 1);
}

// == Boundaries and Errors ==

#[test]
fn test_expiry_boundary() {
    let (mut cache, clock) = create_test_cache(Capacity::Unbounded);

    cache.put(key("k"), 1, 100).unwrap();

    clock.advance_ms(99);
    assert_eq!(cache.get("k"), Some(&1));

    clock.advance_ms(1);
    assert_eq!(cache.get("k"), None);
}

#[test]
fn test_negative_retention_is_rejected() {
    let (mut cache, _) = create_test_cache(Capacity::Bounded(1));

    cache.put(key("keep"), 1, 100).unwrap();
    let result = cache.put(key("bad"), 2, -10);

    assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
    assert_eq!(cache.get("keep"), Some(&1));
    assert_eq!(cache.get("bad"), None);
    assert_eq!(cache.stats().evictions, 0);
}

#[test]
fn test_capacity_holds_after_many_puts() {
    let (mut cache, _) = create_test_cache(Capacity::Bounded(3));

    for i in 0..4 {
        cache.put(format!("key{}", i), i, i64::from(i32::MAX) - i64::from(i)).unwrap();
    }

    // key3 has the smallest retention and therefore the earliest expiration
    assert_eq!(cache.size(), 3);
    assert_eq!(cache.get("key3"), None);
    for i in 0..3 {
        assert_eq!(cache.get(&format!("key{}", i)), Some(&i));
    }
}

#[test]
fn test_expired_entries_free_capacity() {
    let (mut cache, clock) = create_test_cache(Capacity::Bounded(2));

    cache.put(key("a"), 1, 10).unwrap();
    cache.put(key("b"), 2, 500).unwrap();
    clock.advance_ms(10);
    cache.put(key("c"), 3, 100).unwrap();

    assert_eq!(cache.get("b"), Some(&2));
    assert_eq!(cache.get("c"), Some(&3));

    let stats = cache.stats();
    assert_eq!(stats.evictions, 0);
    assert_eq!(stats.expirations, 1);
    assert_eq!(stats.hit_rate(), 1.0);
}

#[test]
fn test_stats_track_hits_and_misses() {
    let (mut cache, clock) = create_test_cache(Capacity::Unbounded);

    cache.put(key("a"), 1, 100).unwrap();
    assert_eq!(cache.get("a"), Some(&1));
    assert_eq!(cache.get("missing"), None);

    clock.advance_ms(100);
    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.get("a"), None);

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.hit_rate(), 0.25);
    assert_eq!(stats.live_entries, 0);
}

// == Shared Access ==

#[tokio::test]
async fn test_shared_cache_across_tasks() {
    init_tracing();
    let clock = ManualClock::new();
    let shared: SharedCache<String, u32, ManualClock> =
        SharedCache::new(AgedCache::with_clock(clock.clone(), Capacity::Bounded(50)));

    let mut handles = Vec::new();
    for task in 0..8u32 {
        let cache = shared.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..20u32 {
                cache
                    .put(format!("t{}-{}", task, i), task * 100 + i, 1_000)
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(shared.size().await, 50);
    assert_eq!(shared.stats().await.evictions, 110);

    clock.advance_ms(1_000);
    assert!(shared.is_empty().await);
}
