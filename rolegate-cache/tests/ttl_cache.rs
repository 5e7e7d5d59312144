use rolegate_cache::TtlCache;
use std::thread::sleep;
use std::time::Duration;

#[test]
fn test_cache_hit() {
    let cache = TtlCache::new(Duration::from_secs(60));
    cache.insert("key", "value");
    assert_eq!(cache.get(&"key"), Some("value"));
}

#[test]
fn test_cache_miss() {
    let cache: TtlCache<&str, &str> = TtlCache::new(Duration::from_secs(60));
    assert_eq!(cache.get(&"missing"), None);
}

#[test]
fn test_cache_expiry() {
    let cache = TtlCache::new(Duration::from_millis(50));
    cache.insert("key", "value");
    assert_eq!(cache.get(&"key"), Some("value"));
    sleep(Duration::from_millis(60));
    assert_eq!(cache.get(&"key"), None);
}

#[test]
fn test_expired_entry_is_dropped_on_read() {
    let cache = TtlCache::new(Duration::from_millis(20));
    cache.insert("key", "value");
    sleep(Duration::from_millis(30));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&"key"), None);
    assert!(cache.is_empty());
}

#[test]
fn test_per_entry_ttl_overrides_default() {
    let cache = TtlCache::new(Duration::from_secs(60));
    cache.insert_with_ttl("short", 1, Duration::from_millis(20));
    cache.insert("long", 2);
    sleep(Duration::from_millis(30));
    assert_eq!(cache.get(&"short"), None);
    assert_eq!(cache.get(&"long"), Some(2));
}

#[test]
fn test_insert_replaces_and_restarts_lifetime() {
    let cache = TtlCache::new(Duration::from_millis(80));
    cache.insert("key", "old");
    sleep(Duration::from_millis(50));
    cache.insert("key", "new");
    sleep(Duration::from_millis(50));
    assert_eq!(cache.get(&"key"), Some("new"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_remove() {
    let cache = TtlCache::new(Duration::from_secs(60));
    cache.insert("key", "value");
    assert_eq!(cache.remove(&"key"), Some("value"));
    assert_eq!(cache.get(&"key"), None);
    assert_eq!(cache.remove(&"key"), None);
}

#[test]
fn test_cache_clear() {
    let cache = TtlCache::new(Duration::from_secs(60));
    cache.insert("a", "1");
    cache.insert("b", "2");
    cache.clear();
    assert_eq!(cache.get(&"a"), None);
    assert_eq!(cache.get(&"b"), None);
}

#[test]
fn test_evict_expired_counts_removed_entries() {
    let cache = TtlCache::new(Duration::from_secs(60));
    cache.insert_with_ttl("a", 1, Duration::from_millis(10));
    cache.insert_with_ttl("b", 2, Duration::from_millis(10));
    cache.insert("c", 3);
    sleep(Duration::from_millis(20));
    assert_eq!(cache.evict_expired(), 2);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&"c"), Some(3));
}

#[test]
fn test_clones_share_storage() {
    let cache = TtlCache::new(Duration::from_secs(60));
    let other = cache.clone();
    cache.insert("k".to_string(), 7u32);
    assert_eq!(other.get(&"k".to_string()), Some(7));
}

#[test]
fn test_concurrent_writers_leave_one_entry_per_key() {
    let cache: TtlCache<String, usize> = TtlCache::new(Duration::from_secs(60));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cache = cache.clone();
            std::thread::spawn(move || {
                for n in 0..200 {
                    cache.insert(format!("key-{}", n % 10), i);
                    let _ = cache.get(&format!("key-{}", (n + 3) % 10));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(cache.len(), 10);
    for n in 0..10 {
        let v = cache.get(&format!("key-{n}")).unwrap();
        assert!(v < 8);
    }
}

#[test]
fn zero_ttl_never_returns_a_value() {
    let cache = TtlCache::new(Duration::ZERO);
    cache.insert("a", 1);
    assert_eq!(cache.get(&"a"), None);
    assert!(cache.is_empty());
}
