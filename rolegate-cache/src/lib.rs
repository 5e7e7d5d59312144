//! Typed TTL cache backed by `DashMap`.
//!
//! Expiry is enforced when an entry is read; [`spawn_sweeper`] only bounds
//! memory by purging entries nobody asked for again.

mod sweeper;

pub use sweeper::{spawn_sweeper, SweeperHandle};

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// A cached value together with its insertion time and lifetime.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    /// `true` once `inserted_at + ttl` has been reached. A zero TTL is
    /// expired as soon as it is stored.
    pub fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// A thread-safe TTL cache.
///
/// Cloning is cheap and every clone shares the same storage. Each entry
/// carries its own TTL; [`insert`](Self::insert) uses the cache default.
#[derive(Clone)]
pub struct TtlCache<K, V> {
    inner: Arc<DashMap<K, Entry<V>>>,
    ttl: Duration,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    /// Create a new cache whose entries live for `ttl` by default.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Default time-to-live applied by [`insert`](Self::insert).
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a cached value if it exists and hasn't expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let entry = self.inner.get(key)?;
        if !entry.is_expired() {
            return Some(entry.value.clone());
        }
        // Release the shard read guard before taking the write lock.
        drop(entry);
        self.inner.remove_if(key, |_, e| e.is_expired());
        None
    }

    /// Insert or replace a value using the default TTL.
    pub fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.ttl);
    }

    /// Insert or replace a value with an explicit TTL.
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.inner.insert(key, Entry::new(value, ttl));
    }

    /// Remove a specific entry, returning its value if it was still live.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner
            .remove(key)
            .and_then(|(_, e)| (!e.is_expired()).then_some(e.value))
    }

    /// Remove all entries from the cache.
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Remove all expired entries and return how many were dropped.
    pub fn evict_expired(&self) -> usize {
        let before = self.inner.len();
        self.inner.retain(|_, e| !e.is_expired());
        before.saturating_sub(self.inner.len())
    }
}
