//! In-memory TTL store
//!
//! This module provides the `CacheStore` holding fetched values and
//! answering freshness queries.

use cache_key::CacheKey;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Stored value and the moment it was written
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn stored_at(&self) -> Instant {
        self.stored_at
    }

    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.stored_at)
    }

    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

struct StoreState<V> {
    entries: HashMap<CacheKey, CacheEntry<V>>,
    /// Bumped by every invalidation
    generation: u64,
}

/// Keyed storage of entries sharing one TTL
pub struct CacheStore<V> {
    ttl: Duration,
    state: RwLock<StoreState<V>>,
}

impl<V> Debug for CacheStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("ttl", &self.ttl)
            .field("entries", &self.len())
            .finish()
    }
}

impl<V: Clone> CacheStore<V> {
    /// Create a store whose entries expire `ttl` after being written
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: RwLock::new(StoreState {
                entries: HashMap::new(),
                generation: 0,
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `key`, or `None` once it is `ttl` old
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry<V>> {
        self.get_within(key, self.ttl)
    }

    /// Fresh entry for `key` judged against `max_age` instead of the store TTL
    pub fn get_within(&self, key: &CacheKey, max_age: Duration) -> Option<CacheEntry<V>> {
        let now = Instant::now();
        self.read()
            .entries
            .get(key)
            .filter(|entry| entry.is_fresh(max_age, now))
            .cloned()
    }

    /// Store `value` under `key`, replacing any previous entry
    pub fn set(&self, key: CacheKey, value: V) {
        self.write().entries.insert(key, CacheEntry::new(value));
    }

    /// Store `value` unless an invalidation happened after `generation` was read.
    ///
    /// Returns whether the value was stored.
    pub fn set_if_current(&self, key: CacheKey, value: V, generation: u64) -> bool {
        let mut state = self.write();
        if state.generation != generation {
            tracing::debug!(
                "[CACHE] discarding result for {} fetched before an invalidation",
                key
            );
            return false;
        }
        state.entries.insert(key, CacheEntry::new(value));
        true
    }

    /// Current invalidation generation
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Remove the entry for `key`; returns whether one existed
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let mut state = self.write();
        state.generation += 1;
        state.entries.remove(key).is_some()
    }

    /// Remove every entry built for resource `kind`
    pub fn invalidate_kind(&self, kind: &str) -> usize {
        let mut state = self.write();
        state.generation += 1;
        let before = state.entries.len();
        state.entries.retain(|key, _| key.kind() != kind);
        before - state.entries.len()
    }

    /// Remove all entries
    pub fn clear(&self) -> usize {
        let mut state = self.write();
        state.generation += 1;
        let removed = state.entries.len();
        state.entries.clear();
        removed
    }

    /// Drop entries that are no longer fresh.
    ///
    /// Reads already ignore stale entries; this only reclaims memory.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        let mut state = self.write();
        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.is_fresh(ttl, now));
        before - state.entries.len()
    }
}

impl<V> CacheStore<V> {
    /// Number of stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the map half-written, so poisoning is ignored
    fn read(&self) -> RwLockReadGuard<'_, StoreState<V>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState<V>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
