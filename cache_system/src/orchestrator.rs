//! Read-through fetch orchestration
//!
//! This module provides the `FetchOrchestrator`, the public entry point
//! combining key building, the TTL store and request coalescing.

use cache_key::{CacheKey, KeyBuilder, ListQuery, ParamValue};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::coalescer::RequestCoalescer;
use crate::errors::CacheError;
use crate::options::LoadOptions;
use crate::store::CacheStore;

/// Cache operations shared by orchestrators of any value type
pub trait ResourceCache: Send + Sync {
    /// Drop every entry built for `kind`
    fn invalidate_resource(&self, kind: &str) -> usize;

    /// Drop every entry
    fn clear(&self) -> usize;

    /// Drop entries past their TTL
    fn purge_expired(&self) -> usize;

    /// Number of stored entries, stale ones included
    fn cached_entries(&self) -> usize;
}

/// Read-through cache for values of type `T`
pub struct FetchOrchestrator<T> {
    store: Arc<CacheStore<Arc<T>>>,
    coalescer: RequestCoalescer<Arc<T>>,
    keys: Arc<KeyBuilder>,
    /// Only kind this orchestrator accepts, when bound
    kind: Option<String>,
}

impl<T> Debug for FetchOrchestrator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchOrchestrator")
            .field("store", &self.store)
            .field("coalescer", &self.coalescer)
            .field("keys", &self.keys)
            .field("kind", &self.kind)
            .finish()
    }
}

impl<T> FetchOrchestrator<T>
where
    T: Send + Sync + 'static,
{
    /// Orchestrator with its own key builder and no filter sentinels
    pub fn new(ttl: Duration) -> Self {
        Self::with_key_builder(ttl, Arc::new(KeyBuilder::new()))
    }

    pub fn with_key_builder(ttl: Duration, keys: Arc<KeyBuilder>) -> Self {
        Self {
            store: Arc::new(CacheStore::new(ttl)),
            coalescer: RequestCoalescer::new(),
            keys,
            kind: None,
        }
    }

    /// Orchestrator that rejects loads for any kind other than `kind`
    pub fn for_kind(kind: &str, ttl: Duration, keys: Arc<KeyBuilder>) -> Self {
        Self {
            kind: Some(kind.to_string()),
            ..Self::with_key_builder(ttl, keys)
        }
    }

    /// Kind this orchestrator is bound to, if any
    pub fn bound_kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Load `kind` queried with `params`, fetching only when no fresh entry exists.
    ///
    /// Invalid parameters fail before `fetch_fn` is considered.
    pub async fn load<I, K, V, F, Fut>(
        &self,
        kind: &str,
        params: I,
        fetch_fn: F,
        options: LoadOptions,
    ) -> Result<Arc<T>, CacheError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let key = self.keys.build(kind, params)?;
        self.load_key(key, fetch_fn, options).await
    }

    /// Load a typed list query
    pub async fn load_query<F, Fut>(
        &self,
        kind: &str,
        query: &ListQuery,
        fetch_fn: F,
        options: LoadOptions,
    ) -> Result<Arc<T>, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let key = self.keys.build_query(kind, query)?;
        self.load_key(key, fetch_fn, options).await
    }

    /// Load by an already built key
    pub async fn load_key<F, Fut>(
        &self,
        key: CacheKey,
        fetch_fn: F,
        options: LoadOptions,
    ) -> Result<Arc<T>, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        if let Some(bound) = self.kind.as_deref().filter(|bound| *bound != key.kind()) {
            return Err(CacheError::KindMismatch {
                expected: bound.to_string(),
                actual: key.kind().to_string(),
            });
        }

        if !options.force_refresh {
            let cached = match options.ttl_override {
                Some(max_age) => self.store.get_within(&key, max_age),
                None => self.store.get(&key),
            };
            if let Some(entry) = cached {
                trace_log!("[CACHE] hit for {}", key);
                return Ok(entry.into_value());
            }
            trace_log!("[CACHE] miss for {}", key);
        }

        let store = Arc::clone(&self.store);
        let store_key = key.clone();
        self.coalescer
            .fetch_once(key, move || {
                // Read before the request goes out so a mutation reported meanwhile wins
                let generation = store.generation();
                let pending = fetch_fn();
                async move {
                    let value = Arc::new(pending.await?);
                    store.set_if_current(store_key, Arc::clone(&value), generation);
                    Ok::<_, anyhow::Error>(value)
                }
            })
            .await
    }

    /// Drop the entry for one key
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.store.invalidate(key)
    }

    /// Drop every entry built for `kind`, typically after a create/update/delete succeeded
    pub fn invalidate_resource(&self, kind: &str) -> usize {
        let removed = self.store.invalidate_kind(kind);
        debug_log!("[CACHE] invalidated {} entries of {}", removed, kind);
        removed
    }

    pub fn clear(&self) -> usize {
        self.store.clear()
    }

    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired()
    }

    pub fn store(&self) -> &CacheStore<Arc<T>> {
        &self.store
    }

    pub fn coalescer(&self) -> &RequestCoalescer<Arc<T>> {
        &self.coalescer
    }

    pub fn key_builder(&self) -> &KeyBuilder {
        &self.keys
    }
}

impl<T> ResourceCache for FetchOrchestrator<T>
where
    T: Send + Sync + 'static,
{
    fn invalidate_resource(&self, kind: &str) -> usize {
        FetchOrchestrator::invalidate_resource(self, kind)
    }

    fn clear(&self) -> usize {
        FetchOrchestrator::clear(self)
    }

    fn purge_expired(&self) -> usize {
        FetchOrchestrator::purge_expired(self)
    }

    fn cached_entries(&self) -> usize {
        self.store.len()
    }
}
