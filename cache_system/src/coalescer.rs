//! Request coalescing
//!
//! At most one fetch per key runs at a time. Callers arriving while a fetch
//! is pending await the same shared future instead of starting another one.
//!
//! The registry only keeps a weak handle to each pending fetch. The fetch
//! future is owned by the callers awaiting it, so it is dropped (cancelled)
//! only once every one of them has gone away.

use cache_key::CacheKey;
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::errors::CacheError;

type FetchFuture<V> = BoxFuture<'static, Result<V, CacheError>>;
type Registry<V> = Arc<Mutex<HashMap<CacheKey, InFlight<V>>>>;

struct InFlight<V> {
    id: u64,
    fetch: WeakShared<FetchFuture<V>>,
}

/// Removes a registration when its fetch settles or is dropped.
///
/// Lives inside the shared future, so removal happens before the result is
/// handed to any caller.
struct InFlightGuard<V> {
    registry: Registry<V>,
    key: CacheKey,
    id: u64,
}

impl<V> Drop for InFlightGuard<V> {
    fn drop(&mut self) {
        let mut in_flight = lock(&self.registry);
        // A newer fetch may have taken the slot after this one was abandoned
        if in_flight.get(&self.key).is_some_and(|f| f.id == self.id) {
            in_flight.remove(&self.key);
        }
    }
}

fn lock<V>(registry: &Registry<V>) -> MutexGuard<'_, HashMap<CacheKey, InFlight<V>>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ensures at most one in-flight fetch per key
pub struct RequestCoalescer<V> {
    in_flight: Registry<V>,
    next_id: AtomicU64,
}

impl<V> Debug for RequestCoalescer<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCoalescer")
            .field("in_flight", &lock(&self.in_flight).len())
            .finish()
    }
}

impl<V> Default for RequestCoalescer<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RequestCoalescer<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Run `producer` for `key` unless a fetch for it is already pending.
    ///
    /// Every caller attached to the same fetch receives the same value or the
    /// same error. Nothing is retried or cached here.
    ///
    /// `producer` runs while the registry lock is held and must not call back
    /// into this coalescer before returning its future. If it panics, nothing
    /// is registered for `key`.
    pub async fn fetch_once<F, Fut>(&self, key: CacheKey, producer: F) -> Result<V, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let shared = self.attach_or_start(key, producer);
        shared.await
    }

    fn attach_or_start<F, Fut>(&self, key: CacheKey, producer: F) -> Shared<FetchFuture<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let mut in_flight = lock(&self.in_flight);

        if let Some(existing) = in_flight.get(&key).and_then(|f| f.fetch.upgrade()) {
            trace_log!("[COALESCE] joining in-flight fetch for {}", key);
            return existing;
        }

        // Before the guard exists: a panicking producer must not leave a guard
        // to re-lock the registry while this thread still holds it
        let pending = producer();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let guard = InFlightGuard {
            registry: Arc::clone(&self.in_flight),
            key: key.clone(),
            id,
        };
        let error_key = key.clone();
        let fetch: FetchFuture<V> = async move {
            let result = pending.await;
            drop(guard);
            result.map_err(|err| {
                tracing::warn!("fetch for {} failed: {:#}", error_key, err);
                CacheError::fetch(error_key.as_str(), err)
            })
        }
        .boxed();
        let shared = fetch.shared();

        debug_log!("[COALESCE] starting fetch for {}", key);
        if let Some(weak) = shared.downgrade() {
            in_flight.insert(key, InFlight { id, fetch: weak });
        }
        shared
    }

    /// Number of fetches currently pending
    pub fn in_flight_count(&self) -> usize {
        lock(&self.in_flight).len()
    }

    pub fn is_in_flight(&self, key: &CacheKey) -> bool {
        lock(&self.in_flight).contains_key(key)
    }
}
