//! Core ReadThrough functionality
//!
//! This module contains the main ReadThrough struct and its implementation,
//! owning one cache per resource kind and wiring mutation signals to
//! invalidation.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use cache_system::cache_key::KeyBuilder;
use cache_system::{FetchOrchestrator, ResourceCache};
use config::{AppConfig, CacheConfig};
use signal_system::{CallbackId, EventType, MutationEvent, SignalManager};
use tokio::task::JoinHandle;

use crate::errors::ReadThroughError;

struct RegisteredResource {
    typed: Arc<dyn Any + Send + Sync>,
    cache: Arc<dyn ResourceCache>,
    callback: CallbackId,
}

/// Main ReadThrough coordinator that manages per-resource caches
pub struct ReadThrough {
    config: CacheConfig,
    keys: Arc<KeyBuilder>,
    signals: Arc<SignalManager>,
    resources: HashMap<String, RegisteredResource>,
}

impl std::fmt::Debug for ReadThrough {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadThrough")
            .field("resources", &self.resource_kinds())
            .field("signals", &self.signals)
            .finish()
    }
}

impl ReadThrough {
    /// Create a new ReadThrough from configuration
    pub fn new(config: AppConfig) -> Result<Self, ReadThroughError> {
        config.validate()?;

        let keys = Arc::new(KeyBuilder::with_sentinels(
            config.cache.sentinel_values.iter().cloned(),
        ));

        Ok(Self {
            keys,
            signals: Arc::new(SignalManager::new(config.signal)),
            config: config.cache,
            resources: HashMap::new(),
        })
    }

    /// Create a ReadThrough from `READTHROUGH_CONFIG` or `./readthrough.toml`
    pub fn from_env() -> Result<Self, ReadThroughError> {
        Self::new(AppConfig::load()?)
    }

    /// Get the signal manager mutation events are emitted through
    pub fn signals(&self) -> &Arc<SignalManager> {
        &self.signals
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn key_builder(&self) -> &Arc<KeyBuilder> {
        &self.keys
    }

    /// Register the cache for `kind`, returning its orchestrator.
    ///
    /// The orchestrator only loads `kind`, so every entry it stores is reached
    /// by mutation-driven invalidation.
    pub fn register<T>(&mut self, kind: &str) -> Result<Arc<FetchOrchestrator<T>>, ReadThroughError>
    where
        T: Send + Sync + 'static,
    {
        if self.resources.contains_key(kind) {
            return Err(ReadThroughError::ResourceAlreadyRegistered(kind.to_string()));
        }
        // Reject malformed kinds here rather than on the first load
        self.keys.build(kind, Vec::<(String, bool)>::new())?;

        let ttl = self.config.ttl_for(kind);
        let orchestrator = Arc::new(FetchOrchestrator::<T>::for_kind(
            kind,
            ttl,
            Arc::clone(&self.keys),
        ));

        let sources = self.config.invalidation_sources(kind);
        let target = Arc::clone(&orchestrator);
        let resource_kind = kind.to_string();
        let callback = self.signals.add_callback(move |event| {
            if sources.iter().any(|source| *source == event.resource_kind) {
                let removed = target.invalidate_resource(&resource_kind);
                tracing::debug!(
                    "[READTHROUGH] {:?} on {} invalidated {} entries of {}",
                    event.event_type,
                    event.resource_kind,
                    removed,
                    resource_kind
                );
            }
        })?;

        tracing::debug!("[READTHROUGH] registered {} with ttl {:?}", kind, ttl);
        self.resources.insert(
            kind.to_string(),
            RegisteredResource {
                typed: orchestrator.clone(),
                cache: orchestrator.clone(),
                callback,
            },
        );
        Ok(orchestrator)
    }

    /// Get the orchestrator registered for `kind`
    pub fn resource<T>(&self, kind: &str) -> Result<Arc<FetchOrchestrator<T>>, ReadThroughError>
    where
        T: Send + Sync + 'static,
    {
        let registered = self
            .resources
            .get(kind)
            .ok_or_else(|| ReadThroughError::ResourceNotFound(kind.to_string()))?;

        Arc::clone(&registered.typed)
            .downcast::<FetchOrchestrator<T>>()
            .map_err(|_| ReadThroughError::TypeMismatch {
                kind: kind.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Remove the cache for `kind` and stop invalidating it
    pub fn unregister(&mut self, kind: &str) -> Result<(), ReadThroughError> {
        let registered = self
            .resources
            .remove(kind)
            .ok_or_else(|| ReadThroughError::ResourceNotFound(kind.to_string()))?;
        self.signals.remove_callback(registered.callback);
        Ok(())
    }

    /// List all registered resource kinds
    pub fn resource_kinds(&self) -> Vec<&String> {
        let mut kinds: Vec<&String> = self.resources.keys().collect();
        kinds.sort();
        kinds
    }

    /// Report a successful write so every dependent cache is invalidated
    pub fn emit(&self, event: &MutationEvent) {
        self.signals.emit(event);
    }

    /// Shorthand for `emit` with a freshly built event
    pub fn notify_mutation(&self, event_type: EventType, kind: &str, record_id: Option<&str>) {
        let mut event = MutationEvent::new(event_type, kind);
        if let Some(record_id) = record_id {
            event = event.with_record_id(record_id);
        }
        self.emit(&event);
    }

    /// Invalidate the cache registered for `kind` directly
    pub fn invalidate(&self, kind: &str) -> Result<usize, ReadThroughError> {
        self.resources
            .get(kind)
            .map(|registered| registered.cache.invalidate_resource(kind))
            .ok_or_else(|| ReadThroughError::ResourceNotFound(kind.to_string()))
    }

    /// Drop every cached entry of every resource (logout, test isolation)
    pub fn clear_all(&self) -> usize {
        self.resources
            .values()
            .map(|registered| registered.cache.clear())
            .sum()
    }

    /// Drop stale entries of every resource
    pub fn purge_expired(&self) -> usize {
        purge(&self.caches())
    }

    /// Number of stored entries across all resources
    pub fn cached_entries(&self) -> usize {
        self.resources
            .values()
            .map(|registered| registered.cache.cached_entries())
            .sum()
    }

    /// Periodically purge stale entries of the resources registered so far.
    ///
    /// Uses the given interval or the configured `sweep_interval_ms`; returns
    /// `None` when neither is set. A zero interval counts as unset. Abort the
    /// handle to stop sweeping.
    pub fn spawn_sweeper(&self, interval: Option<Duration>) -> Option<JoinHandle<()>> {
        let period = interval
            .filter(|period| !period.is_zero())
            .or_else(|| self.config.sweep_interval())?;
        let caches = self.caches();

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let purged = purge(&caches);
                if purged > 0 {
                    tracing::debug!("[READTHROUGH] sweeper purged {} stale entries", purged);
                }
            }
        }))
    }

    fn caches(&self) -> Vec<Arc<dyn ResourceCache>> {
        self.resources
            .values()
            .map(|registered| Arc::clone(&registered.cache))
            .collect()
    }
}

fn purge(caches: &[Arc<dyn ResourceCache>]) -> usize {
    caches.iter().map(|cache| cache.purge_expired()).sum()
}

impl Drop for ReadThrough {
    fn drop(&mut self) {
        // The signal manager may outlive us through `signals()`
        for registered in self.resources.values() {
            self.signals.remove_callback(registered.callback);
        }
    }
}
