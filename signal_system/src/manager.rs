use config::SignalConfig;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use uuid::Uuid;

use crate::event::MutationEvent;
use crate::types::{CallbackId, EventCallback};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("Callback limit reached ({0})")]
    TooManyCallbacks(usize),
}

/// Signal manager for mutation notifications
pub struct SignalManager {
    config: SignalConfig,
    callbacks: RwLock<Vec<(CallbackId, EventCallback)>>,
}

impl std::fmt::Debug for SignalManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalManager")
            .field("callback_count", &self.callback_count())
            .field("max_callbacks", &self.config.max_callbacks)
            .finish()
    }
}

impl SignalManager {
    pub fn new(config: SignalConfig) -> Self {
        Self {
            config,
            callbacks: RwLock::new(Vec::new()),
        }
    }

    /// Add event callback
    pub fn add_callback<F>(&self, callback: F) -> Result<CallbackId, SignalError>
    where
        F: Fn(&MutationEvent) + Send + Sync + 'static,
    {
        let mut callbacks = self.callbacks.write().unwrap_or_else(PoisonError::into_inner);
        if callbacks.len() >= self.config.max_callbacks {
            return Err(SignalError::TooManyCallbacks(self.config.max_callbacks));
        }

        let id = Uuid::new_v4();
        callbacks.push((id, std::sync::Arc::new(callback)));
        Ok(id)
    }

    /// Remove a callback; returns whether it was registered
    pub fn remove_callback(&self, id: CallbackId) -> bool {
        let mut callbacks = self.callbacks.write().unwrap_or_else(PoisonError::into_inner);
        let before = callbacks.len();
        callbacks.retain(|(callback_id, _)| *callback_id != id);
        callbacks.len() != before
    }

    /// Emit event to all subscribers
    pub fn emit(&self, event: &MutationEvent) {
        // Snapshot so callbacks may register or remove callbacks themselves
        let callbacks: Vec<EventCallback> = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();

        tracing::debug!(
            "[SIGNAL] {:?} on {} delivered to {} callbacks",
            event.event_type,
            event.resource_kind,
            callbacks.len()
        );
        for callback in callbacks {
            callback(event);
        }
    }

    /// Clear all callbacks
    pub fn clear_callbacks(&self) {
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Get number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.callbacks
            .read()
            .map(|c| c.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }
}

impl Default for SignalManager {
    fn default() -> Self {
        Self::new(SignalConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_emit_reaches_every_callback() {
        let manager = SignalManager::default();
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let hits = hits.clone();
            manager
                .add_callback(move |_| {
                    hits.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        manager.emit(&MutationEvent::created("productos"));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_callbacks_receive_the_event() {
        let manager = SignalManager::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        manager
            .add_callback(move |event| {
                sink.lock().unwrap().push(event.resource_kind.clone());
            })
            .unwrap();

        manager.emit(&MutationEvent::updated("colores"));
        manager.emit(&MutationEvent::deleted("categorias"));
        assert_eq!(*seen.lock().unwrap(), vec!["colores", "categorias"]);
    }

    #[test]
    fn test_remove_callback() {
        let manager = SignalManager::default();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let id = manager
            .add_callback(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        assert!(manager.remove_callback(id));
        assert!(!manager.remove_callback(id));
        manager.emit(&MutationEvent::created("productos"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(manager.callback_count(), 0);
    }

    #[test]
    fn test_callback_limit() {
        let manager = SignalManager::new(SignalConfig::new(2));
        manager.add_callback(|_| {}).unwrap();
        manager.add_callback(|_| {}).unwrap();

        assert_eq!(
            manager.add_callback(|_| {}),
            Err(SignalError::TooManyCallbacks(2))
        );

        manager.clear_callbacks();
        assert_eq!(manager.callback_count(), 0);
        assert!(manager.add_callback(|_| {}).is_ok());
    }
}
