//! Error types for cache operations
//!
//! This module defines all error types that can occur
//! during cache lookups and coalesced fetches.

use cache_key::KeyError;
use std::sync::Arc;
use thiserror::Error;

/// Cache system errors
///
/// Cloneable so a single failed fetch can be handed to every coalesced caller.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    #[error("Fetch failed for {key}: {error:#}")]
    Fetch {
        key: String,
        error: Arc<anyhow::Error>,
    },

    #[error("Key build error: {0}")]
    KeyBuild(#[from] KeyError),

    #[error("Cache for {expected} cannot load {actual}")]
    KindMismatch { expected: String, actual: String },
}

impl CacheError {
    pub fn fetch(key: &str, source: anyhow::Error) -> Self {
        Self::Fetch {
            key: key.to_string(),
            error: Arc::new(source),
        }
    }

    /// Underlying error reported by the fetch function, if any
    pub fn fetch_source(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Fetch { error, .. } => Some(error.as_ref()),
            _ => None,
        }
    }
}
