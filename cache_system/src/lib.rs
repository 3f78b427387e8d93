//! Cache system for read-through resource caching
//!
//! This crate provides an in-memory TTL store, per-key request coalescing
//! and the orchestrator combining both behind a single `load` call.

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod coalescer;
pub mod errors;
pub mod options;
pub mod orchestrator;
pub mod prelude;
pub mod store;

pub use coalescer::RequestCoalescer;
pub use errors::CacheError;
pub use options::LoadOptions;
pub use orchestrator::{FetchOrchestrator, ResourceCache};
pub use store::{CacheEntry, CacheStore};

// Key building is part of the public API of `load`
pub use cache_key;
