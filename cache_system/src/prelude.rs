//! Convenience re-exports for common cache-system usage

// Core cache system components
pub use crate::coalescer::RequestCoalescer;
pub use crate::errors::CacheError;
pub use crate::options::LoadOptions;
pub use crate::orchestrator::{FetchOrchestrator, ResourceCache};
pub use crate::store::{CacheEntry, CacheStore};

// Key building
pub use cache_key::prelude::*;

// Common external dependencies
pub use anyhow;
pub use tokio;
