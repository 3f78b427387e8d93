//! Per-call load options

use std::time::Duration;

/// Options for a single `FetchOrchestrator::load` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Skip the cache lookup; still joins a fetch already in flight
    pub force_refresh: bool,
    /// Maximum acceptable age for this read instead of the store TTL
    pub ttl_override: Option<Duration>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that bypass the cached entry
    pub fn refresh() -> Self {
        Self::new().with_force_refresh(true)
    }

    pub fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    pub fn with_ttl_override(mut self, ttl: Duration) -> Self {
        self.ttl_override = Some(ttl);
        self
    }
}
