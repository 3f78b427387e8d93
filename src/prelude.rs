//! Convenience re-exports for common ReadThrough usage
//!
//! # Example
//!
//! ```rust
//! use readthrough::prelude::*;
//!
//! let options = LoadOptions::refresh();
//! assert!(options.force_refresh);
//! ```

// Core ReadThrough components
pub use crate::core::ReadThrough;
pub use crate::errors::ReadThroughError;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, ConfigError, ResourceConfig, SignalConfig};

// Cache system, key building included
pub use cache_system::prelude::*;

// Signal system for mutation notifications
pub use signal_system::prelude::*;

// Common external dependencies
pub use anyhow;
pub use tokio;
