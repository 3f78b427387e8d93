//! Signal system for mutation notifications
//!
//! This crate lets write paths announce that a resource changed so caches
//! depending on it can be invalidated explicitly.

pub mod event;
pub mod manager;
pub mod prelude;
pub mod types;

pub use config::SignalConfig;
pub use event::{EventType, MutationEvent};
pub use manager::{SignalError, SignalManager};
pub use types::{CallbackId, EventCallback};
