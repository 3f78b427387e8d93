//! Convenience re-exports for common signal-system usage

pub use crate::event::{EventType, MutationEvent};
pub use crate::manager::{SignalError, SignalManager};
pub use crate::types::{CallbackId, EventCallback};
pub use config::SignalConfig;
