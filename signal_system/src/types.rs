//! Type definitions for signal system

use crate::event::MutationEvent;
use std::sync::Arc;

/// Callback invoked synchronously for every emitted event
pub type EventCallback = Arc<dyn Fn(&MutationEvent) + Send + Sync>;

/// Handle identifying a registered callback
pub type CallbackId = uuid::Uuid;
