//! Mutation event types and definitions
//!
//! This module defines the structure of the events reported after a
//! create/update/delete against the backend has succeeded.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mutation event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Create,
    Update,
    Delete,
}

/// Successful write against a resource kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationEvent {
    /// Unique event ID
    pub id: Uuid,
    /// Event type
    pub event_type: EventType,
    /// Resource kind that was written (e.g. `productos`)
    pub resource_kind: String,
    /// Record ID (if available)
    pub record_id: Option<String>,
    /// Event timestamp (UTC)
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl MutationEvent {
    pub fn new(event_type: EventType, resource_kind: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            resource_kind: resource_kind.to_string(),
            record_id: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn created(resource_kind: &str) -> Self {
        Self::new(EventType::Create, resource_kind)
    }

    pub fn updated(resource_kind: &str) -> Self {
        Self::new(EventType::Update, resource_kind)
    }

    pub fn deleted(resource_kind: &str) -> Self {
        Self::new(EventType::Delete, resource_kind)
    }

    pub fn with_record_id(mut self, record_id: impl ToString) -> Self {
        self.record_id = Some(record_id.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builders() {
        let event = MutationEvent::updated("productos").with_record_id(42);
        assert_eq!(event.event_type, EventType::Update);
        assert_eq!(event.resource_kind, "productos");
        assert_eq!(event.record_id.as_deref(), Some("42"));

        let other = MutationEvent::deleted("productos");
        assert_ne!(event.id, other.id);
        assert!(other.record_id.is_none());
    }

    #[test]
    fn test_event_serializes() {
        let event = MutationEvent::created("categorias").with_record_id("7");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "Create");
        assert_eq!(json["resource_kind"], "categorias");

        let back: MutationEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back.id, event.id);
    }
}
