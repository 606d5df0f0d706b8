//! Event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`DomainEvent`]s, shared via
//! `Arc<EventBus>` across the application. Delivery is best-effort: slow
//! subscribers observe `RecvError::Lagged`, and events published with zero
//! subscribers are dropped (durable state is always recoverable by polling).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use lectra_core::types::DbId;

/// Dot-separated event names published by the workflow and admin handlers.
pub mod event_types {
    pub const REPORT_SUBMITTED: &str = "report.submitted";
    pub const REPORT_MODERATED: &str = "report.moderated";
    pub const FEEDBACK_CREATED: &str = "feedback.created";
    pub const ADMIN_BULK_ACTION: &str = "admin.bulk_action";
}

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// A mutation that other parts of the system may want to react to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Dot-separated event name, e.g. `"report.moderated"`.
    pub event_type: String,

    /// Source entity kind (`"report"`, `"feedback"`, `"user"`).
    pub entity_type: Option<String>,

    /// Source entity database id.
    pub entity_id: Option<DbId>,

    /// Id of the user that triggered the event.
    pub actor_id: Option<DbId>,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            entity_type: None,
            entity_id: None,
            actor_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach the source entity.
    pub fn with_entity(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id);
        self
    }

    /// Attach the acting user.
    pub fn with_actor(mut self, actor_id: DbId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// A `SendError` only means there are zero receivers; it is ignored.
    pub fn publish(&self, event: DomainEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = DomainEvent::new(event_types::REPORT_MODERATED)
            .with_entity("report", 42)
            .with_actor(7);

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "report.moderated");
        assert_eq!(received.entity_type.as_deref(), Some("report"));
        assert_eq!(received.entity_id, Some(42));
        assert_eq!(received.actor_id, Some(7));
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(DomainEvent::new(event_types::FEEDBACK_CREATED));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, "feedback.created");
        assert_eq!(e2.event_type, "feedback.created");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(DomainEvent::new(event_types::ADMIN_BULK_ACTION));
    }

    #[test]
    fn bare_event_has_empty_optional_fields() {
        let event = DomainEvent::new(event_types::REPORT_SUBMITTED);
        assert_eq!(event.event_type, "report.submitted");
        assert!(event.entity_type.is_none());
        assert!(event.entity_id.is_none());
        assert!(event.actor_id.is_none());
    }
}
