//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the hub every resource handler publishes to after a
//! successful mutation. It is shared via `Arc<EventBus>` across the
//! application; each subscriber observes events in publish order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use pressroom_core::types::DbId;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Dot-separated lifecycle event names. The prefix is the resource kind
/// (`events` / `planning`), the suffix is the operation.
pub mod event_types {
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";
    pub const DELETED: &str = "deleted";
    pub const LOCKED: &str = "locked";
    pub const UNLOCKED: &str = "unlocked";
    pub const SPIKED: &str = "spiked";
    pub const UNSPIKED: &str = "unspiked";
    pub const PUBLISHED: &str = "published";
    pub const CANCELLED: &str = "cancelled";
    pub const RESCHEDULED: &str = "rescheduled";
    pub const POSTPONED: &str = "postponed";
    pub const DUPLICATED: &str = "duplicated";
}

// ---------------------------------------------------------------------------
// ItemEvent
// ---------------------------------------------------------------------------

/// A lifecycle event on one item.
///
/// Constructed via [`ItemEvent::new`] and enriched with
/// [`with_actor`](ItemEvent::with_actor) and
/// [`with_payload`](ItemEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemEvent {
    /// Resource kind the item belongs to (`"events"` or `"planning"`).
    pub item_kind: String,

    /// The item's database id.
    pub item_id: DbId,

    /// The operation that happened, e.g. [`event_types::LOCKED`].
    pub operation: String,

    /// Id of the user that triggered the operation, if authenticated.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying operation-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ItemEvent {
    /// Create a new event for an item and operation.
    pub fn new(item_kind: impl Into<String>, item_id: DbId, operation: impl Into<String>) -> Self {
        Self {
            item_kind: item_kind.into(),
            item_id,
            operation: operation.into(),
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// The dot-separated name used in logs, e.g. `"events.locked"`.
    pub fn name(&self) -> String {
        format!("{}.{}", self.item_kind, self.operation)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ItemEvent`].
pub struct EventBus {
    sender: broadcast::Sender<ItemEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: ItemEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ItemEvent> {
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

        let event = ItemEvent::new("events", 42, event_types::LOCKED)
            .with_actor(7)
            .with_payload(serde_json::json!({"lock_action": "edit"}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.item_kind, "events");
        assert_eq!(received.item_id, 42);
        assert_eq!(received.operation, "locked");
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.payload["lock_action"], "edit");
        assert_eq!(received.name(), "events.locked");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(ItemEvent::new("planning", 3, event_types::CREATED));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.name(), "planning.created");
        assert_eq!(e2.name(), "planning.created");
    }

    #[tokio::test]
    async fn events_arrive_in_publish_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(ItemEvent::new("events", 1, event_types::CREATED));
        bus.publish(ItemEvent::new("events", 1, event_types::LOCKED));
        bus.publish(ItemEvent::new("events", 1, event_types::UNLOCKED));

        assert_eq!(rx.recv().await.unwrap().operation, "created");
        assert_eq!(rx.recv().await.unwrap().operation, "locked");
        assert_eq!(rx.recv().await.unwrap().operation, "unlocked");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers -- this must not panic.
        bus.publish(ItemEvent::new("events", 1, event_types::DELETED));
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = ItemEvent::new("events", 9, event_types::UPDATED);
        assert!(event.actor_user_id.is_none());
        assert!(event.payload.is_object());
    }
}
