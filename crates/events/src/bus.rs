//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`NotificationCreated`]
//! events. It is designed to be shared via `Arc<EventBus>` across the
//! application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use beacon_core::types::DbId;

// ---------------------------------------------------------------------------
// NotificationCreated
// ---------------------------------------------------------------------------

/// Emitted when a producer has persisted a new notification record.
///
/// Carries the recipient and the already-serialized notification object so
/// the gateway can forward it without a round trip to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationCreated {
    /// Account id of the recipient.
    pub recipient: DbId,

    /// The notification record as the client should see it.
    pub notification: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl NotificationCreated {
    /// Create an event for `recipient` carrying `notification`.
    pub fn new(recipient: DbId, notification: serde_json::Value) -> Self {
        Self {
            recipient,
            notification,
            timestamp: Utc::now(),
        }
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
/// independently receive every published [`NotificationCreated`] event.
pub struct EventBus {
    sender: broadcast::Sender<NotificationCreated>,
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
    /// If there are no active subscribers the event is silently dropped;
    /// delivery over the bus is best-effort, like the push itself.
    pub fn publish(&self, event: NotificationCreated) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationCreated> {
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

        bus.publish(NotificationCreated::new(
            7,
            serde_json::json!({"title": "build finished"}),
        ));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.recipient, 7);
        assert_eq!(received.notification["title"], "build finished");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(NotificationCreated::new(1, serde_json::json!({})));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.recipient, 1);
        assert_eq!(e2.recipient, 1);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers — this must not panic.
        bus.publish(NotificationCreated::new(2, serde_json::json!({})));
    }
}
