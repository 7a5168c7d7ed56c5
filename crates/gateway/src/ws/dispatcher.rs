//! Outward-facing push API for in-process notification producers.

use std::sync::Arc;

use beacon_core::types::DbId;

use crate::ws::protocol::ServerFrame;
use crate::ws::registry::ConnectionRegistry;

/// Best-effort delivery of `new_notification` frames.
///
/// Cheap to clone; hand one to every in-process producer. Delivery is
/// never acknowledged, buffered, or retried — a recipient without a live
/// writable connection simply does not receive the frame.
#[derive(Clone)]
pub struct PushDispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl PushDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Push a notification to `identity`'s connection, if present.
    ///
    /// A miss (not connected, or channel no longer writable) is a silent
    /// no-op. The returned flag says only whether the frame was handed to a
    /// live channel; it is for logging, not a delivery guarantee.
    pub async fn push(&self, identity: DbId, notification: serde_json::Value) -> bool {
        let frame = ServerFrame::NewNotification { notification };
        let attempted = self.registry.send_to(identity, frame.to_message()).await;
        if !attempted {
            tracing::trace!(user_id = identity, "Push target not connected, dropped");
        }
        attempted
    }

    /// Push a notification to every live connection.
    ///
    /// Each connection is attempted independently; a dead channel never
    /// aborts delivery to the rest, and there is no collective result.
    pub async fn broadcast(&self, notification: serde_json::Value) {
        let frame = ServerFrame::NewNotification { notification };
        self.registry.broadcast(frame.to_message()).await;
    }
}
