//! Wire frames and the per-connection inbound dispatcher.
//!
//! Frames are JSON objects tagged on `"type"`. Inbound frames on a single
//! connection are handled strictly one at a time: the receive loop awaits
//! [`handle_frame`] (including its store calls) before reading the next
//! frame, so two `mark_read`s can never race the recount-and-push.

use serde::{Deserialize, Serialize};

use beacon_core::types::{DbId, NotificationId};

use crate::store::GatewayStore;

/// Close code sent for missing/invalid tokens and ineligible accounts.
pub const CLOSE_POLICY_VIOLATION: u16 = 1008;

/// Generic close reason; never describes which check failed.
pub const CLOSE_REASON: &str = "policy violation";

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// Client → server frames.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Mark the listed notifications as read.
    ///
    /// Scoping is always by the connection's authenticated identity; ids
    /// belonging to someone else are inert.
    MarkRead {
        #[serde(rename = "notificationIds")]
        notification_ids: Vec<NotificationId>,
    },

    /// Liveness probe; answered with `pong`, no state change.
    Ping,

    /// Any other `type` value. Accepted and ignored.
    #[serde(other)]
    Unknown,
}

/// Server → client frames.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Sent once, immediately after admission.
    ConnectionEstablished {
        #[serde(rename = "unreadCount")]
        unread_count: i64,
    },

    /// Pushed after a successful `mark_read`.
    UnreadCountUpdated {
        #[serde(rename = "unreadCount")]
        unread_count: i64,
    },

    /// An asynchronous notification produced elsewhere in the platform.
    NewNotification { notification: serde_json::Value },

    /// Reply to a client `ping`.
    Pong,

    /// Soft protocol failure; the connection stays open.
    Error { message: String },
}

impl ServerFrame {
    /// Serialize into a WebSocket text message.
    pub fn to_message(&self) -> axum::extract::ws::Message {
        // These variants contain only JSON-representable data.
        let text = serde_json::to_string(self).unwrap_or_else(|_| String::new());
        axum::extract::ws::Message::Text(text.into())
    }
}

// ---------------------------------------------------------------------------
// Inbound dispatch
// ---------------------------------------------------------------------------

/// Handle one inbound text frame for the connection owned by `identity`.
///
/// Returns the frame to send back on the same connection, if any.
/// Malformed payloads are soft failures: one `error` frame, connection
/// stays open. Unrecognized frame types are an explicit no-op.
pub async fn handle_frame<S: GatewayStore + ?Sized>(
    identity: DbId,
    raw: &str,
    store: &S,
) -> Option<ServerFrame> {
    let frame = match serde_json::from_str::<ClientFrame>(raw) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!(user_id = identity, error = %e, "Malformed inbound frame");
            return Some(ServerFrame::Error {
                message: "invalid message format".to_string(),
            });
        }
    };

    match frame {
        ClientFrame::Ping => Some(ServerFrame::Pong),

        ClientFrame::MarkRead { notification_ids } => {
            mark_read(identity, &notification_ids, store).await
        }

        ClientFrame::Unknown => None,
    }
}

/// Batch update, recount, and report the refreshed count.
///
/// A store failure on either call is logged and answered with an `error`
/// frame; no `unread_count_updated` follows, so the client never sees a
/// count that does not reflect the store.
async fn mark_read<S: GatewayStore + ?Sized>(
    identity: DbId,
    ids: &[NotificationId],
    store: &S,
) -> Option<ServerFrame> {
    if let Err(e) = store.mark_read(identity, ids).await {
        tracing::error!(user_id = identity, error = %e, "Failed to mark notifications read");
        return Some(ServerFrame::Error {
            message: "failed to update notifications".to_string(),
        });
    }

    match store.unread_count(identity).await {
        Ok(unread_count) => Some(ServerFrame::UnreadCountUpdated { unread_count }),
        Err(e) => {
            tracing::error!(user_id = identity, error = %e, "Failed to recount notifications");
            Some(ServerFrame::Error {
                message: "failed to update notifications".to_string(),
            })
        }
    }
}
