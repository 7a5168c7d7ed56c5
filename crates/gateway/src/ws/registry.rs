//! The connection registry: one live entry per authenticated identity.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::{CloseFrame, Message};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use beacon_core::types::{DbId, Timestamp};

use crate::ws::protocol::CLOSE_POLICY_VIOLATION;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// A single registered connection.
pub struct Connection {
    /// Authenticated account id; also the registry key.
    pub identity: DbId,
    /// Distinguishes this connection from an earlier or later one for the
    /// same identity, so disconnect cleanup cannot evict a replacement.
    pub epoch: Uuid,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Everything the upgrade handler needs after admission.
pub struct Admission {
    /// Epoch of the admitted connection, for conditional removal on close.
    pub epoch: Uuid,
    /// Sender half for pushing frames to this connection.
    pub sender: WsSender,
    /// Receiver the handler forwards to the WebSocket sink.
    pub receiver: mpsc::UnboundedReceiver<Message>,
}

/// Identity-keyed table of live connections.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// passed explicitly into the protocol handler and push dispatcher.
///
/// Invariant: at most one entry per identity at any instant. Admitting a
/// second connection for an identity replaces the first.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<DbId, Connection>>,
}

impl ConnectionRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection for `identity`, replacing any existing one.
    ///
    /// The replaced connection, if any, is sent a policy-violation Close
    /// frame before it is dropped, so the superseded socket does not linger
    /// open on the client.
    pub async fn admit(&self, identity: DbId) -> Admission {
        let (tx, rx) = mpsc::unbounded_channel();
        let epoch = Uuid::new_v4();
        let conn = Connection {
            identity,
            epoch,
            sender: tx.clone(),
            connected_at: chrono::Utc::now(),
        };

        let mut conns = self.connections.write().await;
        if let Some(prev) = conns.insert(identity, conn) {
            tracing::info!(user_id = identity, "Replacing existing connection");
            let _ = prev.sender.send(Message::Close(Some(CloseFrame {
                code: CLOSE_POLICY_VIOLATION,
                reason: "session replaced".into(),
            })));
        }

        Admission {
            epoch,
            sender: tx,
            receiver: rx,
        }
    }

    /// Remove the entry for `identity`. Idempotent; no-op when absent.
    pub async fn remove(&self, identity: DbId) {
        self.connections.write().await.remove(&identity);
    }

    /// Remove the entry for `identity` only if it still carries `epoch`.
    ///
    /// Used by disconnect cleanup: if the identity has already been
    /// re-admitted with a newer connection, the stale cleanup is a no-op.
    pub async fn remove_if_epoch(&self, identity: DbId, epoch: Uuid) {
        let mut conns = self.connections.write().await;
        if conns.get(&identity).is_some_and(|c| c.epoch == epoch) {
            conns.remove(&identity);
        }
    }

    /// Whether `identity` currently has a live entry.
    pub async fn is_connected(&self, identity: DbId) -> bool {
        self.connections.read().await.contains_key(&identity)
    }

    /// Send a message to `identity`'s connection, if present and writable.
    ///
    /// Returns `true` when the message was handed to a live channel. A
    /// missing entry or closed channel is not an error.
    pub async fn send_to(&self, identity: DbId, message: Message) -> bool {
        let conns = self.connections.read().await;
        match conns.get(&identity) {
            Some(conn) => conn.sender.send(message).is_ok(),
            None => false,
        }
    }

    /// Send a message to every registered connection.
    ///
    /// Connections whose send channels are closed are silently skipped
    /// (they will be cleaned up by their own receive loop); one dead
    /// connection never blocks delivery to the rest.
    pub async fn broadcast(&self, message: Message) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(message.clone());
        }
    }

    /// Return the current number of live connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }

    /// Send a Close frame to every connection, then clear the table.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
