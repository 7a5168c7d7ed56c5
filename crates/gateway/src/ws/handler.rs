//! The single upgrade-capable endpoint.
//!
//! Authentication happens before the upgrade: the token arrives as a query
//! parameter on the upgrade request, is verified by the gate, and only then
//! is the socket admitted to the registry. A failed gate still completes
//! the upgrade, but only to deliver the policy-violation close frame.

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use beacon_core::types::DbId;

use crate::auth::gate;
use crate::state::AppState;
use crate::ws::protocol::{self, ServerFrame, CLOSE_POLICY_VIOLATION, CLOSE_REASON};

/// Query parameters on the upgrade request.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Bearer-style access token. Absence is handled by the gate.
    pub token: Option<String>,
}

/// HTTP handler that authenticates and upgrades the connection.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let verdict = gate::authenticate(
        query.token.as_deref(),
        &state.config.jwt,
        state.store.as_ref(),
    )
    .await;

    match verdict {
        Ok(identity) => ws.on_upgrade(move |socket| handle_socket(socket, state, identity)),
        Err(failure) => {
            tracing::warn!(error = %failure, "WebSocket connection refused");
            ws.on_upgrade(reject_socket)
        }
    }
}

/// Complete the upgrade only to deliver the policy-violation close.
///
/// The close reason is deliberately generic; it never echoes whether the
/// token was missing, invalid, or mapped to an ineligible account.
async fn reject_socket(mut socket: WebSocket) {
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code: CLOSE_POLICY_VIOLATION,
            reason: CLOSE_REASON.into(),
        })))
        .await;
}

/// Manage an authenticated connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Admits the connection to the registry (replacing any prior one).
///   2. Spawns a sender task that forwards messages from the registry channel.
///   3. Pushes the initial `connection_established` frame.
///   4. Processes inbound frames sequentially on the current task.
///   5. Cleans up on disconnect, unless a replacement already took the slot.
async fn handle_socket(socket: WebSocket, state: AppState, identity: DbId) {
    let admission = state.registry.admit(identity).await;
    let epoch = admission.epoch;
    let tx = admission.sender;
    let mut rx = admission.receiver;
    tracing::info!(user_id = identity, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let is_close = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(user_id = identity, "WebSocket sink closed");
                break;
            }
            if is_close {
                break;
            }
        }
    });

    // Initial state push. A store failure here is logged and reported as
    // zero rather than tearing down a freshly authenticated connection.
    let unread_count = match state.store.unread_count(identity).await {
        Ok(count) => count,
        Err(e) => {
            tracing::error!(user_id = identity, error = %e, "Failed to fetch unread count");
            0
        }
    };
    let _ = tx.send(ServerFrame::ConnectionEstablished { unread_count }.to_message());

    // Receiver loop. Each frame is fully handled (including external store
    // calls) before the next is read from the stream.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let reply =
                    protocol::handle_frame(identity, text.as_str(), state.store.as_ref()).await;
                if let Some(frame) = reply {
                    // A send failure means the connection is already gone;
                    // the result is discarded, not an error.
                    if tx.send(frame.to_message()).is_err() {
                        break;
                    }
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(user_id = identity, "Pong received");
            }
            Ok(_) => {
                // Binary and Ping frames carry no protocol meaning here.
            }
            Err(e) => {
                tracing::debug!(user_id = identity, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up. Epoch-guarded so a replacement connection admitted while
    // this one was closing keeps its registry slot.
    state.registry.remove_if_epoch(identity, epoch).await;
    send_task.abort();
    tracing::info!(user_id = identity, "WebSocket disconnected");
}
