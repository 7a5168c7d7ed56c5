//! Bridge from the in-process event bus to the push dispatcher.

use tokio::sync::broadcast;

use beacon_events::NotificationCreated;

use crate::ws::PushDispatcher;

/// Forwards [`NotificationCreated`] events to their recipients' live
/// connections.
///
/// This is the canonical in-process producer wiring: whatever creates a
/// notification record publishes on the bus, and the relay turns each event
/// into a best-effort `push`.
pub struct NotificationRelay {
    dispatcher: PushDispatcher,
}

impl NotificationRelay {
    pub fn new(dispatcher: PushDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Run the forwarding loop.
    ///
    /// Consumes events from `receiver` until the bus is dropped. Lagged
    /// events are lost, consistent with best-effort delivery everywhere
    /// else in the gateway.
    pub async fn run(self, mut receiver: broadcast::Receiver<NotificationCreated>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let attempted = self
                        .dispatcher
                        .push(event.recipient, event.notification)
                        .await;
                    tracing::debug!(
                        user_id = event.recipient,
                        attempted,
                        "Relayed notification event"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification relay lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification relay shutting down");
                    break;
                }
            }
        }
    }
}
