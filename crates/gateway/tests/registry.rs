//! Unit tests for `ConnectionRegistry`.
//!
//! These tests exercise the connection table directly, without performing
//! any HTTP upgrades. They verify the one-entry-per-identity invariant,
//! idempotent removal, broadcast delivery, and shutdown behaviour.

use axum::extract::ws::Message;
use beacon_gateway::ws::protocol::CLOSE_POLICY_VIOLATION;
use beacon_gateway::ws::ConnectionRegistry;

// ---------------------------------------------------------------------------
// Test: new registry starts with zero connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_registry_has_zero_connections() {
    let registry = ConnectionRegistry::new();

    assert_eq!(registry.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: admit() registers the identity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admit_registers_identity() {
    let registry = ConnectionRegistry::new();

    let _admission = registry.admit(1).await;

    assert_eq!(registry.connection_count().await, 1);
    assert!(registry.is_connected(1).await);
    assert!(!registry.is_connected(2).await);
}

// ---------------------------------------------------------------------------
// Test: remove() is idempotent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_is_idempotent() {
    let registry = ConnectionRegistry::new();

    let _admission = registry.admit(1).await;
    assert_eq!(registry.connection_count().await, 1);

    registry.remove(1).await;
    assert_eq!(registry.connection_count().await, 0);

    // Removing again, and removing an identity that never connected,
    // are both no-ops.
    registry.remove(1).await;
    registry.remove(99).await;
    assert_eq!(registry.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: admitting the same identity twice replaces, never duplicates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_identity_replaces_previous_connection() {
    let registry = ConnectionRegistry::new();

    let mut old = registry.admit(7).await;
    assert_eq!(registry.connection_count().await, 1);

    // Re-admit without an explicit removal first.
    let mut new = registry.admit(7).await;
    assert_eq!(registry.connection_count().await, 1);

    // The replaced connection is explicitly closed with the policy code.
    let msg = old.receiver.recv().await.expect("old rx should get Close");
    match msg {
        Message::Close(Some(frame)) => assert_eq!(frame.code, CLOSE_POLICY_VIOLATION),
        other => panic!("Expected Close frame, got: {other:?}"),
    }

    // New connection receives subsequent sends.
    assert!(registry.send_to(7, Message::Text("hello".into())).await);
    let msg = new.receiver.recv().await.expect("new rx should receive");
    assert!(matches!(&msg, Message::Text(t) if t.as_str() == "hello"));
}

// ---------------------------------------------------------------------------
// Test: epoch-guarded removal cannot evict a replacement
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stale_epoch_removal_is_noop() {
    let registry = ConnectionRegistry::new();

    let old = registry.admit(7).await;
    let new = registry.admit(7).await;

    // The old connection's cleanup runs after the replacement was admitted.
    registry.remove_if_epoch(7, old.epoch).await;
    assert!(registry.is_connected(7).await, "replacement must survive");

    // The replacement's own cleanup still works.
    registry.remove_if_epoch(7, new.epoch).await;
    assert!(!registry.is_connected(7).await);
}

// ---------------------------------------------------------------------------
// Test: send_to() misses are not errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_absent_identity_returns_false() {
    let registry = ConnectionRegistry::new();

    assert!(!registry.send_to(42, Message::Text("anyone?".into())).await);
    assert_eq!(registry.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: broadcast() sends to all live connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_sends_to_all_connections() {
    let registry = ConnectionRegistry::new();

    let mut a1 = registry.admit(1).await;
    let mut a2 = registry.admit(2).await;
    let mut a3 = registry.admit(3).await;

    registry.broadcast(Message::Text("hello everyone".into())).await;

    for rx in [&mut a1.receiver, &mut a2.receiver, &mut a3.receiver] {
        let msg = rx.recv().await.expect("should receive broadcast");
        assert!(matches!(&msg, Message::Text(t) if t.as_str() == "hello everyone"));
    }
}

// ---------------------------------------------------------------------------
// Test: broadcast() skips closed channels without panicking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_skips_closed_channels() {
    let registry = ConnectionRegistry::new();

    let dead = registry.admit(1).await;
    let mut live = registry.admit(2).await;

    // Drop the first receiver to close its channel.
    drop(dead.receiver);

    registry.broadcast(Message::Text("still alive".into())).await;

    let msg = live.receiver.recv().await.expect("live rx should receive");
    assert!(matches!(&msg, Message::Text(t) if t.as_str() == "still alive"));
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears the table
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let registry = ConnectionRegistry::new();

    let mut a1 = registry.admit(1).await;
    let mut a2 = registry.admit(2).await;
    assert_eq!(registry.connection_count().await, 2);

    registry.shutdown_all().await;

    assert_eq!(registry.connection_count().await, 0);

    let msg1 = a1.receiver.recv().await.expect("rx1 should receive Close");
    assert!(matches!(msg1, Message::Close(None)));

    let msg2 = a2.receiver.recv().await.expect("rx2 should receive Close");
    assert!(matches!(msg2, Message::Close(None)));

    // After Close, the channels are closed (no more messages).
    assert!(a1.receiver.recv().await.is_none());
}
