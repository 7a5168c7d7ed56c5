//! Shared helpers for the gateway integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use beacon_core::types::{DbId, NotificationId};
use beacon_gateway::auth::jwt::JwtConfig;
use beacon_gateway::config::ServerConfig;
use beacon_gateway::state::AppState;
use beacon_gateway::store::{GatewayStore, StoreError};
use beacon_gateway::ws::ConnectionRegistry;

/// Build a test `ServerConfig` with a known JWT secret and safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: test_jwt_config(),
    }
}

/// JWT config shared by token-minting helpers and the test server.
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-long-enough-for-hmac".to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Build an `AppState` over the given fake store, mirroring `main.rs`.
pub fn test_state(store: Arc<FakeStore>) -> AppState {
    AppState {
        config: Arc::new(test_config()),
        registry: Arc::new(ConnectionRegistry::new()),
        store,
    }
}

/// One notification record in the fake store.
pub struct FakeNotification {
    pub recipient: DbId,
    pub is_read: bool,
}

/// In-memory stand-in for the external relational store.
///
/// Accounts and notifications are plain maps; the `fail_*` flags force the
/// corresponding call to return `StoreError::Unavailable`, for exercising
/// the collaborator-failure paths.
#[derive(Default)]
pub struct FakeStore {
    accounts: Mutex<HashMap<DbId, bool>>,
    notifications: Mutex<HashMap<NotificationId, FakeNotification>>,
    pub fail_mark_read: AtomicBool,
    pub fail_unread_count: AtomicBool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account; `active = false` models a deactivated account.
    pub fn with_account(self, id: DbId, active: bool) -> Self {
        self.accounts.lock().unwrap().insert(id, active);
        self
    }

    /// Insert a notification record for `recipient`.
    pub fn add_notification(&self, id: NotificationId, recipient: DbId, is_read: bool) {
        self.notifications
            .lock()
            .unwrap()
            .insert(id, FakeNotification { recipient, is_read });
    }

    /// Read-state of a single record, for assertions.
    pub fn is_read(&self, id: NotificationId) -> bool {
        self.notifications
            .lock()
            .unwrap()
            .get(&id)
            .map(|n| n.is_read)
            .unwrap_or(false)
    }
}

#[async_trait]
impl GatewayStore for FakeStore {
    async fn account_is_active(&self, user_id: DbId) -> Result<bool, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(&user_id)
            .copied()
            .unwrap_or(false))
    }

    async fn unread_count(&self, user_id: DbId) -> Result<i64, StoreError> {
        if self.fail_unread_count.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("fake store offline".into()));
        }
        Ok(self
            .notifications
            .lock()
            .unwrap()
            .values()
            .filter(|n| n.recipient == user_id && !n.is_read)
            .count() as i64)
    }

    async fn mark_read(&self, user_id: DbId, ids: &[NotificationId]) -> Result<u64, StoreError> {
        if self.fail_mark_read.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("fake store offline".into()));
        }
        let mut notifications = self.notifications.lock().unwrap();
        let mut updated = 0;
        for id in ids {
            if let Some(n) = notifications.get_mut(id) {
                // Scoped to the caller's identity, exactly like the SQL.
                if n.recipient == user_id && !n.is_read {
                    n.is_read = true;
                    updated += 1;
                }
            }
        }
        Ok(updated)
    }
}
