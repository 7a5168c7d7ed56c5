//! External collaborator calls behind a trait seam.
//!
//! The gateway touches the relational store for exactly three things:
//! account-status lookup during authentication, the unread count, and the
//! batch read-state update. Putting them behind [`GatewayStore`] lets the
//! protocol and gate logic run against fakes in tests.

use async_trait::async_trait;

use beacon_core::types::{DbId, NotificationId};
use beacon_db::repositories::{NotificationRepo, UserRepo};
use beacon_db::DbPool;

/// Failure of an external store call.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store was unreachable or refused the call.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The store operations the gateway consumes.
#[async_trait]
pub trait GatewayStore: Send + Sync {
    /// Whether the account exists and is active. Unknown ids are `false`.
    async fn account_is_active(&self, user_id: DbId) -> Result<bool, StoreError>;

    /// Number of unread notifications for the account.
    async fn unread_count(&self, user_id: DbId) -> Result<i64, StoreError>;

    /// Mark the given notifications as read, scoped to `user_id`.
    ///
    /// Ids that do not belong to `user_id` are skipped, never an error.
    /// Returns the number of rows updated.
    async fn mark_read(&self, user_id: DbId, ids: &[NotificationId]) -> Result<u64, StoreError>;
}

/// Postgres-backed store, delegating to the `beacon-db` repositories.
#[derive(Clone)]
pub struct PgGatewayStore {
    pool: DbPool,
}

impl PgGatewayStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GatewayStore for PgGatewayStore {
    async fn account_is_active(&self, user_id: DbId) -> Result<bool, StoreError> {
        Ok(UserRepo::is_active(&self.pool, user_id).await?)
    }

    async fn unread_count(&self, user_id: DbId) -> Result<i64, StoreError> {
        Ok(NotificationRepo::unread_count(&self.pool, user_id).await?)
    }

    async fn mark_read(&self, user_id: DbId, ids: &[NotificationId]) -> Result<u64, StoreError> {
        Ok(NotificationRepo::mark_read_batch(&self.pool, user_id, ids).await?)
    }
}
