//! Repository for the `notifications` table.

use sqlx::PgPool;

use beacon_core::types::{DbId, NotificationId};

/// Provides operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Mark a batch of notifications as read.
    ///
    /// The UPDATE is scoped to `user_id`, so ids belonging to other users
    /// are silently skipped. Returns the number of rows updated.
    pub async fn mark_read_batch(
        pool: &PgPool,
        user_id: DbId,
        ids: &[NotificationId],
    ) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE id = ANY($1) AND user_id = $2 AND is_read = false",
        )
        .bind(ids)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Get the number of unread notifications for a user.
    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }
}
