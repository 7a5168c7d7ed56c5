//! Repository for the `users` table.

use sqlx::PgPool;

use beacon_core::types::DbId;

/// Provides read operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Check whether an account exists and is active.
    ///
    /// Returns `false` for unknown ids, so callers cannot distinguish a
    /// missing account from a deactivated one.
    pub async fn is_active(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(active.unwrap_or(false))
    }
}
