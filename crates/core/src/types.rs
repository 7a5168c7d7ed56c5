/// All database primary keys for accounts are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Notification records are keyed by UUID in the external store.
pub type NotificationId = uuid::Uuid;
