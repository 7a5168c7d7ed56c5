//! In-process notification event bus.
//!
//! Producers anywhere in the process publish [`NotificationCreated`] events
//! on the [`EventBus`]; the gateway subscribes and pushes each event to the
//! recipient's live connection, if any.

pub mod bus;

pub use bus::{EventBus, NotificationCreated};
