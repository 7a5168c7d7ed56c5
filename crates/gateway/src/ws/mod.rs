//! WebSocket infrastructure for real-time push delivery.
//!
//! Provides the connection registry, the per-connection protocol handler,
//! the push dispatcher, heartbeat monitoring, and the HTTP upgrade handler
//! used by Axum routes.

mod handler;
mod heartbeat;

pub mod dispatcher;
pub mod protocol;
pub mod registry;

pub use dispatcher::PushDispatcher;
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use registry::ConnectionRegistry;
