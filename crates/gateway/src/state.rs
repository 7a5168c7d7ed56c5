use std::sync::Arc;

use crate::config::ServerConfig;
use crate::store::GatewayStore;
use crate::ws::ConnectionRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (bind address, CORS, JWT secret).
    pub config: Arc<ServerConfig>,
    /// The live connection table, owned by the gateway process and passed
    /// by reference into the protocol handler and push dispatcher.
    pub registry: Arc<ConnectionRegistry>,
    /// External collaborator calls (accounts, notification read-state).
    pub store: Arc<dyn GatewayStore>,
}
