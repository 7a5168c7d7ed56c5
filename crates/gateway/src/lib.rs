//! Beacon gateway server library.
//!
//! Exposes the building blocks (config, state, auth, store, WebSocket
//! infrastructure) so integration tests and the binary entrypoint can both
//! access them.

pub mod auth;
pub mod config;
pub mod relay;
pub mod router;
pub mod routes;
pub mod state;
pub mod store;
pub mod ws;
