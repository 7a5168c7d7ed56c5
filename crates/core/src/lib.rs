//! Shared primitives for the Beacon notification platform.
//!
//! Scalar type aliases used across the db, events, and gateway crates.

pub mod types;
