//! HTTP route definitions.

pub mod health;
