//! Connection authentication.
//!
//! Split in two phases so token verification is testable without a live
//! socket: [`jwt`] validates the shared-secret token, [`gate`] combines it
//! with the account-status lookup into an admit/reject decision.

pub mod gate;
pub mod jwt;

pub use gate::{authenticate, AuthFailure};
