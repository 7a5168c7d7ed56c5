//! Admission gate for incoming connections.
//!
//! Runs before the transport upgrade: verify the token, then confirm the
//! account is active. Every failure maps to the same policy-violation close
//! so callers cannot probe which accounts exist.

use beacon_core::types::DbId;

use crate::auth::jwt::{validate_token, JwtConfig};
use crate::store::{GatewayStore, StoreError};

/// Why a connection attempt was refused.
///
/// The distinction exists for logging and tests only; all variants surface
/// to the client as an identical policy-violation close.
#[derive(Debug, thiserror::Error)]
pub enum AuthFailure {
    #[error("no token supplied")]
    MissingToken,

    #[error("token signature invalid or expired")]
    InvalidToken,

    #[error("account inactive or unknown")]
    InactiveAccount,

    /// The account lookup itself failed. Fail closed.
    #[error("account lookup failed: {0}")]
    LookupFailed(#[from] StoreError),
}

/// Verify a connection attempt, returning the authenticated identity.
///
/// Phase one decodes and verifies the signed token; phase two resolves the
/// subject claim against the account store. The connection must not be
/// admitted to the registry unless this returns `Ok`.
pub async fn authenticate<S: GatewayStore + ?Sized>(
    token: Option<&str>,
    config: &JwtConfig,
    store: &S,
) -> Result<DbId, AuthFailure> {
    let token = token.ok_or(AuthFailure::MissingToken)?;

    let claims = validate_token(token, config).map_err(|_| AuthFailure::InvalidToken)?;

    // Unknown accounts report as inactive, so the two are indistinguishable.
    if !store.account_is_active(claims.sub).await? {
        return Err(AuthFailure::InactiveAccount);
    }

    Ok(claims.sub)
}
