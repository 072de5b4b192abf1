//! Role-gated extractors for handler signatures.
//!
//! Handlers declare their access requirement by taking one of these as an
//! argument; axum runs the authorization gate before the handler body ever
//! executes. Ordering in the handler signature does not matter -- extraction
//! happens before any request body is read.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use assetdesk_core::principal::Principal;
use assetdesk_core::roles::Role;

use crate::error::AppError;
use crate::middleware::auth::{authorize, bearer_credential};
use crate::state::AppState;

/// Any authenticated user. The wrapped [`Principal`] identifies the caller.
pub struct RequireAuth(pub Principal);

/// Admins only. Non-admin credentials are rejected with 403.
pub struct RequireAdmin(pub Principal);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let principal = authorize(
            bearer_credential(parts),
            &[],
            &state.config.jwt,
            state.revocation.as_ref(),
            state.revocation_timeout(),
        )
        .await?;
        Ok(Self(principal))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let principal = authorize(
            bearer_credential(parts),
            &[Role::Admin],
            &state.config.jwt,
            state.revocation.as_ref(),
            state.revocation_timeout(),
        )
        .await?;
        Ok(Self(principal))
    }
}
