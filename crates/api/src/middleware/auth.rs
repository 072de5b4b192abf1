//! The authorization gate.
//!
//! Every protected request funnels through [`authorize`]: extract the bearer
//! credential, validate it, check the session against the revocation store,
//! then check the role. The ordering matters -- authentication failures
//! (401) are decided before authorization failures (403), so a caller with a
//! bad credential never learns whether their role would have sufficed.

use std::time::Duration;

use axum::http::{header, request::Parts};

use assetdesk_core::error::CoreError;
use assetdesk_core::principal::Principal;
use assetdesk_core::roles::Role;

use crate::auth::jwt::{validate_access_token, JwtConfig};
use crate::auth::revocation::RevocationStore;

/// Pull the raw `Authorization` header value out of request parts.
///
/// Returns `None` when the header is absent or not valid UTF-8; format
/// errors (wrong scheme) are left for [`authorize`] to report.
pub fn bearer_credential(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// Authorize a request: validate the credential, reject revoked sessions,
/// and enforce the role allow-list.
///
/// An empty `allowed_roles` slice means any authenticated user passes.
///
/// Credential problems (missing, malformed, expired, bad signature, revoked
/// session) all come back as [`CoreError::Unauthorized`]; only the final
/// role check produces [`CoreError::Forbidden`]. Validation failures beyond
/// the header format collapse into one generic message so the response never
/// reveals which check failed.
///
/// The revocation lookup is bounded by `revocation_timeout`; a store error
/// or timeout counts as revoked. A slow or down store therefore locks the
/// API rather than waving revoked sessions through.
pub async fn authorize(
    raw_credential: Option<&str>,
    allowed_roles: &[Role],
    jwt: &JwtConfig,
    store: &dyn RevocationStore,
    revocation_timeout: Duration,
) -> Result<Principal, CoreError> {
    let raw = raw_credential
        .ok_or_else(|| CoreError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = raw.strip_prefix("Bearer ").ok_or_else(|| {
        CoreError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".to_string())
    })?;

    let principal = validate_access_token(token, jwt).map_err(|err| {
        tracing::debug!(reason = %err, "Credential rejected");
        CoreError::Unauthorized("Invalid or expired credential".to_string())
    })?;

    if is_revoked_fail_closed(store, &principal.session_id, revocation_timeout).await {
        return Err(CoreError::Unauthorized(
            "Invalid or expired credential".to_string(),
        ));
    }

    if !allowed_roles.is_empty() && !allowed_roles.contains(&principal.role) {
        return Err(CoreError::Forbidden(
            "Insufficient role for this operation".to_string(),
        ));
    }

    Ok(principal)
}

/// Revocation lookup that treats every failure mode as "revoked". Shared
/// with the refresh flow, which checks its own token type.
pub(crate) async fn is_revoked_fail_closed(
    store: &dyn RevocationStore,
    session_id: &str,
    timeout: Duration,
) -> bool {
    match tokio::time::timeout(timeout, store.is_revoked(session_id)).await {
        Ok(Ok(revoked)) => revoked,
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "Revocation store error; treating session as revoked");
            true
        }
        Err(_) => {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "Revocation lookup timed out; treating session as revoked"
            );
            true
        }
    }
}
