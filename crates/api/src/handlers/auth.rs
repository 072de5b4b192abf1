//! Handlers for the `/auth` resource (login, refresh, logout).
//!
//! Tokens are stateless JWTs; nothing is persisted at login. Logout and
//! refresh rotation instead write the token's session id to the revocation
//! store, where the authorization gate checks it on every request.

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use assetdesk_core::error::CoreError;
use assetdesk_db::models::user::{User, UserResponse};
use assetdesk_db::repositories::UserRepo;

use crate::auth::jwt::{
    issue_access_token, issue_refresh_token, validate_claims, TOKEN_TYPE_REFRESH,
};
use crate::auth::password::verify_password;
use crate::auth::revocation::revocation_ttl;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::is_revoked_fail_closed;
use crate::middleware::rbac::RequireAuth;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Optional request body for `POST /auth/logout`. Passing the refresh token
/// lets the server revoke it alongside the access session.
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    // Unknown username and wrong password produce the same message, so the
    // response does not reveal which accounts exist.
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid username or password".into(),
            ))
        })?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        )));
    }

    let response = build_auth_response(&state, &user)?;

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for a new access + refresh pair. The old
/// refresh token's session is revoked, so each refresh token works once.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let claims = validate_claims(&input.refresh_token, TOKEN_TYPE_REFRESH, &state.config.jwt)
        .map_err(|_| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    if is_revoked_fail_closed(
        state.revocation.as_ref(),
        &claims.sid,
        state.revocation_timeout(),
    )
    .await
    {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid or expired refresh token".into(),
        )));
    }

    // Claims identify the user, but role and location come from the current
    // row, so account changes take effect at the next rotation.
    let user = UserRepo::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    // Rotation: burn the old refresh session before minting the new pair.
    state
        .revocation
        .revoke(
            &claims.sid,
            revocation_ttl(claims.exp, Utc::now().timestamp()),
        )
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to revoke session: {e}")))?;

    let response = build_auth_response(&state, &user)?;

    tracing::info!(user_id = user.id, "Refresh token rotated");

    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke the caller's access session, and the refresh session too when the
/// body carries the refresh token. Returns 204 No Content.
pub async fn logout(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    body: Option<Json<LogoutRequest>>,
) -> AppResult<StatusCode> {
    // The gate only hands over the principal, not the token's exp, so the
    // access session is revoked for the full configured lifetime -- an upper
    // bound on however long the token actually has left.
    let access_ttl = Duration::from_secs(state.config.jwt.access_token_expiry_secs().max(0) as u64);
    state
        .revocation
        .revoke(&principal.session_id, access_ttl)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to revoke session: {e}")))?;

    if let Some(Json(input)) = body {
        match validate_claims(&input.refresh_token, TOKEN_TYPE_REFRESH, &state.config.jwt) {
            Ok(claims) => {
                state
                    .revocation
                    .revoke(
                        &claims.sid,
                        revocation_ttl(claims.exp, Utc::now().timestamp()),
                    )
                    .await
                    .map_err(|e| {
                        AppError::InternalError(format!("Failed to revoke session: {e}"))
                    })?;
            }
            // An invalid refresh token cannot be used anyway; nothing to revoke.
            Err(err) => {
                tracing::debug!(reason = %err, "Ignoring invalid refresh token at logout");
            }
        }
    }

    tracing::info!(user_id = principal.subject_id, "User logged out");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Issue an access + refresh pair for the user and build the response.
fn build_auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let role = user.role()?;

    let access_token = issue_access_token(user.id, role, user.location_id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let refresh_token = issue_refresh_token(user.id, role, user.location_id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        expires_in: state.config.jwt.access_token_expiry_secs(),
        user: user.to_response(),
    })
}
