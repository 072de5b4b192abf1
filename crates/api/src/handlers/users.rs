//! Handlers for the `/admin/users` resource.
//!
//! Accounts always land in the creating admin's location; there is no way
//! to provision a user for a location the admin does not manage.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use assetdesk_core::error::CoreError;
use assetdesk_core::roles::Role;
use assetdesk_db::models::user::CreateUser;
use assetdesk_db::repositories::UserRepo;

use crate::auth::password::{hash_password, validate_new_password};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/users`. The location is implied by the
/// acting admin and never client-supplied.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// POST /api/v1/admin/users
///
/// Create an account in the admin's own location. Admin only.
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let username = input.username.trim();
    if username.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Username must not be blank".into(),
        )));
    }
    validate_new_password(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // A duplicate username violates uq_users_username and classifies to 409.
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: username.to_string(),
            password_hash,
            role: input.role,
            location_id: admin.location_id,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        role = %input.role,
        created_by = admin.subject_id,
        "User created"
    );

    Ok((
        StatusCode::CREATED,
        DataResponse {
            data: user.to_response(),
        },
    ))
}

/// GET /api/v1/admin/users
///
/// List the admin's location's accounts, deactivated ones included. Admin only.
pub async fn list_users(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let users = UserRepo::list_by_location(&state.pool, admin.location_id).await?;
    let data: Vec<_> = users.iter().map(|u| u.to_response()).collect();

    Ok(DataResponse { data })
}
