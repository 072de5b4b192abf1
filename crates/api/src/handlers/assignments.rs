//! Handlers for the `/assignments` resource.
//!
//! Admin endpoints cover the management surface (create, list, delete);
//! `/assignments/my` and the accept/decline/return-request actions are the
//! assignee's side. Everything that changes state goes through the
//! [`AssignmentCoordinator`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use assetdesk_core::lifecycle::AssignmentState;
use assetdesk_core::types::DbId;
use assetdesk_db::models::assignment::CreateAssignment;
use assetdesk_db::repositories::AssignmentRepo;

use crate::coordinator::AssignmentCoordinator;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Filter parameters for `GET /assignments`.
#[derive(Debug, Deserialize)]
pub struct AssignmentListParams {
    pub state: Option<String>,
}

/// POST /api/v1/assignments
///
/// Assign an asset to a user. Admin only.
pub async fn create_assignment(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateAssignment>,
) -> AppResult<impl IntoResponse> {
    let assignment = AssignmentCoordinator::create_assignment(&state.pool, &admin, &input).await?;

    Ok((StatusCode::CREATED, DataResponse { data: assignment }))
}

/// GET /api/v1/assignments
///
/// List assignments with an optional state filter. Admin only.
pub async fn list_assignments(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AssignmentListParams>,
    Query(page): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let filter = params
        .state
        .as_deref()
        .map(|s| {
            AssignmentState::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown assignment state: {s}")))
        })
        .transpose()?;

    let assignments = AssignmentRepo::list(&state.pool, filter, page.limit, page.offset).await?;

    Ok(DataResponse { data: assignments })
}

/// GET /api/v1/assignments/my
///
/// The caller's own open assignments whose assigned date has arrived.
pub async fn my_assignments(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let today = Utc::now().date_naive();
    let assignments =
        AssignmentRepo::list_open_for_user(&state.pool, principal.subject_id, today).await?;

    Ok(DataResponse { data: assignments })
}

/// POST /api/v1/assignments/{id}/accept
///
/// Assignee accepts a waiting assignment.
pub async fn accept_assignment(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let assignment = AssignmentCoordinator::accept(&state.pool, &principal, id).await?;

    Ok(DataResponse { data: assignment })
}

/// POST /api/v1/assignments/{id}/decline
///
/// Assignee declines a waiting assignment, freeing the asset.
pub async fn decline_assignment(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let assignment = AssignmentCoordinator::decline(&state.pool, &principal, id).await?;

    Ok(DataResponse { data: assignment })
}

/// POST /api/v1/assignments/{id}/return-request
///
/// Assignee asks to return their accepted assignment's asset.
pub async fn request_return(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = AssignmentCoordinator::request_return(&state.pool, &principal, id).await?;

    Ok((StatusCode::CREATED, DataResponse { data: request }))
}

/// DELETE /api/v1/assignments/{id}
///
/// Soft-delete an assignment that never went live. Admin only.
pub async fn delete_assignment(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    AssignmentCoordinator::delete_assignment(&state.pool, &admin, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
