//! Handlers for the `/returning-requests` resource (admin side).
//!
//! Assignees open requests through `/assignments/{id}/return-request`; this
//! module is where admins see and settle them. Completing a request returns
//! the assignment atomically; the paired write lives in the coordinator.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

use assetdesk_core::lifecycle::ReturningState;
use assetdesk_core::types::DbId;
use assetdesk_db::repositories::ReturningRequestRepo;

use crate::coordinator::AssignmentCoordinator;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Filter parameters for `GET /returning-requests`.
#[derive(Debug, Deserialize)]
pub struct ReturningListParams {
    pub state: Option<String>,
}

/// GET /api/v1/returning-requests
///
/// List returning requests with an optional state filter. Admin only.
pub async fn list_returning_requests(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ReturningListParams>,
    Query(page): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let filter = params
        .state
        .as_deref()
        .map(|s| {
            ReturningState::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown returning state: {s}")))
        })
        .transpose()?;

    let requests = ReturningRequestRepo::list(&state.pool, filter, page.limit, page.offset).await?;

    Ok(DataResponse { data: requests })
}

/// POST /api/v1/returning-requests/{id}/complete
///
/// Complete a waiting request: the asset is back, the assignment is
/// returned. Admin only.
pub async fn complete_returning_request(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (request, _assignment) =
        AssignmentCoordinator::complete_return(&state.pool, &admin, id).await?;

    Ok(DataResponse { data: request })
}

/// POST /api/v1/returning-requests/{id}/cancel
///
/// Cancel a waiting request; the assignment stays accepted. Admin only.
pub async fn cancel_returning_request(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = AssignmentCoordinator::cancel_return(&state.pool, &admin, id).await?;

    Ok(DataResponse { data: request })
}
