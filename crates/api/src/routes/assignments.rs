//! Route definitions for assignments.
//!
//! All routes are mounted under `/assignments`. `/my` must be registered
//! alongside `/{id}` -- axum gives the literal segment priority, so both
//! can coexist.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::assignments;
use crate::state::AppState;

/// Assignment routes mounted at `/assignments`.
///
/// ```text
/// GET    /                     -> list_assignments (admin only)
/// POST   /                     -> create_assignment (admin only)
/// GET    /my                   -> my_assignments
/// DELETE /{id}                 -> delete_assignment (admin only)
/// POST   /{id}/accept          -> accept_assignment (assignee)
/// POST   /{id}/decline         -> decline_assignment (assignee)
/// POST   /{id}/return-request  -> request_return (assignee)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(assignments::list_assignments).post(assignments::create_assignment),
        )
        .route("/my", get(assignments::my_assignments))
        .route("/{id}", delete(assignments::delete_assignment))
        .route("/{id}/accept", post(assignments::accept_assignment))
        .route("/{id}/decline", post(assignments::decline_assignment))
        .route("/{id}/return-request", post(assignments::request_return))
}
