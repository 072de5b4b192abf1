//! Route definitions for returning requests.
//!
//! All routes are mounted under `/returning-requests`. Creation is not
//! here: assignees open requests via `/assignments/{id}/return-request`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::returns;
use crate::state::AppState;

/// Returning request routes mounted at `/returning-requests`.
///
/// ```text
/// GET  /               -> list_returning_requests (admin only)
/// POST /{id}/complete  -> complete_returning_request (admin only)
/// POST /{id}/cancel    -> cancel_returning_request (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(returns::list_returning_requests))
        .route("/{id}/complete", post(returns::complete_returning_request))
        .route("/{id}/cancel", post(returns::cancel_returning_request))
}
