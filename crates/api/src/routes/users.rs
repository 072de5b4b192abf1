//! Route definitions for admin account management.
//!
//! All routes are mounted under `/admin/users`.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Account management routes mounted at `/admin/users`.
///
/// ```text
/// GET  / -> list_users (admin only)
/// POST / -> create_user (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(users::list_users).post(users::create_user))
}
