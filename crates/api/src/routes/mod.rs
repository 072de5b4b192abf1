pub mod assets;
pub mod assignments;
pub mod auth;
pub mod categories;
pub mod health;
pub mod returns;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          login (public)
/// /auth/refresh                        refresh (public)
/// /auth/logout                         logout (requires auth)
///
/// /admin/users                         list, create (admin only)
///
/// /categories                          list (auth), create (admin only)
///
/// /assets                              list, create (GET, POST)
/// /assets/{id}                         get, update, delete
///
/// /assignments                         list, create (admin only)
/// /assignments/my                      caller's open assignments (GET)
/// /assignments/{id}                    delete (admin only)
/// /assignments/{id}/accept             assignee accepts (POST)
/// /assignments/{id}/decline            assignee declines (POST)
/// /assignments/{id}/return-request     assignee requests return (POST)
///
/// /returning-requests                  list (admin only)
/// /returning-requests/{id}/complete    complete request (POST, admin only)
/// /returning-requests/{id}/cancel      cancel request (POST, admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (login, refresh, logout).
        .nest("/auth", auth::router())
        // Admin account management.
        .nest("/admin/users", users::router())
        // Asset categories (reference data + code prefixes).
        .nest("/categories", categories::router())
        // Asset inventory, scoped to the caller's location.
        .nest("/assets", assets::router())
        // Assignments: admin management + assignee actions.
        .nest("/assignments", assignments::router())
        // Returning requests: the admin settlement surface.
        .nest("/returning-requests", returns::router())
}
