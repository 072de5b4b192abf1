use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
///
/// The revocation store is load-bearing here: the authorization gate fails
/// closed, so an unreachable store locks out every protected endpoint even
/// while the process itself is fine. Operators need to see that distinctly.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status: `ok` only when every dependency is reachable.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether the revocation store answers within its lookup budget.
    pub revocation_healthy: bool,
}

/// GET /health -- service, database, and revocation store health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = assetdesk_db::health_check(&state.pool).await.is_ok();

    let revocation_healthy = tokio::time::timeout(
        state.revocation_timeout(),
        state.revocation.is_revoked("health-probe"),
    )
    .await
    .map(|result| result.is_ok())
    .unwrap_or(false);

    let status = if db_healthy && revocation_healthy {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        revocation_healthy,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
