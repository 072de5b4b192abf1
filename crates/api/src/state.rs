use std::sync::Arc;
use std::time::Duration;

use crate::auth::revocation::RevocationStore;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: assetdesk_db::DbPool,
    /// Server configuration (JWT secrets, timeouts, CORS origins).
    pub config: Arc<ServerConfig>,
    /// Session revocation store consulted by the authorization gate.
    pub revocation: Arc<dyn RevocationStore>,
}

impl AppState {
    /// Budget for a single revocation lookup.
    pub fn revocation_timeout(&self) -> Duration {
        self.config.revocation_timeout()
    }
}
