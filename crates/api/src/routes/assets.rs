//! Route definitions for the asset inventory.
//!
//! All routes are mounted under `/assets`.

use axum::routing::get;
use axum::Router;

use crate::handlers::assets;
use crate::state::AppState;

/// Asset routes mounted at `/assets`.
///
/// ```text
/// GET    /     -> list_assets
/// POST   /     -> create_asset (admin only)
/// GET    /{id} -> get_asset
/// PUT    /{id} -> update_asset (admin only)
/// DELETE /{id} -> delete_asset (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::list_assets).post(assets::create_asset))
        .route(
            "/{id}",
            get(assets::get_asset)
                .put(assets::update_asset)
                .delete(assets::delete_asset),
        )
}
