//! Handlers for the `/categories` resource.
//!
//! Categories are append-only reference data: once one exists, its name and
//! prefix are frozen because generated asset codes embed the prefix.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use assetdesk_core::error::CoreError;
use assetdesk_db::models::category::CreateCategory;
use assetdesk_db::repositories::CategoryRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/categories
///
/// List all categories. Categories are global, not per-location.
pub async fn list_categories(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let categories = CategoryRepo::list(&state.pool).await?;

    Ok(DataResponse { data: categories })
}

/// POST /api/v1/categories
///
/// Create a category. Admin only. The prefix seeds asset code generation
/// (`LA` yields `LA000001`, `LA000002`, ...), so it must be exactly two
/// uppercase ASCII letters and is immutable once created.
pub async fn create_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCategory>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Category name must not be blank".into(),
        )));
    }
    if input.code_prefix.len() != 2
        || !input.code_prefix.chars().all(|c| c.is_ascii_uppercase())
    {
        return Err(AppError::Core(CoreError::Validation(
            "Code prefix must be exactly 2 uppercase letters".into(),
        )));
    }

    // Duplicate names and prefixes violate their uq_ constraints (409).
    let category = CategoryRepo::create(&state.pool, &input).await?;

    tracing::info!(
        category_id = category.id,
        name = %category.name,
        code_prefix = %category.code_prefix,
        created_by = admin.subject_id,
        "Category created"
    );

    Ok((StatusCode::CREATED, DataResponse { data: category }))
}
