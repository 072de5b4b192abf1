//! Handlers for the `/assets` resource.
//!
//! Reads and writes are scoped to the caller's location: assets elsewhere
//! read as 404 rather than 403, so one location cannot probe another's
//! inventory. The `state` reported everywhere is the EFFECTIVE state
//! (stored state, or `assigned` while an open assignment holds the asset).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use assetdesk_core::error::CoreError;
use assetdesk_core::lifecycle::{asset as asset_lifecycle, EffectiveState};
use assetdesk_core::types::DbId;
use assetdesk_db::models::asset::{AssetFilter, AssetWithState, CreateAsset, UpdateAsset};
use assetdesk_db::repositories::{AssetRepo, AssignmentRepo, CategoryRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Filter parameters for `GET /assets`.
#[derive(Debug, Deserialize)]
pub struct AssetListParams {
    /// Comma-separated effective states (`assigned` is legal here).
    pub state: Option<String>,
    pub category_id: Option<DbId>,
    /// Case-insensitive substring match against code and name.
    pub search: Option<String>,
}

/// Parse a comma-separated state filter into effective states.
fn parse_states(raw: &str) -> Result<Vec<EffectiveState>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            EffectiveState::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown asset state: {s}")))
        })
        .collect()
}

/// Load an asset visible to the caller's location, 404 otherwise.
async fn load_scoped_asset(
    pool: &sqlx::PgPool,
    id: DbId,
    location_id: DbId,
) -> AppResult<AssetWithState> {
    AssetRepo::find_with_state(pool, id)
        .await?
        .filter(|a| a.location_id == location_id)
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Asset", id }))
}

/// GET /api/v1/assets
///
/// List the caller's location's assets with optional filters.
pub async fn list_assets(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<AssetListParams>,
    Query(page): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let states = params
        .state
        .as_deref()
        .map(parse_states)
        .transpose()?
        .filter(|s| !s.is_empty());

    let filter = AssetFilter {
        states,
        category_id: params.category_id,
        search: params.search,
        limit: page.limit,
        offset: page.offset,
    };
    let assets = AssetRepo::search(&state.pool, principal.location_id, &filter).await?;
    let data = assets
        .iter()
        .map(AssetWithState::to_response)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DataResponse { data })
}

/// GET /api/v1/assets/{id}
///
/// Get one asset with its effective state resolved.
pub async fn get_asset(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let asset = load_scoped_asset(&state.pool, id, principal.location_id).await?;

    Ok(DataResponse {
        data: asset.to_response()?,
    })
}

/// POST /api/v1/assets
///
/// Register a new asset in the admin's location. Admin only. The code is
/// generated from the category prefix and never client-supplied.
pub async fn create_asset(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateAsset>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Asset name must not be blank".into(),
        )));
    }

    let category = CategoryRepo::find_by_id(&state.pool, input.category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: input.category_id,
        }))?;

    // Racing creates can both compute the same next code; uq_assets_code
    // then rejects the loser and the client simply retries.
    let code = AssetRepo::next_code(&state.pool, &category.code_prefix).await?;
    let created = AssetRepo::create(&state.pool, &input, &code, admin.location_id).await?;

    tracing::info!(
        asset_id = created.id,
        code = %created.code,
        name = %created.name,
        user_id = admin.subject_id,
        "Asset created"
    );

    // Re-read through the stateful view so the response carries the
    // category name and effective state like every other read.
    let asset = AssetRepo::find_with_state(&state.pool, created.id)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("asset {} vanished after insert", created.id)))?;

    Ok((
        StatusCode::CREATED,
        DataResponse {
            data: asset.to_response()?,
        },
    ))
}

/// PUT /api/v1/assets/{id}
///
/// Update an asset's editable fields. Admin only. Assigned assets cannot be
/// edited at all until they come back.
pub async fn update_asset(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAsset>,
) -> AppResult<impl IntoResponse> {
    let current = load_scoped_asset(&state.pool, id, admin.location_id).await?;

    if current.has_open_assignment {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Asset {} is assigned and cannot be edited",
            current.code
        ))));
    }
    if let Some(ref name) = input.name {
        if name.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Asset name must not be blank".into(),
            )));
        }
    }
    // State edits go through the lifecycle module like every other entity,
    // even though the stored set is flat.
    if let Some(next) = input.state {
        asset_lifecycle::edit_state(current.stored_state()?, next)?;
    }

    AssetRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Asset", id }))?;

    tracing::info!(asset_id = id, user_id = admin.subject_id, "Asset updated");

    let updated = load_scoped_asset(&state.pool, id, admin.location_id).await?;

    Ok(DataResponse {
        data: updated.to_response()?,
    })
}

/// DELETE /api/v1/assets/{id}
///
/// Soft-delete an asset. Admin only. Assets that ever appeared in an
/// assignment are history and cannot be deleted.
pub async fn delete_asset(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let current = load_scoped_asset(&state.pool, id, admin.location_id).await?;

    if AssignmentRepo::exists_for_asset(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Asset {} has assignment history and cannot be deleted",
            current.code
        ))));
    }

    if !AssetRepo::soft_delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Asset", id }));
    }

    tracing::info!(asset_id = id, code = %current.code, user_id = admin.subject_id, "Asset deleted");

    Ok(StatusCode::NO_CONTENT)
}
