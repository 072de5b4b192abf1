//! Asset entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use assetdesk_core::error::CoreError;
use assetdesk_core::lifecycle::{AssetState, EffectiveState};
use assetdesk_core::types::{DbId, Timestamp};

/// An asset row from the `assets` table.
///
/// `state` holds the STORED state only -- `"assigned"` never appears here.
/// The observable state is computed per read; see [`AssetWithState`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Asset {
    pub id: DbId,
    /// Generated at creation from the category prefix; immutable afterwards.
    pub code: String,
    pub name: String,
    pub specification: Option<String>,
    pub category_id: DbId,
    pub location_id: DbId,
    pub state: String,
    pub installed_date: Option<NaiveDate>,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Asset {
    /// Parse the stored state column.
    pub fn stored_state(&self) -> Result<AssetState, CoreError> {
        AssetState::parse(&self.state).ok_or_else(|| {
            CoreError::Internal(format!(
                "asset {} has unknown state '{}'",
                self.id, self.state
            ))
        })
    }
}

/// An asset row enriched with its category name and whether an open
/// assignment currently references it. This is the shape every read path
/// uses, because the effective state cannot be known from the row alone.
#[derive(Debug, Clone, FromRow)]
pub struct AssetWithState {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub specification: Option<String>,
    pub category_id: DbId,
    pub category_name: String,
    pub location_id: DbId,
    pub state: String,
    pub installed_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub has_open_assignment: bool,
}

impl AssetWithState {
    /// Parse the stored state column.
    pub fn stored_state(&self) -> Result<AssetState, CoreError> {
        AssetState::parse(&self.state).ok_or_else(|| {
            CoreError::Internal(format!(
                "asset {} has unknown state '{}'",
                self.id, self.state
            ))
        })
    }

    /// The state a reader observes (stored state, or `assigned` while an
    /// open assignment references the asset).
    pub fn effective_state(&self) -> Result<EffectiveState, CoreError> {
        Ok(EffectiveState::derive(
            self.stored_state()?,
            self.has_open_assignment,
        ))
    }

    /// API-facing representation with the derived state resolved.
    pub fn to_response(&self) -> Result<AssetResponse, CoreError> {
        Ok(AssetResponse {
            id: self.id,
            code: self.code.clone(),
            name: self.name.clone(),
            specification: self.specification.clone(),
            category_id: self.category_id,
            category_name: self.category_name.clone(),
            location_id: self.location_id,
            state: self.effective_state()?,
            installed_date: self.installed_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// API-facing asset representation. `state` is the EFFECTIVE state.
#[derive(Debug, Clone, Serialize)]
pub struct AssetResponse {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub specification: Option<String>,
    pub category_id: DbId,
    pub category_name: String,
    pub location_id: DbId,
    pub state: EffectiveState,
    pub installed_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new asset. The code is generated server-side and the
/// location comes from the acting admin, so neither appears here.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAsset {
    pub name: String,
    pub specification: Option<String>,
    pub category_id: DbId,
    pub installed_date: Option<NaiveDate>,
    /// Initial stored state. Serde rejects `"assigned"` here because it is
    /// not a variant of [`AssetState`].
    pub state: AssetState,
}

/// DTO for updating an existing asset. All fields are optional; the code and
/// category are fixed at creation and cannot be changed.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAsset {
    pub name: Option<String>,
    pub specification: Option<String>,
    pub installed_date: Option<NaiveDate>,
    pub state: Option<AssetState>,
}

/// Filters for the asset list query. `states` filters on the EFFECTIVE
/// state, so `assigned` is a legal filter value even though it is never
/// stored.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    pub states: Option<Vec<EffectiveState>>,
    pub category_id: Option<DbId>,
    /// Case-insensitive substring match against code and name.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
