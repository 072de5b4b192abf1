//! Returning request entity model.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use assetdesk_core::error::CoreError;
use assetdesk_core::lifecycle::ReturningState;
use assetdesk_core::types::{DbId, Timestamp};

/// A returning request row from the `returning_requests` table.
///
/// `accepted_by_user_id` and `return_date` are set only when the request
/// completes; a cancelled request keeps both NULL.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReturningRequest {
    pub id: DbId,
    pub assignment_id: DbId,
    pub requested_by_user_id: DbId,
    pub accepted_by_user_id: Option<DbId>,
    pub return_date: Option<NaiveDate>,
    pub state: String,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ReturningRequest {
    /// Parse the stored state column.
    pub fn state(&self) -> Result<ReturningState, CoreError> {
        ReturningState::parse(&self.state).ok_or_else(|| {
            CoreError::Internal(format!(
                "returning request {} has unknown state '{}'",
                self.id, self.state
            ))
        })
    }
}

/// A returning request joined with the display columns the admin list needs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReturningRequestDetails {
    pub id: DbId,
    pub assignment_id: DbId,
    pub asset_code: String,
    pub asset_name: String,
    pub assigned_date: NaiveDate,
    pub requested_by_username: String,
    pub accepted_by_username: Option<String>,
    pub return_date: Option<NaiveDate>,
    pub state: String,
    pub created_at: Timestamp,
}
