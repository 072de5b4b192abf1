//! Assignment entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use assetdesk_core::error::CoreError;
use assetdesk_core::lifecycle::AssignmentState;
use assetdesk_core::types::{DbId, Timestamp};

/// An assignment row from the `assignments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Assignment {
    pub id: DbId,
    pub asset_id: DbId,
    pub assigned_to_user_id: DbId,
    pub assigned_by_user_id: DbId,
    pub assigned_date: NaiveDate,
    pub state: String,
    pub note: Option<String>,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Assignment {
    /// Parse the stored state column.
    pub fn state(&self) -> Result<AssignmentState, CoreError> {
        AssignmentState::parse(&self.state).ok_or_else(|| {
            CoreError::Internal(format!(
                "assignment {} has unknown state '{}'",
                self.id, self.state
            ))
        })
    }
}

/// An assignment joined with the display columns list endpoints need:
/// the asset's code/name and both usernames.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssignmentDetails {
    pub id: DbId,
    pub asset_id: DbId,
    pub asset_code: String,
    pub asset_name: String,
    pub assigned_to_user_id: DbId,
    pub assigned_to_username: String,
    pub assigned_by_user_id: DbId,
    pub assigned_by_username: String,
    pub assigned_date: NaiveDate,
    pub state: String,
    pub note: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new assignment. The assigning admin comes from the
/// authenticated principal, not the body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssignment {
    pub asset_id: DbId,
    pub assigned_to_user_id: DbId,
    pub assigned_date: NaiveDate,
    pub note: Option<String>,
}
