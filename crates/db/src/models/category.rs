//! Category entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use assetdesk_core::types::{DbId, Timestamp};

/// A category row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    /// Two-letter uppercase prefix asset codes are generated from
    /// (e.g. `LA` yields codes `LA000001`, `LA000002`, ...).
    pub code_prefix: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub code_prefix: String,
}
