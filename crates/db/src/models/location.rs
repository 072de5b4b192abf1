//! Location entity model.

use serde::Serialize;
use sqlx::FromRow;

use assetdesk_core::types::{DbId, Timestamp};

/// A location row from the `locations` table.
///
/// Locations are fixed reference data seeded by migration; there is no
/// create/update surface for them. Users and assets both belong to exactly
/// one location, and admins manage assets within their own.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Location {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
