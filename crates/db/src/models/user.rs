//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use assetdesk_core::error::CoreError;
use assetdesk_core::roles::Role;
use assetdesk_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub password_hash: String,
    /// Role name as text (`"admin"` or `"staff"`); parse via [`User::role`].
    pub role: String,
    pub location_id: DbId,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Parse the stored role column. A value outside the known set means the
    /// row was tampered with out of band; surface it as an internal error.
    pub fn role(&self) -> Result<Role, CoreError> {
        Role::parse(&self.role).ok_or_else(|| {
            CoreError::Internal(format!("user {} has unknown role '{}'", self.id, self.role))
        })
    }

    /// Safe representation for API responses.
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            username: self.username.clone(),
            role: self.role.clone(),
            location_id: self.location_id,
        }
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub role: String,
    pub location_id: DbId,
}

/// DTO for creating a new user. The password is hashed before this DTO is
/// built; plaintext never reaches the repository layer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub location_id: DbId,
}
