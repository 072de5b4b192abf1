//! The two user roles known to the system.
//!
//! Roles are stored as text in the `users.role` column and embedded verbatim
//! in JWT claims; [`Role::parse`] is the single point that decides whether a
//! role string is legal, so an unknown role in a credential is rejected at
//! validation time rather than silently treated as unprivileged.

use serde::{Deserialize, Serialize};

/// User role. Admins manage assets and assignments; staff act on assignments
/// made to them (accept, decline, request return).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    /// Return the role name as stored in the database and in JWT claims.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
        }
    }

    /// Parse a role string. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "staff" => Some(Self::Staff),
            _ => None,
        }
    }

    /// All valid role values.
    pub const ALL: &'static [&'static str] = &["admin", "staff"];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
