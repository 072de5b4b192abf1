//! The authenticated identity attached to a request.

use crate::roles::Role;
use crate::types::DbId;

/// Verified identity reconstructed from credential claims on every request.
///
/// Immutable for the request's lifetime and never persisted -- the token
/// validator rebuilds it from scratch each time, so there is no session
/// state to desynchronize.
#[derive(Debug, Clone)]
pub struct Principal {
    /// The user's internal database id (from the `sub` claim).
    pub subject_id: DbId,
    /// The user's role, already validated against the known enum.
    pub role: Role,
    /// Opaque per-issuance session id (the `sid` claim). Revoking it
    /// invalidates every credential that carries it.
    pub session_id: String,
    /// The location the user belongs to; admins manage assets within it.
    pub location_id: DbId,
}
