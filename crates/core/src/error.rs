use crate::types::DbId;

/// Domain-level error taxonomy shared by every layer.
///
/// The API layer maps each variant to a stable error code and HTTP status;
/// nothing here carries transport or storage detail.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// An open returning request already exists for the assignment.
    ///
    /// Kept distinct from [`CoreError::Conflict`] so callers can detect the
    /// specific invariant violation (at most one open request per assignment).
    #[error("Assignment {assignment_id} already has an open returning request")]
    ConflictingOpenRequest { assignment_id: DbId },

    /// A lifecycle event was applied to a state that does not admit it.
    ///
    /// Never a silent no-op: repeating a terminal transition (for example
    /// completing an already-completed returning request) surfaces this.
    #[error("Invalid transition: {entity} in state '{from}' cannot handle '{event}'")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        event: &'static str,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
