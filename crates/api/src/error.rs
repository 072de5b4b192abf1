//! HTTP error mapping.
//!
//! Every failure a handler can produce funnels through [`AppError`] and
//! renders as `{"error": <message>, "code": <CODE>}`. The `code` field is a
//! stable machine-readable discriminator clients branch on, so the set of
//! codes is part of the API contract. Messages on 5xx responses are replaced
//! with a generic line before they leave the process; the detail goes to the
//! log instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use assetdesk_core::error::CoreError;

/// Unified error type for everything the HTTP layer can fail with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Domain rule violations surfaced by `assetdesk_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Failures talking to PostgreSQL.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed input rejected before it reached the domain layer.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Broken expectations inside the API layer itself.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Shorthand for handler signatures.
pub type AppResult<T> = Result<T, AppError>;

/// Wire shape of every error response.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

/// A fully resolved error: the HTTP status plus the body to send.
struct Rejection {
    status: StatusCode,
    body: ErrorBody,
}

impl Rejection {
    fn new(status: StatusCode, code: &'static str, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                code,
            },
        }
    }

    /// The one shape all 5xx responses take. Callers log the real cause
    /// before constructing this; it must not appear in the body.
    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let rejection = match self {
            AppError::Core(core) => reject_core(core),
            AppError::Database(err) => reject_sqlx(&err),
            AppError::BadRequest(msg) => {
                Rejection::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                Rejection::internal()
            }
        };

        (rejection.status, Json(rejection.body)).into_response()
    }
}

/// Map a domain error onto the HTTP contract.
///
/// The conflict family keeps distinct codes (`CONFLICT`,
/// `CONFLICTING_OPEN_REQUEST`, `INVALID_TRANSITION`) even though all three
/// render as 409; clients pick their recovery path from the code.
fn reject_core(err: CoreError) -> Rejection {
    match err {
        CoreError::NotFound { entity, id } => Rejection::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => {
            Rejection::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
        }
        CoreError::Conflict(msg) => Rejection::new(StatusCode::CONFLICT, "CONFLICT", msg),
        CoreError::ConflictingOpenRequest { assignment_id } => Rejection::new(
            StatusCode::CONFLICT,
            "CONFLICTING_OPEN_REQUEST",
            format!("Assignment {assignment_id} already has an open returning request"),
        ),
        CoreError::InvalidTransition { entity, from, event } => Rejection::new(
            StatusCode::CONFLICT,
            "INVALID_TRANSITION",
            format!("{entity} in state '{from}' cannot handle '{event}'"),
        ),
        CoreError::Unauthorized(msg) => {
            Rejection::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
        }
        CoreError::Forbidden(msg) => Rejection::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            Rejection::internal()
        }
    }
}

/// Map a sqlx failure onto the HTTP contract.
///
/// `RowNotFound` becomes 404. A 23505 unique violation on one of our `uq_`
/// indexes becomes 409; the partial indexes behind the one-open-assignment
/// and one-open-request invariants surface here when two writers race.
/// Anything else is a server fault and reports as 500.
fn reject_sqlx(err: &sqlx::Error) -> Rejection {
    if matches!(err, sqlx::Error::RowNotFound) {
        return Rejection::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found");
    }

    if let sqlx::Error::Database(db_err) = err {
        // 23505 is PostgreSQL's unique_violation class.
        if db_err.code().as_deref() == Some("23505") {
            if let Some(constraint) = db_err.constraint().filter(|name| name.starts_with("uq_")) {
                return Rejection::new(
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
        }
    }

    tracing::error!(error = %err, "Database error");
    Rejection::internal()
}
