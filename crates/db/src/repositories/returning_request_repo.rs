//! Repository for the `returning_requests` table.
//!
//! Completing a request also moves its assignment to `returned`; the pair of
//! guarded UPDATEs runs in one transaction so no reader ever observes a
//! completed request whose assignment is still accepted.

use chrono::NaiveDate;
use sqlx::PgPool;

use assetdesk_core::lifecycle::ReturningState;
use assetdesk_core::types::DbId;

use crate::models::assignment::Assignment;
use crate::models::returning_request::{ReturningRequest, ReturningRequestDetails};

/// Column list for `returning_requests` queries.
const REQUEST_COLUMNS: &str = "\
    id, assignment_id, requested_by_user_id, accepted_by_user_id, \
    return_date, state, is_deleted, created_at, updated_at";

/// Column list for `assignments` rows returned by the pairing transaction.
const ASSIGNMENT_COLUMNS: &str = "\
    id, asset_id, assigned_to_user_id, assigned_by_user_id, \
    assigned_date, state, note, is_deleted, created_at, updated_at";

/// Column list for joined admin-list queries (request `r`, assignment `s`,
/// asset `a`, users `ur`/`ua`).
const DETAIL_COLUMNS: &str = "\
    r.id, r.assignment_id, a.code AS asset_code, a.name AS asset_name, \
    s.assigned_date, ur.username AS requested_by_username, \
    ua.username AS accepted_by_username, r.return_date, r.state, r.created_at";

/// Default page size for request listing.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for request listing.
const MAX_LIMIT: i64 = 100;

/// Provides creation, listing, and the paired complete/cancel transitions
/// for returning requests.
pub struct ReturningRequestRepo;

impl ReturningRequestRepo {
    /// Insert a new request in `waiting_for_returning`, returning the
    /// created row.
    ///
    /// A partial unique index on `(assignment_id)` for waiting rows backs up
    /// the coordinator's open-request check: if two requests race, one
    /// insert fails with a unique violation.
    pub async fn create(
        pool: &PgPool,
        assignment_id: DbId,
        requested_by: DbId,
    ) -> Result<ReturningRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO returning_requests (assignment_id, requested_by_user_id, state)
             VALUES ($1, $2, 'waiting_for_returning')
             RETURNING {REQUEST_COLUMNS}"
        );
        sqlx::query_as::<_, ReturningRequest>(&query)
            .bind(assignment_id)
            .bind(requested_by)
            .fetch_one(pool)
            .await
    }

    /// Find a request by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ReturningRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {REQUEST_COLUMNS} FROM returning_requests \
             WHERE id = $1 AND is_deleted = false"
        );
        sqlx::query_as::<_, ReturningRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the open (waiting) request for an assignment, if one exists.
    /// The partial unique index guarantees at most one.
    pub async fn find_open_for_assignment(
        pool: &PgPool,
        assignment_id: DbId,
    ) -> Result<Option<ReturningRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {REQUEST_COLUMNS} FROM returning_requests \
             WHERE assignment_id = $1 \
               AND state = 'waiting_for_returning' \
               AND is_deleted = false"
        );
        sqlx::query_as::<_, ReturningRequest>(&query)
            .bind(assignment_id)
            .fetch_optional(pool)
            .await
    }

    /// List requests with an optional state filter, newest first. Excludes
    /// soft-deleted rows.
    pub async fn list(
        pool: &PgPool,
        state: Option<ReturningState>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ReturningRequestDetails>, sqlx::Error> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = offset.unwrap_or(0);
        let query = format!(
            "SELECT {DETAIL_COLUMNS} \
             FROM returning_requests r \
             JOIN assignments s ON s.id = r.assignment_id \
             JOIN assets a ON a.id = s.asset_id \
             JOIN users ur ON ur.id = r.requested_by_user_id \
             LEFT JOIN users ua ON ua.id = r.accepted_by_user_id \
             WHERE r.is_deleted = false AND ($1::text IS NULL OR r.state = $1) \
             ORDER BY r.created_at DESC, r.id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ReturningRequestDetails>(&query)
            .bind(state.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Complete a waiting request and return its assignment in one
    /// transaction: request -> `completed` (recording who accepted and the
    /// return date), assignment -> `returned`.
    ///
    /// Both UPDATEs are guarded on the expected current state. If either
    /// matches zero rows the transaction rolls back and `None` comes back --
    /// the request already moved, or the assignment was not accepted. At most
    /// one of two concurrent completions can win the first guard.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        accepted_by: DbId,
        return_date: NaiveDate,
    ) -> Result<Option<(ReturningRequest, Assignment)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE returning_requests \
             SET state = 'completed', accepted_by_user_id = $2, return_date = $3 \
             WHERE id = $1 AND state = 'waiting_for_returning' AND is_deleted = false \
             RETURNING {REQUEST_COLUMNS}"
        );
        let request = sqlx::query_as::<_, ReturningRequest>(&query)
            .bind(id)
            .bind(accepted_by)
            .bind(return_date)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(request) = request else {
            return Ok(None); // dropped tx rolls back
        };

        let query = format!(
            "UPDATE assignments SET state = 'returned' \
             WHERE id = $1 AND state = 'accepted' AND is_deleted = false \
             RETURNING {ASSIGNMENT_COLUMNS}"
        );
        let assignment = sqlx::query_as::<_, Assignment>(&query)
            .bind(request.assignment_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(assignment) = assignment else {
            return Ok(None);
        };

        tx.commit().await?;
        Ok(Some((request, assignment)))
    }

    /// Cancel a waiting request with a guarded UPDATE. The assignment is
    /// untouched and stays accepted.
    ///
    /// Returns `None` when the request already left `waiting_for_returning`.
    pub async fn cancel(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ReturningRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE returning_requests SET state = 'cancelled' \
             WHERE id = $1 AND state = 'waiting_for_returning' AND is_deleted = false \
             RETURNING {REQUEST_COLUMNS}"
        );
        sqlx::query_as::<_, ReturningRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
