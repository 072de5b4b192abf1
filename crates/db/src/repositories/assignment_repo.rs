//! Repository for the `assignments` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use assetdesk_core::lifecycle::AssignmentState;
use assetdesk_core::types::DbId;

use crate::models::assignment::{Assignment, AssignmentDetails, CreateAssignment};

/// Column list for plain `assignments` queries.
const COLUMNS: &str = "\
    id, asset_id, assigned_to_user_id, assigned_by_user_id, \
    assigned_date, state, note, is_deleted, created_at, updated_at";

/// Column list for joined queries (assignment `s`, asset `a`, users `ut`/`ub`).
const DETAIL_COLUMNS: &str = "\
    s.id, s.asset_id, a.code AS asset_code, a.name AS asset_name, \
    s.assigned_to_user_id, ut.username AS assigned_to_username, \
    s.assigned_by_user_id, ub.username AS assigned_by_username, \
    s.assigned_date, s.state, s.note, s.created_at, s.updated_at";

/// Join clause shared by the details queries.
const DETAIL_JOINS: &str = "\
    FROM assignments s \
    JOIN assets a ON a.id = s.asset_id \
    JOIN users ut ON ut.id = s.assigned_to_user_id \
    JOIN users ub ON ub.id = s.assigned_by_user_id";

/// Default page size for assignment listing.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for assignment listing.
const MAX_LIMIT: i64 = 100;

/// Provides CRUD and state-transition operations for assignments.
pub struct AssignmentRepo;

impl AssignmentRepo {
    /// Insert a new assignment in `waiting_for_acceptance`, returning the
    /// created row.
    ///
    /// A partial unique index rejects a second open assignment for the same
    /// asset, so a lost race surfaces as a unique violation rather than two
    /// open rows.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAssignment,
        assigned_by: DbId,
    ) -> Result<Assignment, sqlx::Error> {
        let query = format!(
            "INSERT INTO assignments (asset_id, assigned_to_user_id, assigned_by_user_id, assigned_date, note, state)
             VALUES ($1, $2, $3, $4, $5, 'waiting_for_acceptance')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(input.asset_id)
            .bind(input.assigned_to_user_id)
            .bind(assigned_by)
            .bind(input.assigned_date)
            .bind(input.note.as_deref())
            .fetch_one(pool)
            .await
    }

    /// Find an assignment by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Assignment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM assignments WHERE id = $1 AND is_deleted = false");
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an assignment by ID with display columns joined in.
    pub async fn find_details_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AssignmentDetails>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} {DETAIL_JOINS} \
             WHERE s.id = $1 AND s.is_deleted = false"
        );
        sqlx::query_as::<_, AssignmentDetails>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List assignments with an optional state filter, newest assigned date
    /// first. Excludes soft-deleted rows.
    pub async fn list(
        pool: &PgPool,
        state: Option<AssignmentState>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<AssignmentDetails>, sqlx::Error> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = offset.unwrap_or(0);
        let query = format!(
            "SELECT {DETAIL_COLUMNS} {DETAIL_JOINS} \
             WHERE s.is_deleted = false AND ($1::text IS NULL OR s.state = $1) \
             ORDER BY s.assigned_date DESC, s.id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, AssignmentDetails>(&query)
            .bind(state.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List a user's own open assignments (waiting or accepted) whose
    /// assigned date has arrived. Declined and returned assignments are
    /// history and stay out of this view.
    pub async fn list_open_for_user(
        pool: &PgPool,
        user_id: DbId,
        today: NaiveDate,
    ) -> Result<Vec<AssignmentDetails>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} {DETAIL_JOINS} \
             WHERE s.assigned_to_user_id = $1 \
               AND s.is_deleted = false \
               AND s.state IN ('waiting_for_acceptance', 'accepted') \
               AND s.assigned_date <= $2 \
             ORDER BY s.assigned_date DESC, s.id DESC"
        );
        sqlx::query_as::<_, AssignmentDetails>(&query)
            .bind(user_id)
            .bind(today)
            .fetch_all(pool)
            .await
    }

    /// Move an assignment from `from` to `to` in one guarded UPDATE.
    ///
    /// Returns `None` when the row is missing, soft-deleted, or no longer in
    /// `from` -- the caller turns that into an invalid-transition error by
    /// re-reading the current state.
    pub async fn update_state(
        pool: &PgPool,
        id: DbId,
        from: AssignmentState,
        to: AssignmentState,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!(
            "UPDATE assignments SET state = $3 \
             WHERE id = $1 AND state = $2 AND is_deleted = false \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an assignment that is still waiting or was declined.
    ///
    /// The state guard keeps a concurrent accept from racing the delete:
    /// accepted and returned rows are live history and are left untouched.
    /// Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE assignments SET is_deleted = true \
             WHERE id = $1 \
               AND is_deleted = false \
               AND state IN ('waiting_for_acceptance', 'declined')",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether an open assignment (waiting or accepted) references the asset.
    pub async fn has_open_for_asset(pool: &PgPool, asset_id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (\
                SELECT 1 FROM assignments \
                WHERE asset_id = $1 \
                  AND is_deleted = false \
                  AND state IN ('waiting_for_acceptance', 'accepted'))",
        )
        .bind(asset_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Whether ANY assignment row ever referenced the asset, soft-deleted
    /// ones included. Assets with assignment history cannot be deleted.
    pub async fn exists_for_asset(pool: &PgPool, asset_id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM assignments WHERE asset_id = $1)")
                .bind(asset_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}
