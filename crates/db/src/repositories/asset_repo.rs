//! Repository for the `assets` table.
//!
//! Every read path that reports state joins against open assignments so the
//! caller sees the EFFECTIVE state; the stored column alone is not enough.

use sqlx::PgPool;

use assetdesk_core::types::DbId;

use crate::models::asset::{Asset, AssetFilter, AssetWithState, CreateAsset, UpdateAsset};

/// Column list for plain `assets` queries.
const COLUMNS: &str = "\
    id, code, name, specification, category_id, location_id, \
    state, installed_date, is_deleted, created_at, updated_at";

/// Column list for enriched queries (aliased table `a`, category `c`).
const DETAIL_COLUMNS: &str = "\
    a.id, a.code, a.name, a.specification, a.category_id, \
    c.name AS category_name, a.location_id, a.state, a.installed_date, \
    a.created_at, a.updated_at";

/// Subquery deciding whether an open assignment references asset `a`.
const OPEN_ASSIGNMENT: &str = "EXISTS (\
    SELECT 1 FROM assignments s \
    WHERE s.asset_id = a.id \
      AND s.is_deleted = false \
      AND s.state IN ('waiting_for_acceptance', 'accepted'))";

/// Default page size for asset listing.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for asset listing.
const MAX_LIMIT: i64 = 100;

/// Provides CRUD and derived-state queries for assets.
pub struct AssetRepo;

impl AssetRepo {
    /// Insert a new asset with a pre-generated code, returning the created
    /// row. The location is the acting admin's, never client-supplied.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAsset,
        code: &str,
        location_id: DbId,
    ) -> Result<Asset, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets (code, name, specification, category_id, location_id, state, installed_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(code)
            .bind(&input.name)
            .bind(input.specification.as_deref())
            .bind(input.category_id)
            .bind(location_id)
            .bind(input.state.as_str())
            .bind(input.installed_date)
            .fetch_one(pool)
            .await
    }

    /// Generate the next code for a category prefix: the highest existing
    /// numeric suffix plus one, zero-padded to six digits.
    ///
    /// Soft-deleted rows are included on purpose so codes are never reused.
    pub async fn next_code(pool: &PgPool, prefix: &str) -> Result<String, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(CAST(SUBSTRING(code FROM char_length($1) + 1) AS BIGINT)), 0) + 1 \
             FROM assets WHERE code LIKE $1 || '%'",
        )
        .bind(prefix)
        .fetch_one(pool)
        .await?;
        Ok(format!("{}{:06}", prefix, row.0))
    }

    /// Find an asset by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE id = $1 AND is_deleted = false");
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an asset by ID together with its category name and open-assignment
    /// flag. Excludes soft-deleted rows.
    pub async fn find_with_state(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AssetWithState>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}, {OPEN_ASSIGNMENT} AS has_open_assignment \
             FROM assets a \
             JOIN categories c ON c.id = a.category_id \
             WHERE a.id = $1 AND a.is_deleted = false"
        );
        sqlx::query_as::<_, AssetWithState>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List assets in a location with optional filters and pagination,
    /// ordered by code.
    ///
    /// The state filter applies to the EFFECTIVE state, so filtering on
    /// `assigned` matches assets whose stored state says available but
    /// which an open assignment currently ties up.
    pub async fn search(
        pool: &PgPool,
        location_id: DbId,
        params: &AssetFilter,
    ) -> Result<Vec<AssetWithState>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        // Build dynamic WHERE clauses.
        let mut conditions = vec![
            "a.location_id = $1".to_string(),
            "a.is_deleted = false".to_string(),
        ];
        let mut bind_idx = 2u32;

        if params.search.is_some() {
            // Same placeholder twice: one bind covers both columns.
            conditions.push(format!(
                "(a.code ILIKE ${bind_idx} OR a.name ILIKE ${bind_idx})"
            ));
            bind_idx += 1;
        }
        if params.category_id.is_some() {
            conditions.push(format!("a.category_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.states.is_some() {
            conditions.push(format!(
                "(CASE WHEN {OPEN_ASSIGNMENT} THEN 'assigned' ELSE a.state END) = ANY(${bind_idx})"
            ));
            bind_idx += 1;
        }

        let where_clause = conditions.join(" AND ");

        let query = format!(
            "SELECT {DETAIL_COLUMNS}, {OPEN_ASSIGNMENT} AS has_open_assignment \
             FROM assets a \
             JOIN categories c ON c.id = a.category_id \
             WHERE {where_clause} \
             ORDER BY a.code \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, AssetWithState>(&query).bind(location_id);

        // Bind dynamic parameters in order.
        if let Some(ref search) = params.search {
            q = q.bind(format!("%{search}%"));
        }
        if let Some(category_id) = params.category_id {
            q = q.bind(category_id);
        }
        if let Some(ref states) = params.states {
            let names: Vec<&str> = states.iter().map(|s| s.as_str()).collect();
            q = q.bind(names);
        }

        q = q.bind(limit).bind(offset);
        q.fetch_all(pool).await
    }

    /// Update an asset. Only non-`None` fields in `input` are applied; the
    /// code and category never change.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAsset,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!(
            "UPDATE assets SET
                name = COALESCE($2, name),
                specification = COALESCE($3, specification),
                installed_date = COALESCE($4, installed_date),
                state = COALESCE($5, state)
             WHERE id = $1 AND is_deleted = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.specification.as_deref())
            .bind(input.installed_date)
            .bind(input.state.map(|s| s.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an asset by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE assets SET is_deleted = true WHERE id = $1 AND is_deleted = false")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
