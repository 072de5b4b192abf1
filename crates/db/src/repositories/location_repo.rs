//! Repository for the `locations` table (seeded reference data).

use sqlx::PgPool;

use crate::models::location::Location;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Read access to the seeded locations.
pub struct LocationRepo;

impl LocationRepo {
    /// List all locations ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Location>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locations ORDER BY name");
        sqlx::query_as::<_, Location>(&query).fetch_all(pool).await
    }
}
