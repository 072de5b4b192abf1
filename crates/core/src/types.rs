//! Primitive aliases shared by every layer.

/// Primary key type for every table (PostgreSQL BIGSERIAL). JWT subject
/// claims and path parameters parse into this, so it is a plain `i64` and
/// not a newtype.
pub type DbId = i64;

/// Instant in time. Stored as TIMESTAMPTZ; always UTC in memory. Calendar
/// fields like `assigned_date` are `chrono::NaiveDate` instead, since they
/// carry no clock.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
