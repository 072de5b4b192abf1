//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Joined "details" structs where list endpoints need display columns
//!
//! Lifecycle state columns are stored as snake_case text and parsed into
//! the `assetdesk_core` enums at the edges; the accessors on each entity
//! struct do that parse.

pub mod asset;
pub mod assignment;
pub mod category;
pub mod location;
pub mod returning_request;
pub mod user;
