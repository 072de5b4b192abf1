//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. State-changing methods use
//! guarded UPDATEs (`WHERE state = ...`) so concurrent transitions race at
//! the database, not in application code.

pub mod asset_repo;
pub mod assignment_repo;
pub mod category_repo;
pub mod location_repo;
pub mod returning_request_repo;
pub mod user_repo;

pub use asset_repo::AssetRepo;
pub use assignment_repo::AssignmentRepo;
pub use category_repo::CategoryRepo;
pub use location_repo::LocationRepo;
pub use returning_request_repo::ReturningRequestRepo;
pub use user_repo::UserRepo;
