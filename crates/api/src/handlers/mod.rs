//! HTTP handlers, one module per resource.
//!
//! Handlers stay thin: extract, delegate to the coordinator or a repository,
//! wrap the result in [`DataResponse`](crate::response::DataResponse). The
//! lifecycle and permission rules live in `assetdesk_core` and the
//! coordinator, not here.

pub mod assets;
pub mod assignments;
pub mod auth;
pub mod categories;
pub mod returns;
pub mod users;
