//! Request authorization.
//!
//! [`auth::authorize`] is the single decision point for every protected
//! request: credential validation, revocation lookup, and role check, in
//! that order. The [`rbac`] extractors (`RequireAuth`, `RequireAdmin`) wrap
//! it for handler signatures.

pub mod auth;
pub mod rbac;
