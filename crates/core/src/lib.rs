//! Pure domain logic for the AssetDesk backend.
//!
//! This crate holds everything the HTTP and persistence layers agree on but
//! neither owns: the shared error taxonomy, role and principal types, and the
//! lifecycle state machines for assets, assignments, and returning requests.
//! No I/O, no async, no database types beyond the `DbId` alias.

pub mod error;
pub mod lifecycle;
pub mod principal;
pub mod roles;
pub mod types;
