//! Authentication building blocks: JWT issuance/validation, password
//! hashing, and the session revocation store.

pub mod jwt;
pub mod password;
pub mod revocation;
