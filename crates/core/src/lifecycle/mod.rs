//! Lifecycle state machines for the three managed entities.
//!
//! Each submodule defines the entity's state enum, its event enum, and a pure
//! `transition(current, event)` function. All functions are total over the
//! (state, event) grid: every illegal pair returns
//! [`CoreError::InvalidTransition`](crate::error::CoreError::InvalidTransition)
//! instead of silently doing nothing, which is what makes a duplicated
//! complete/cancel detectable by clients retrying after a timeout.
//!
//! The service layer consults these functions before every write; no state
//! column is ever updated except through a value these functions returned.

pub mod asset;
pub mod assignment;
pub mod returning;

pub use asset::{AssetState, EffectiveState};
pub use assignment::{AssignmentEvent, AssignmentState};
pub use returning::{ReturningEvent, ReturningState};
