//! Returning request state machine.
//!
//! ```text
//! WaitingForReturning --Complete--> Completed       (terminal)
//! WaitingForReturning --Cancel--> Cancelled         (terminal)
//! ```
//!
//! Completing a request also returns its assignment; cancelling leaves the
//! assignment accepted. Both pairings are the coordinator's job -- this
//! module only rules on the request's own state.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Stored returning request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturningState {
    WaitingForReturning,
    Completed,
    Cancelled,
}

impl ReturningState {
    /// Return the state name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WaitingForReturning => "waiting_for_returning",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a stored state string. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "waiting_for_returning" => Some(Self::WaitingForReturning),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// All valid state values.
    pub const ALL: &'static [&'static str] =
        &["waiting_for_returning", "completed", "cancelled"];

    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for ReturningState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events a returning request can receive. Both are admin actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturningEvent {
    Complete,
    Cancel,
}

impl ReturningEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        }
    }
}

/// Apply an event to a state, returning the next state or
/// [`CoreError::InvalidTransition`] for every illegal pair.
pub fn transition(
    current: ReturningState,
    event: ReturningEvent,
) -> Result<ReturningState, CoreError> {
    use ReturningEvent::*;
    use ReturningState::*;

    match (current, event) {
        (WaitingForReturning, Complete) => Ok(Completed),
        (WaitingForReturning, Cancel) => Ok(Cancelled),
        (from, ev) => Err(CoreError::InvalidTransition {
            entity: "ReturningRequest",
            from: from.as_str(),
            event: ev.as_str(),
        }),
    }
}
