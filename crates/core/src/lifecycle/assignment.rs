//! Assignment state machine.
//!
//! ```text
//! WaitingForAcceptance --Accept--> Accepted
//! WaitingForAcceptance --Decline--> Declined        (terminal)
//! Accepted --ReturnCompleted--> Returned            (terminal)
//! ```
//!
//! `ReturnCompleted` is only ever raised by the coordinator as the paired
//! side effect of a returning request reaching `Completed`; there is no
//! direct path to `Returned`.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Stored assignment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentState {
    WaitingForAcceptance,
    Accepted,
    Declined,
    Returned,
}

impl AssignmentState {
    /// Return the state name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WaitingForAcceptance => "waiting_for_acceptance",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Returned => "returned",
        }
    }

    /// Parse a stored state string. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "waiting_for_acceptance" => Some(Self::WaitingForAcceptance),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            "returned" => Some(Self::Returned),
            _ => None,
        }
    }

    /// All valid state values.
    pub const ALL: &'static [&'static str] = &[
        "waiting_for_acceptance",
        "accepted",
        "declined",
        "returned",
    ];

    /// An assignment is open while it still ties up its asset: not yet
    /// declined or returned. Open assignments are what make an asset's
    /// effective state `Assigned`.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::WaitingForAcceptance | Self::Accepted)
    }

    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Returned)
    }

    /// Whether an assignment in this state may be soft-deleted.
    ///
    /// Accepted assignments (and anything with returning history) are live
    /// history; deleting them would orphan the derived asset state.
    pub fn is_deletable(&self) -> bool {
        matches!(self, Self::WaitingForAcceptance | Self::Declined)
    }
}

impl std::fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events an assignment can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentEvent {
    /// Assignee takes the asset.
    Accept,
    /// Assignee refuses the asset.
    Decline,
    /// The paired returning request completed; raised by the coordinator only.
    ReturnCompleted,
}

impl AssignmentEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Decline => "decline",
            Self::ReturnCompleted => "return_completed",
        }
    }
}

/// Apply an event to a state, returning the next state or
/// [`CoreError::InvalidTransition`] for every illegal pair.
pub fn transition(
    current: AssignmentState,
    event: AssignmentEvent,
) -> Result<AssignmentState, CoreError> {
    use AssignmentEvent::*;
    use AssignmentState::*;

    match (current, event) {
        (WaitingForAcceptance, Accept) => Ok(Accepted),
        (WaitingForAcceptance, Decline) => Ok(Declined),
        (Accepted, ReturnCompleted) => Ok(Returned),
        (from, ev) => Err(CoreError::InvalidTransition {
            entity: "Assignment",
            from: from.as_str(),
            event: ev.as_str(),
        }),
    }
}

/// Upper bound on how far in the future an assignment may be dated.
pub const MAX_ASSIGNED_DATE_MONTHS: u32 = 12;

/// Validate that an assignment date falls within `[today, today + 1 year]`.
///
/// `today` is passed in by the caller so the check stays pure and testable.
pub fn validate_assigned_date(date: NaiveDate, today: NaiveDate) -> Result<(), CoreError> {
    if date < today {
        return Err(CoreError::Validation(format!(
            "Assigned date {date} is in the past"
        )));
    }
    let horizon = today + Months::new(MAX_ASSIGNED_DATE_MONTHS);
    if date > horizon {
        return Err(CoreError::Validation(format!(
            "Assigned date {date} is more than a year ahead (latest allowed: {horizon})"
        )));
    }
    Ok(())
}
