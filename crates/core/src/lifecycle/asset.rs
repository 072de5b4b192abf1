//! Asset state handling.
//!
//! The four stored states form a flat set: any state may move to any other
//! through an explicit edit, since recycling/availability toggles are
//! administrative corrections rather than a strict workflow. "Assigned" is
//! deliberately NOT a stored state -- an asset is assigned iff an open
//! assignment references it, and [`EffectiveState`] is the computed view the
//! API reports. Keeping the derivation out of the `assets` table means there
//! is no second source of truth to drift from the assignments table.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Stored asset state, exactly as persisted in `assets.state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetState {
    Available,
    NotAvailable,
    WaitingForRecycling,
    Recycled,
}

impl AssetState {
    /// Return the state name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::NotAvailable => "not_available",
            Self::WaitingForRecycling => "waiting_for_recycling",
            Self::Recycled => "recycled",
        }
    }

    /// Parse a stored state string. Returns `None` for unknown values --
    /// including `"assigned"`, which can never be written.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "not_available" => Some(Self::NotAvailable),
            "waiting_for_recycling" => Some(Self::WaitingForRecycling),
            "recycled" => Some(Self::Recycled),
            _ => None,
        }
    }

    /// All valid stored state values.
    pub const ALL: &'static [&'static str] = &[
        "available",
        "not_available",
        "waiting_for_recycling",
        "recycled",
    ];
}

impl std::fmt::Display for AssetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply an explicit edit event that sets the stored state to `next`.
///
/// All stored-to-stored edits are legal (flat set, no ordering constraint);
/// the function exists so every state write in the service layer flows
/// through the lifecycle module, same as the other entities.
pub fn edit_state(_current: AssetState, next: AssetState) -> Result<AssetState, CoreError> {
    Ok(next)
}

/// The state a reader observes: the stored state, or `Assigned` when an open
/// assignment currently references the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveState {
    Available,
    NotAvailable,
    Assigned,
    WaitingForRecycling,
    Recycled,
}

impl EffectiveState {
    /// Compute the observable state from the stored state and whether an
    /// open assignment (waiting-for-acceptance or accepted) references the
    /// asset. The derivation is the only way `Assigned` comes into existence.
    pub fn derive(stored: AssetState, has_open_assignment: bool) -> Self {
        if has_open_assignment {
            return Self::Assigned;
        }
        match stored {
            AssetState::Available => Self::Available,
            AssetState::NotAvailable => Self::NotAvailable,
            AssetState::WaitingForRecycling => Self::WaitingForRecycling,
            AssetState::Recycled => Self::Recycled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::NotAvailable => "not_available",
            Self::Assigned => "assigned",
            Self::WaitingForRecycling => "waiting_for_recycling",
            Self::Recycled => "recycled",
        }
    }

    /// Parse an effective state name. Unlike [`AssetState::parse`] this
    /// accepts `"assigned"`, because list filters operate on what a reader
    /// observes rather than on what is stored.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "not_available" => Some(Self::NotAvailable),
            "assigned" => Some(Self::Assigned),
            "waiting_for_recycling" => Some(Self::WaitingForRecycling),
            "recycled" => Some(Self::Recycled),
            _ => None,
        }
    }

    /// Whether an asset observed in this state may be handed out in a new
    /// assignment. Assignability is decided on the effective state, so an
    /// asset tied up by an open assignment is not assignable even though
    /// its stored state still says available.
    pub fn is_assignable(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl std::fmt::Display for EffectiveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
