//! Workflow states for events and planning items, and the transition table
//! gating the named lifecycle operations (spike, unspike, publish, cancel,
//! reschedule, postpone).
//!
//! Every operation validates the current state against this table before
//! mutating anything; an invalid transition is rejected with no side effects.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// Lifecycle state of an item. Stored as a lowercase string in the `state`
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Draft,
    Published,
    Spiked,
    Cancelled,
    Rescheduled,
    Postponed,
}

impl ItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemState::Draft => "draft",
            ItemState::Published => "published",
            ItemState::Spiked => "spiked",
            ItemState::Cancelled => "cancelled",
            ItemState::Rescheduled => "rescheduled",
            ItemState::Postponed => "postponed",
        }
    }

    /// Parse a state column value. Unknown strings are a data error.
    pub fn parse(s: &str) -> Option<ItemState> {
        match s {
            "draft" => Some(ItemState::Draft),
            "published" => Some(ItemState::Published),
            "spiked" => Some(ItemState::Spiked),
            "cancelled" => Some(ItemState::Cancelled),
            "rescheduled" => Some(ItemState::Rescheduled),
            "postponed" => Some(ItemState::Postponed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The named lifecycle operations exposed as transition sub-resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Spike,
    Unspike,
    Publish,
    Cancel,
    Reschedule,
    Postpone,
}

impl WorkflowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowAction::Spike => "spike",
            WorkflowAction::Unspike => "unspike",
            WorkflowAction::Publish => "publish",
            WorkflowAction::Cancel => "cancel",
            WorkflowAction::Reschedule => "reschedule",
            WorkflowAction::Postpone => "postpone",
        }
    }

    /// The state an item lands in after this action succeeds.
    pub fn target_state(&self) -> ItemState {
        match self {
            WorkflowAction::Spike => ItemState::Spiked,
            WorkflowAction::Unspike => ItemState::Draft,
            WorkflowAction::Publish => ItemState::Published,
            WorkflowAction::Cancel => ItemState::Cancelled,
            WorkflowAction::Reschedule => ItemState::Rescheduled,
            WorkflowAction::Postpone => ItemState::Postponed,
        }
    }
}

impl std::fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// Returns `true` if `action` may be applied to an item in `state`.
///
/// Spiked is a dead end except for unspike. Published items can still be
/// cancelled, rescheduled, or postponed; a postponed or rescheduled item can
/// be spiked once it is clear it will not run.
pub fn can_apply(state: ItemState, action: WorkflowAction) -> bool {
    use ItemState::*;
    use WorkflowAction::*;

    match action {
        Spike => matches!(state, Draft | Cancelled | Rescheduled | Postponed),
        Unspike => matches!(state, Spiked),
        Publish => matches!(state, Draft),
        Cancel => matches!(state, Draft | Published | Postponed),
        Reschedule => matches!(state, Draft | Published | Postponed),
        Postpone => matches!(state, Draft | Published),
    }
}

/// Validate a transition, producing the new state or a message describing
/// why the action is not allowed from the current state.
pub fn apply(state: ItemState, action: WorkflowAction) -> Result<ItemState, String> {
    if can_apply(state, action) {
        Ok(action.target_state())
    } else {
        Err(format!("Cannot {action} an item in state '{state}'"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
