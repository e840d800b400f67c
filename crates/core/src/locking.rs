//! Item-lock kernel: resource kinds, lock actions, the conflict policy for
//! relationship-linked items, and the lock error taxonomy.
//!
//! This module lives in `core` (zero internal deps) so the repository layer,
//! the lock service, and tests all share the same constants and predicate.
//! The lock itself is four nullable columns on the item row (`lock_user`,
//! `lock_session`, `lock_action`, `lock_time`); everything here is pure.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Resource kinds
// ---------------------------------------------------------------------------

/// The two lockable resource kinds. Events and planning items may reference
/// each other, which is what makes cross-kind lock validation necessary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Events,
    Planning,
}

impl ItemKind {
    /// The resource name used in URLs, history rows, and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Events => "events",
            ItemKind::Planning => "planning",
        }
    }

    /// The kind on the other side of the event <-> planning relationship.
    pub fn linked_kind(&self) -> ItemKind {
        match self {
            ItemKind::Events => ItemKind::Planning,
            ItemKind::Planning => ItemKind::Events,
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Lock actions
// ---------------------------------------------------------------------------

/// Known lock actions (the semantic reason a lock is held).
pub mod lock_actions {
    /// Plain editing session. The default when a lock request names no action.
    pub const EDIT: &str = "edit";
    /// An event is held open while a planning item is created from it.
    pub const ADD_TO_PLANNING: &str = "add_to_planning";
    pub const SPIKE: &str = "spike";
    pub const CANCEL: &str = "cancel";
    pub const RESCHEDULE: &str = "reschedule";
    pub const POSTPONE: &str = "postpone";
}

/// The set of lock actions accepted on a lock request.
pub const VALID_LOCK_ACTIONS: &[&str] = &[
    lock_actions::EDIT,
    lock_actions::ADD_TO_PLANNING,
    lock_actions::SPIKE,
    lock_actions::CANCEL,
    lock_actions::RESCHEDULE,
    lock_actions::POSTPONE,
];

/// Returns `true` if the given lock action is recognised.
pub fn is_valid_lock_action(action: &str) -> bool {
    VALID_LOCK_ACTIONS.contains(&action)
}

// ---------------------------------------------------------------------------
// Lock state
// ---------------------------------------------------------------------------

/// A snapshot of the lock columns on an item row. `None` everywhere means
/// the item is unlocked; the four fields are always set and cleared together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockState {
    pub lock_user: Option<DbId>,
    pub lock_session: Option<String>,
    pub lock_action: Option<String>,
    pub lock_time: Option<Timestamp>,
}

impl LockState {
    pub fn is_locked(&self) -> bool {
        self.lock_user.is_some()
    }

    /// Whether the given session currently holds this lock.
    pub fn held_by_session(&self, session_id: &str) -> bool {
        self.lock_session.as_deref() == Some(session_id)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures of the lock protocol. All are detected before any mutation and
/// surfaced to the HTTP layer untouched.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// The target item already carries a lock held by another session.
    #[error("Item is locked by user {user}")]
    AlreadyLocked { user: DbId },

    /// A relationship-linked item holds a conflicting lock.
    #[error("Linked {kind} item {id} is locked by user {user}")]
    LockConflict { kind: ItemKind, id: DbId, user: DbId },

    /// Unlock was requested on an item that carries no lock.
    #[error("Item is not locked")]
    NotLocked,

    /// Unlock was requested by a session that does not hold the lock and
    /// lacks the privileged unlock capability.
    #[error("Item is locked by another session")]
    NotLockOwner,
}

// ---------------------------------------------------------------------------
// Conflict policy
// ---------------------------------------------------------------------------

/// Decides which locks on relationship-linked items block a new lock.
///
/// The exact predicate is deployment policy, not a fixed rule: a linked
/// item's lock conflicts unless its `lock_action` appears in the exempt set.
/// The default exempts `add_to_planning`, so an event held open by a
/// planning-creation flow does not block locking the new planning item.
#[derive(Debug, Clone)]
pub struct LockPolicy {
    exempt_actions: HashSet<String>,
}

impl LockPolicy {
    /// A policy that treats every linked lock as a conflict.
    pub fn strict() -> Self {
        Self {
            exempt_actions: HashSet::new(),
        }
    }

    /// A policy exempting the given lock actions from the conflict check.
    pub fn with_exempt_actions<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exempt_actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if a linked item locked with `lock_action` blocks
    /// acquiring a lock on the current item.
    pub fn conflicts_with(&self, lock_action: Option<&str>) -> bool {
        match lock_action {
            Some(action) => !self.exempt_actions.contains(action),
            // Lock rows always carry an action; treat a missing one as
            // conflicting rather than silently exempting it.
            None => true,
        }
    }
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self::with_exempt_actions([lock_actions::ADD_TO_PLANNING])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_kind_round_trip() {
        assert_eq!(ItemKind::Events.as_str(), "events");
        assert_eq!(ItemKind::Planning.as_str(), "planning");
        assert_eq!(ItemKind::Events.linked_kind(), ItemKind::Planning);
        assert_eq!(ItemKind::Planning.linked_kind(), ItemKind::Events);
    }

    #[test]
    fn valid_lock_actions() {
        assert!(is_valid_lock_action("edit"));
        assert!(is_valid_lock_action("add_to_planning"));
        assert!(!is_valid_lock_action(""));
        assert!(!is_valid_lock_action("EDIT"));
        assert!(!is_valid_lock_action("delete"));
    }

    #[test]
    fn lock_state_ownership() {
        let unlocked = LockState::default();
        assert!(!unlocked.is_locked());
        assert!(!unlocked.held_by_session("s1"));

        let locked = LockState {
            lock_user: Some(7),
            lock_session: Some("s1".to_string()),
            lock_action: Some("edit".to_string()),
            lock_time: Some(chrono::Utc::now()),
        };
        assert!(locked.is_locked());
        assert!(locked.held_by_session("s1"));
        assert!(!locked.held_by_session("s2"));
    }

    #[test]
    fn strict_policy_conflicts_with_everything() {
        let policy = LockPolicy::strict();
        assert!(policy.conflicts_with(Some("edit")));
        assert!(policy.conflicts_with(Some("add_to_planning")));
        assert!(policy.conflicts_with(None));
    }

    #[test]
    fn default_policy_exempts_add_to_planning() {
        let policy = LockPolicy::default();
        assert!(policy.conflicts_with(Some("edit")));
        assert!(!policy.conflicts_with(Some("add_to_planning")));
    }

    #[test]
    fn custom_exemptions() {
        let policy = LockPolicy::with_exempt_actions(["edit"]);
        assert!(!policy.conflicts_with(Some("edit")));
        assert!(policy.conflicts_with(Some("spike")));
    }

    #[test]
    fn missing_action_conflicts() {
        let policy = LockPolicy::default();
        assert!(policy.conflicts_with(None));
    }
}
