//! Privilege catalog and role grants.
//!
//! Privileges gate the write methods of the event and planning resources.
//! Roles are coarse (admin / editor / journalist); the API layer enforces
//! privileges per route via extractors.

// ---------------------------------------------------------------------------
// Privilege names
// ---------------------------------------------------------------------------

/// Named privileges declared by the events subsystem.
pub mod privilege_names {
    /// Create and modify events, including locking them for edit.
    pub const EVENT_MANAGEMENT: &str = "event_management";
    /// Spike an event.
    pub const EVENT_SPIKE: &str = "event_spike";
    /// Unspike an event.
    pub const EVENT_UNSPIKE: &str = "event_unspike";
    /// Publish an event.
    pub const EVENT_PUBLISH: &str = "event_publish";
    /// Create and modify planning items, including locking them.
    pub const PLANNING_MANAGEMENT: &str = "planning_management";
    /// Unlock events and planning items held by other sessions.
    pub const UNLOCK: &str = "unlock";
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_JOURNALIST: &str = "journalist";

/// Returns `true` if `role` is granted `privilege`.
///
/// Admins hold everything. Editors hold everything except the privileged
/// cross-session unlock. Journalists can manage items and spike their own
/// work but cannot unspike, publish, or break locks.
pub fn role_has_privilege(role: &str, privilege: &str) -> bool {
    use privilege_names::*;

    match role {
        ROLE_ADMIN => true,
        ROLE_EDITOR => matches!(
            privilege,
            EVENT_MANAGEMENT
                | EVENT_SPIKE
                | EVENT_UNSPIKE
                | EVENT_PUBLISH
                | PLANNING_MANAGEMENT
        ),
        ROLE_JOURNALIST => matches!(privilege, EVENT_MANAGEMENT | EVENT_SPIKE | PLANNING_MANAGEMENT),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
