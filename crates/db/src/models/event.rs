//! Event entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use pressroom_core::locking::LockState;
use pressroom_core::recurrence::RecurrenceRule;
use pressroom_core::types::{DbId, Timestamp};
use pressroom_core::workflow::ItemState;

/// An event row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub state: String,
    /// Shared by every occurrence of a recurring series.
    pub recurrence_id: Option<Uuid>,
    pub lock_user: Option<DbId>,
    pub lock_session: Option<String>,
    pub lock_action: Option<String>,
    pub lock_time: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Event {
    /// Snapshot of the lock columns for the lock kernel.
    pub fn lock_state(&self) -> LockState {
        LockState {
            lock_user: self.lock_user,
            lock_session: self.lock_session.clone(),
            lock_action: self.lock_action.clone(),
            lock_time: self.lock_time,
        }
    }

    /// Parse the `state` column. A row with an unknown state is a data error.
    pub fn workflow_state(&self) -> Option<ItemState> {
        ItemState::parse(&self.state)
    }
}

/// DTO for creating an event. A `recurrence_rule` expands the request into
/// one row per occurrence, all sharing a fresh `recurrence_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
    pub name: String,
    pub description: Option<String>,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub recurrence_rule: Option<RecurrenceRule>,
}

/// A single occurrence row to insert. Built by the handler from
/// [`CreateEvent`], one per expanded occurrence.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub recurrence_id: Option<Uuid>,
}

/// DTO for updating an event. All fields are optional. Serialized back out
/// as the history payload of the update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub name: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
}

/// Body of a lock request.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LockRequest {
    /// Semantic reason for the lock. Defaults to `"edit"`.
    pub lock_action: Option<String>,
}

/// Body of an unlock request. `lock_user` is advisory (the original client
/// sends it); ownership is decided from the authenticated session.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UnlockRequest {
    pub lock_user: Option<DbId>,
}

/// Body of a cancel request.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CancelRequest {
    pub reason: Option<String>,
    /// Cancel every occurrence in the recurring series, not just this one.
    #[serde(default)]
    pub cancel_all: bool,
}

/// Body of a reschedule request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub reason: Option<String>,
}

/// Body of a postpone request.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PostponeRequest {
    pub reason: Option<String>,
}
