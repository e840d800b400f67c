//! Planning item model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use pressroom_core::locking::LockState;
use pressroom_core::types::{DbId, Timestamp};

/// A planning item row from the `planning_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlanningItem {
    pub id: DbId,
    pub slugline: String,
    pub description: Option<String>,
    /// The event this coverage plan is linked to, if any.
    pub event_id: Option<DbId>,
    pub state: String,
    pub lock_user: Option<DbId>,
    pub lock_session: Option<String>,
    pub lock_action: Option<String>,
    pub lock_time: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PlanningItem {
    /// Snapshot of the lock columns for the lock kernel.
    pub fn lock_state(&self) -> LockState {
        LockState {
            lock_user: self.lock_user,
            lock_session: self.lock_session.clone(),
            lock_action: self.lock_action.clone(),
            lock_time: self.lock_time,
        }
    }
}

/// DTO for creating a planning item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanning {
    pub slugline: String,
    pub description: Option<String>,
    pub event_id: Option<DbId>,
}
