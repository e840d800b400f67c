//! Item history model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use pressroom_core::types::{DbId, Timestamp};

/// A row from the `item_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HistoryEntry {
    pub id: DbId,
    pub item_kind: String,
    pub item_id: DbId,
    pub operation: String,
    pub update_json: serde_json::Value,
    pub user_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for appending a history entry.
#[derive(Debug, Clone)]
pub struct CreateHistory {
    pub item_kind: String,
    pub item_id: DbId,
    pub operation: String,
    pub update_json: serde_json::Value,
    pub user_id: Option<DbId>,
}
