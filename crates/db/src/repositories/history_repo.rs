//! Repository for the `item_history` table.

use sqlx::PgPool;

use pressroom_core::types::DbId;

use crate::models::history::{CreateHistory, HistoryEntry};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, item_kind, item_id, operation, update_json, user_id, created_at";

/// Provides append and query operations for the item history trail.
pub struct HistoryRepo;

impl HistoryRepo {
    /// Append a history entry, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateHistory) -> Result<HistoryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO item_history (item_kind, item_id, operation, update_json, user_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HistoryEntry>(&query)
            .bind(&input.item_kind)
            .bind(input.item_id)
            .bind(&input.operation)
            .bind(&input.update_json)
            .bind(input.user_id)
            .fetch_one(pool)
            .await
    }

    /// List history for one item, oldest first.
    pub async fn list_for_item(
        pool: &PgPool,
        item_kind: &str,
        item_id: DbId,
    ) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM item_history
             WHERE item_kind = $1 AND item_id = $2
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, HistoryEntry>(&query)
            .bind(item_kind)
            .bind(item_id)
            .fetch_all(pool)
            .await
    }
}
