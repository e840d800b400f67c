//! Repository for the `planning_items` table.
//!
//! Lock acquire/release mirror the event repository: conditional
//! `UPDATE ... RETURNING` statements serialize concurrent attempts.

use sqlx::PgPool;

use pressroom_core::types::DbId;

use crate::models::planning::{CreatePlanning, PlanningItem};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, slugline, description, event_id, state, \
                       lock_user, lock_session, lock_action, lock_time, \
                       created_at, updated_at";

/// Provides CRUD and lock operations for planning items.
pub struct PlanningRepo;

impl PlanningRepo {
    /// Insert a new planning item, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePlanning,
    ) -> Result<PlanningItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO planning_items (slugline, description, event_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlanningItem>(&query)
            .bind(&input.slugline)
            .bind(&input.description)
            .bind(input.event_id)
            .fetch_one(pool)
            .await
    }

    /// Find a planning item by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PlanningItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM planning_items WHERE id = $1");
        sqlx::query_as::<_, PlanningItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all planning items, most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<PlanningItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM planning_items ORDER BY created_at DESC, id");
        sqlx::query_as::<_, PlanningItem>(&query)
            .fetch_all(pool)
            .await
    }

    /// List planning items linked to the given event.
    pub async fn find_by_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<PlanningItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM planning_items WHERE event_id = $1 ORDER BY id");
        sqlx::query_as::<_, PlanningItem>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Lock state
    // -----------------------------------------------------------------------

    /// Attempt to acquire the item lock; `None` means another session won.
    pub async fn acquire_lock(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        session_id: &str,
        lock_action: &str,
    ) -> Result<Option<PlanningItem>, sqlx::Error> {
        let query = format!(
            "UPDATE planning_items SET
                lock_user = $2, lock_session = $3, lock_action = $4,
                lock_time = NOW(), updated_at = NOW()
             WHERE id = $1 AND lock_user IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlanningItem>(&query)
            .bind(id)
            .bind(user_id)
            .bind(session_id)
            .bind(lock_action)
            .fetch_optional(pool)
            .await
    }

    /// Clear the lock columns. `None` if the row is missing or unlocked.
    pub async fn release_lock(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PlanningItem>, sqlx::Error> {
        let query = format!(
            "UPDATE planning_items SET
                lock_user = NULL, lock_session = NULL, lock_action = NULL,
                lock_time = NULL, updated_at = NOW()
             WHERE id = $1 AND lock_user IS NOT NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlanningItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Workflow state
    // -----------------------------------------------------------------------

    /// Set the workflow state of a planning item.
    pub async fn set_state(
        pool: &PgPool,
        id: DbId,
        state: &str,
    ) -> Result<Option<PlanningItem>, sqlx::Error> {
        let query = format!(
            "UPDATE planning_items SET state = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlanningItem>(&query)
            .bind(id)
            .bind(state)
            .fetch_optional(pool)
            .await
    }

    /// Cancel every planning item linked to the given event. Returns the
    /// number of rows changed.
    pub async fn cancel_for_event(pool: &PgPool, event_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE planning_items SET state = 'cancelled', updated_at = NOW()
             WHERE event_id = $1 AND state <> 'cancelled' AND state <> 'spiked'",
        )
        .bind(event_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
