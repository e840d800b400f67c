//! Repository for the `events` table.
//!
//! The lock acquire/release methods are single conditional
//! `UPDATE ... RETURNING` statements: the row predicate is the
//! serialization point, so two concurrent acquisitions of the same item can
//! never both succeed.

use sqlx::PgPool;
use uuid::Uuid;

use pressroom_core::types::{DbId, Timestamp};

use crate::models::event::{Event, NewEvent, UpdateEvent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, starts_at, ends_at, state, recurrence_id, \
                       lock_user, lock_session, lock_action, lock_time, \
                       created_at, updated_at";

/// Provides CRUD, lock, and workflow operations for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a single occurrence row, returning it.
    pub async fn create(pool: &PgPool, input: &NewEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events (name, description, starts_at, ends_at, recurrence_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.recurrence_id)
            .fetch_one(pool)
            .await
    }

    /// Find an event by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all events ordered by start date.
    pub async fn list(pool: &PgPool) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events ORDER BY starts_at, id");
        sqlx::query_as::<_, Event>(&query).fetch_all(pool).await
    }

    /// List every occurrence of a recurring series ordered by start date.
    pub async fn list_series(
        pool: &PgPool,
        recurrence_id: Uuid,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM events WHERE recurrence_id = $1 ORDER BY starts_at, id");
        sqlx::query_as::<_, Event>(&query)
            .bind(recurrence_id)
            .fetch_all(pool)
            .await
    }

    /// Update an event. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEvent,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                starts_at = COALESCE($4, starts_at),
                ends_at = COALESCE($5, ends_at),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .fetch_optional(pool)
            .await
    }

    /// Delete an event by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Lock state
    // -----------------------------------------------------------------------

    /// Attempt to acquire the item lock.
    ///
    /// The `lock_user IS NULL` predicate makes the read-check-write atomic:
    /// a `None` result means another session holds the lock.
    pub async fn acquire_lock(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        session_id: &str,
        lock_action: &str,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET
                lock_user = $2, lock_session = $3, lock_action = $4,
                lock_time = NOW(), updated_at = NOW()
             WHERE id = $1 AND lock_user IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(user_id)
            .bind(session_id)
            .bind(lock_action)
            .fetch_optional(pool)
            .await
    }

    /// Clear the lock columns on a single event.
    ///
    /// Returns `None` if the row does not exist or carries no lock.
    pub async fn release_lock(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET
                lock_user = NULL, lock_session = NULL, lock_action = NULL,
                lock_time = NULL, updated_at = NOW()
             WHERE id = $1 AND lock_user IS NOT NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Clear lock columns on every occurrence in a recurring series.
    /// Returns the number of rows that were locked.
    pub async fn release_series_locks(
        pool: &PgPool,
        recurrence_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE events SET
                lock_user = NULL, lock_session = NULL, lock_action = NULL,
                lock_time = NULL, updated_at = NOW()
             WHERE recurrence_id = $1 AND lock_user IS NOT NULL",
        )
        .bind(recurrence_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    // -----------------------------------------------------------------------
    // Workflow state
    // -----------------------------------------------------------------------

    /// Set the workflow state of a single event.
    pub async fn set_state(
        pool: &PgPool,
        id: DbId,
        state: &str,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET state = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(state)
            .fetch_optional(pool)
            .await
    }

    /// Set the workflow state of every occurrence in a series that is not
    /// already spiked. Returns the number of rows changed.
    pub async fn set_series_state(
        pool: &PgPool,
        recurrence_id: Uuid,
        state: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE events SET state = $2, updated_at = NOW()
             WHERE recurrence_id = $1 AND state <> 'spiked' AND state <> $2",
        )
        .bind(recurrence_id)
        .bind(state)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Apply new dates and mark the event rescheduled.
    pub async fn reschedule(
        pool: &PgPool,
        id: DbId,
        starts_at: Timestamp,
        ends_at: Timestamp,
        state: &str,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET starts_at = $2, ends_at = $3, state = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(starts_at)
            .bind(ends_at)
            .bind(state)
            .fetch_optional(pool)
            .await
    }
}
