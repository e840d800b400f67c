//! The item lock service.
//!
//! Enforces single-writer-at-a-time semantics on events and planning items,
//! factoring in the event <-> planning relationship: locking one side is
//! rejected while the other side holds a conflicting lock.
//!
//! The service is constructed once at startup and injected into
//! [`AppState`](crate::state::AppState); handlers never resolve it
//! dynamically.
//!
//! Concurrency: relationship validation is re-run immediately before the
//! write, and the write itself is a conditional `UPDATE ... WHERE lock_user
//! IS NULL ... RETURNING` in the repository layer. That predicate is the
//! serialization point for the target item -- two concurrent lock attempts
//! can never both succeed. Staleness between the linked-item read and the
//! write is accepted; the window is a single statement wide.

use pressroom_core::error::CoreError;
use pressroom_core::locking::{is_valid_lock_action, ItemKind, LockError, LockPolicy, LockState};
use pressroom_core::types::DbId;
use pressroom_db::models::event::Event;
use pressroom_db::models::planning::PlanningItem;
use pressroom_db::repositories::{EventRepo, PlanningRepo};
use pressroom_db::DbPool;

use crate::error::{AppError, AppResult};

/// Per-item mutual exclusion across the two lockable resource kinds.
pub struct LockService {
    pool: DbPool,
    policy: LockPolicy,
}

impl LockService {
    pub fn new(pool: DbPool, policy: LockPolicy) -> Self {
        Self { pool, policy }
    }

    // -----------------------------------------------------------------------
    // Relationship validation
    // -----------------------------------------------------------------------

    /// Check whether any item linked to the given one holds a lock that
    /// conflicts with locking it. Read-only; fails with
    /// [`LockError::LockConflict`] naming the conflicting item.
    pub async fn validate_relationship_locks(&self, kind: ItemKind, id: DbId) -> AppResult<()> {
        match kind {
            ItemKind::Events => {
                let linked = PlanningRepo::find_by_event(&self.pool, id).await?;
                for item in linked {
                    self.check_linked(ItemKind::Planning, item.id, &item.lock_state())?;
                }
            }
            ItemKind::Planning => {
                let item = PlanningRepo::find_by_id(&self.pool, id)
                    .await?
                    .ok_or(CoreError::NotFound {
                        entity: "Planning item",
                        id,
                    })?;
                if let Some(event_id) = item.event_id {
                    if let Some(event) = EventRepo::find_by_id(&self.pool, event_id).await? {
                        self.check_linked(ItemKind::Events, event.id, &event.lock_state())?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_linked(&self, kind: ItemKind, id: DbId, lock: &LockState) -> Result<(), LockError> {
        if !lock.is_locked() {
            return Ok(());
        }
        if self.policy.conflicts_with(lock.lock_action.as_deref()) {
            return Err(LockError::LockConflict {
                kind,
                id,
                // is_locked() guarantees lock_user is present.
                user: lock.lock_user.unwrap_or_default(),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Acquire the lock on an event for the given user/session.
    pub async fn lock_event(
        &self,
        id: DbId,
        user_id: DbId,
        session_id: &str,
        lock_action: &str,
    ) -> AppResult<Event> {
        if !is_valid_lock_action(lock_action) {
            return Err(AppError::BadRequest(format!(
                "Unknown lock_action '{lock_action}'"
            )));
        }

        let event = EventRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Event", id })?;

        // Cheap pre-check for the common case; the conditional update below
        // is what actually serializes concurrent attempts.
        if let Some(holder) = event.lock_user {
            return Err(LockError::AlreadyLocked { user: holder }.into());
        }

        self.validate_relationship_locks(ItemKind::Events, id).await?;

        match EventRepo::acquire_lock(&self.pool, id, user_id, session_id, lock_action).await? {
            Some(locked) => {
                tracing::info!(
                    item_id = id,
                    user_id,
                    session_id,
                    lock_action,
                    "Event lock acquired"
                );
                Ok(locked)
            }
            None => {
                // A concurrent request won the conditional update.
                let holder = EventRepo::find_by_id(&self.pool, id)
                    .await?
                    .and_then(|e| e.lock_user);
                match holder {
                    Some(user) => Err(LockError::AlreadyLocked { user }.into()),
                    None => Err(AppError::InternalError(
                        "Lock acquisition failed but no holder found".into(),
                    )),
                }
            }
        }
    }

    /// Release the lock on an event.
    ///
    /// Only the owning session may unlock, unless `privileged` is set (the
    /// caller holds the `unlock` privilege). If the event belongs to a
    /// recurring series, every occurrence in the series is unlocked -- a
    /// deliberate widening of scope beyond the targeted item.
    pub async fn unlock_event(
        &self,
        id: DbId,
        user_id: DbId,
        session_id: &str,
        privileged: bool,
    ) -> AppResult<Event> {
        let event = EventRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Event", id })?;

        let lock = event.lock_state();
        if !lock.is_locked() {
            return Err(LockError::NotLocked.into());
        }
        if !lock.held_by_session(session_id) && !privileged {
            return Err(LockError::NotLockOwner.into());
        }

        let updated = match event.recurrence_id {
            Some(recurrence_id) => {
                let cleared =
                    EventRepo::release_series_locks(&self.pool, recurrence_id).await?;
                tracing::info!(
                    item_id = id,
                    %recurrence_id,
                    cleared,
                    "Unlocked all occurrences in recurring series"
                );
                EventRepo::find_by_id(&self.pool, id)
                    .await?
                    .ok_or(CoreError::NotFound { entity: "Event", id })?
            }
            None => EventRepo::release_lock(&self.pool, id)
                .await?
                .ok_or(LockError::NotLocked)?,
        };

        tracing::info!(item_id = id, user_id, session_id, "Event lock released");
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Planning items
    // -----------------------------------------------------------------------

    /// Acquire the lock on a planning item for the given user/session.
    pub async fn lock_planning(
        &self,
        id: DbId,
        user_id: DbId,
        session_id: &str,
        lock_action: &str,
    ) -> AppResult<PlanningItem> {
        if !is_valid_lock_action(lock_action) {
            return Err(AppError::BadRequest(format!(
                "Unknown lock_action '{lock_action}'"
            )));
        }

        let item = PlanningRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Planning item",
                id,
            })?;

        if let Some(holder) = item.lock_user {
            return Err(LockError::AlreadyLocked { user: holder }.into());
        }

        self.validate_relationship_locks(ItemKind::Planning, id)
            .await?;

        match PlanningRepo::acquire_lock(&self.pool, id, user_id, session_id, lock_action).await? {
            Some(locked) => {
                tracing::info!(
                    item_id = id,
                    user_id,
                    session_id,
                    lock_action,
                    "Planning item lock acquired"
                );
                Ok(locked)
            }
            None => {
                let holder = PlanningRepo::find_by_id(&self.pool, id)
                    .await?
                    .and_then(|p| p.lock_user);
                match holder {
                    Some(user) => Err(LockError::AlreadyLocked { user }.into()),
                    None => Err(AppError::InternalError(
                        "Lock acquisition failed but no holder found".into(),
                    )),
                }
            }
        }
    }

    /// Release the lock on a planning item. Unlike events, planning items
    /// never cascade: there is no planning-item series.
    pub async fn unlock_planning(
        &self,
        id: DbId,
        user_id: DbId,
        session_id: &str,
        privileged: bool,
    ) -> AppResult<PlanningItem> {
        let item = PlanningRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Planning item",
                id,
            })?;

        let lock = item.lock_state();
        if !lock.is_locked() {
            return Err(LockError::NotLocked.into());
        }
        if !lock.held_by_session(session_id) && !privileged {
            return Err(LockError::NotLockOwner.into());
        }

        let updated = PlanningRepo::release_lock(&self.pool, id)
            .await?
            .ok_or(LockError::NotLocked)?;

        tracing::info!(item_id = id, user_id, session_id, "Planning item lock released");
        Ok(updated)
    }
}
