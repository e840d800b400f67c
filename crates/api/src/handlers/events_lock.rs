//! Lock sub-resource handlers for events.
//!
//! Lock and unlock delegate to the [`LockService`](crate::locks::LockService);
//! the response wraps the updated item with a self link back to the base
//! resource.

use axum::extract::{Path, State};
use axum::Json;

use pressroom_core::locking::{lock_actions, ItemKind};
use pressroom_core::privileges::{privilege_names, role_has_privilege};
use pressroom_core::types::DbId;
use pressroom_db::models::event::{Event, LockRequest, UnlockRequest};
use pressroom_events::{event_types, ItemEvent};

use crate::error::AppResult;
use crate::handlers::events::load_event;
use crate::middleware::auth::AuthUser;
use crate::middleware::privilege::RequireEventManagement;
use crate::response::{DataResponse, LinkedResponse};
use crate::state::AppState;

/// POST /api/v1/events/{id}/lock
///
/// Acquire the item lock. Returns 409 when the item or a relationship-linked
/// planning item is already locked.
pub async fn lock(
    RequireEventManagement(user): RequireEventManagement,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<LockRequest>,
) -> AppResult<Json<LinkedResponse<Event>>> {
    let lock_action = body.lock_action.as_deref().unwrap_or(lock_actions::EDIT);

    let event = state
        .lock_service
        .lock_event(id, user.user_id, &user.session_id, lock_action)
        .await?;

    state.event_bus.publish(
        ItemEvent::new(ItemKind::Events.as_str(), id, event_types::LOCKED)
            .with_actor(user.user_id)
            .with_payload(serde_json::json!({ "lock_action": lock_action })),
    );

    Ok(Json(LinkedResponse::new(ItemKind::Events, id, event)))
}

/// GET /api/v1/events/{id}/lock
///
/// Read-only view of the lock sub-state.
pub async fn get_lock(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<pressroom_core::locking::LockState>>> {
    let event = load_event(&state, id).await?;
    Ok(Json(DataResponse {
        data: event.lock_state(),
    }))
}

/// POST /api/v1/events/{id}/unlock
///
/// Release the item lock. Any authenticated user may attempt; ownership is
/// enforced by the lock service, with the `unlock` privilege overriding it.
/// Unlocking one occurrence of a recurring series unlocks the whole series.
pub async fn unlock(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(_body): Json<UnlockRequest>,
) -> AppResult<Json<LinkedResponse<Event>>> {
    let privileged = role_has_privilege(&auth.role, privilege_names::UNLOCK);

    let event = state
        .lock_service
        .unlock_event(id, auth.user_id, &auth.session_id, privileged)
        .await?;

    state.event_bus.publish(
        ItemEvent::new(ItemKind::Events.as_str(), id, event_types::UNLOCKED)
            .with_actor(auth.user_id),
    );

    Ok(Json(LinkedResponse::new(ItemKind::Events, id, event)))
}
