//! Handlers for the `/planning` resource: a minimal CRUD surface plus the
//! lock sub-resource shared with events through the same
//! [`LockService`](crate::locks::LockService).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use pressroom_core::error::CoreError;
use pressroom_core::locking::{lock_actions, ItemKind};
use pressroom_core::privileges::{privilege_names, role_has_privilege};
use pressroom_core::types::DbId;
use pressroom_db::models::event::{LockRequest, UnlockRequest};
use pressroom_db::models::planning::{CreatePlanning, PlanningItem};
use pressroom_db::repositories::{EventRepo, PlanningRepo};
use pressroom_events::{event_types, ItemEvent};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::privilege::RequirePlanningManagement;
use crate::response::LinkedResponse;
use crate::state::AppState;

/// POST /api/v1/planning
pub async fn create(
    RequirePlanningManagement(user): RequirePlanningManagement,
    State(state): State<AppState>,
    Json(input): Json<CreatePlanning>,
) -> AppResult<(StatusCode, Json<PlanningItem>)> {
    // A dangling event link is a request error, not a FK explosion later.
    if let Some(event_id) = input.event_id {
        EventRepo::find_by_id(&state.pool, event_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Event",
                id: event_id,
            })?;
    }

    let item = PlanningRepo::create(&state.pool, &input).await?;

    state.event_bus.publish(
        ItemEvent::new(ItemKind::Planning.as_str(), item.id, event_types::CREATED)
            .with_actor(user.user_id),
    );

    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/v1/planning
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PlanningItem>>> {
    let items = PlanningRepo::list(&state.pool).await?;
    Ok(Json(items))
}

/// GET /api/v1/planning/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PlanningItem>> {
    let item = PlanningRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Planning item",
            id,
        }))?;
    Ok(Json(item))
}

/// POST /api/v1/planning/{id}/lock
pub async fn lock(
    RequirePlanningManagement(user): RequirePlanningManagement,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<LockRequest>,
) -> AppResult<Json<LinkedResponse<PlanningItem>>> {
    let lock_action = body.lock_action.as_deref().unwrap_or(lock_actions::EDIT);

    let item = state
        .lock_service
        .lock_planning(id, user.user_id, &user.session_id, lock_action)
        .await?;

    state.event_bus.publish(
        ItemEvent::new(ItemKind::Planning.as_str(), id, event_types::LOCKED)
            .with_actor(user.user_id)
            .with_payload(serde_json::json!({ "lock_action": lock_action })),
    );

    Ok(Json(LinkedResponse::new(ItemKind::Planning, id, item)))
}

/// POST /api/v1/planning/{id}/unlock
pub async fn unlock(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(_body): Json<UnlockRequest>,
) -> AppResult<Json<LinkedResponse<PlanningItem>>> {
    let privileged = role_has_privilege(&auth.role, privilege_names::UNLOCK);

    let item = state
        .lock_service
        .unlock_planning(id, auth.user_id, &auth.session_id, privileged)
        .await?;

    state.event_bus.publish(
        ItemEvent::new(ItemKind::Planning.as_str(), id, event_types::UNLOCKED)
            .with_actor(auth.user_id),
    );

    Ok(Json(LinkedResponse::new(ItemKind::Planning, id, item)))
}
