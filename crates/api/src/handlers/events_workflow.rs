//! Workflow transition handlers: spike, unspike, publish, cancel,
//! reschedule, postpone.
//!
//! Every operation follows the same shape: validate the transition against
//! the state table, check the item is not locked by another session, apply
//! the mutation, then notify the bus. Failures happen before any mutation.

use axum::extract::{Path, State};
use axum::Json;

use pressroom_core::error::CoreError;
use pressroom_core::locking::ItemKind;
use pressroom_core::workflow::{self, ItemState, WorkflowAction};
use pressroom_core::types::DbId;
use pressroom_db::models::event::{CancelRequest, Event, PostponeRequest, RescheduleRequest};
use pressroom_db::repositories::{EventRepo, PlanningRepo};
use pressroom_events::{event_types, ItemEvent};

use crate::error::{AppError, AppResult};
use crate::handlers::events::{ensure_not_locked_by_other, load_event};
use crate::middleware::auth::AuthUser;
use crate::middleware::privilege::{
    RequireEventManagement, RequireEventPublish, RequireEventSpike, RequireEventUnspike,
};
use crate::state::AppState;

/// Validate the transition table for the event's current state.
fn next_state(event: &Event, action: WorkflowAction) -> AppResult<ItemState> {
    let current = event.workflow_state().ok_or_else(|| {
        AppError::InternalError(format!(
            "Event {} has unknown state '{}'",
            event.id, event.state
        ))
    })?;
    workflow::apply(current, action).map_err(|msg| AppError::Core(CoreError::Validation(msg)))
}

/// Load, guard, validate, and apply a plain state flip.
async fn transition(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
    action: WorkflowAction,
    operation: &'static str,
    payload: serde_json::Value,
) -> AppResult<Event> {
    let event = load_event(state, id).await?;
    ensure_not_locked_by_other(&event, &user.session_id)?;
    let new_state = next_state(&event, action)?;

    let updated = EventRepo::set_state(&state.pool, id, new_state.as_str())
        .await?
        .ok_or(CoreError::NotFound { entity: "Event", id })?;

    state.event_bus.publish(
        ItemEvent::new(ItemKind::Events.as_str(), id, operation)
            .with_actor(user.user_id)
            .with_payload(payload),
    );

    tracing::info!(
        item_id = id,
        user_id = user.user_id,
        from = %event.state,
        to = %new_state,
        "Event {operation}"
    );
    Ok(updated)
}

/// POST /api/v1/events/{id}/spike
pub async fn spike(
    RequireEventSpike(user): RequireEventSpike,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Event>> {
    let updated = transition(
        &state,
        &user,
        id,
        WorkflowAction::Spike,
        event_types::SPIKED,
        serde_json::json!({}),
    )
    .await?;
    Ok(Json(updated))
}

/// POST /api/v1/events/{id}/unspike
pub async fn unspike(
    RequireEventUnspike(user): RequireEventUnspike,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Event>> {
    let updated = transition(
        &state,
        &user,
        id,
        WorkflowAction::Unspike,
        event_types::UNSPIKED,
        serde_json::json!({}),
    )
    .await?;
    Ok(Json(updated))
}

/// POST /api/v1/events/{id}/publish
pub async fn publish(
    RequireEventPublish(user): RequireEventPublish,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Event>> {
    let updated = transition(
        &state,
        &user,
        id,
        WorkflowAction::Publish,
        event_types::PUBLISHED,
        serde_json::json!({}),
    )
    .await?;
    Ok(Json(updated))
}

/// POST /api/v1/events/{id}/cancel
///
/// Cancelling also cancels linked planning items. With `cancel_all` on a
/// recurring occurrence, the whole series (and each occurrence's planning
/// items) is cancelled.
pub async fn cancel(
    RequireEventManagement(user): RequireEventManagement,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<CancelRequest>,
) -> AppResult<Json<Event>> {
    let payload = serde_json::to_value(&body)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    let updated = transition(
        &state,
        &user,
        id,
        WorkflowAction::Cancel,
        event_types::CANCELLED,
        payload,
    )
    .await?;

    // Cascade to coverage plans linked to this occurrence.
    PlanningRepo::cancel_for_event(&state.pool, id).await?;

    if body.cancel_all {
        if let Some(recurrence_id) = updated.recurrence_id {
            EventRepo::set_series_state(&state.pool, recurrence_id, ItemState::Cancelled.as_str())
                .await?;
            let series = EventRepo::list_series(&state.pool, recurrence_id).await?;
            for occurrence in series.iter().filter(|e| e.id != id) {
                PlanningRepo::cancel_for_event(&state.pool, occurrence.id).await?;
                state.event_bus.publish(
                    ItemEvent::new(
                        ItemKind::Events.as_str(),
                        occurrence.id,
                        event_types::CANCELLED,
                    )
                    .with_actor(user.user_id)
                    .with_payload(serde_json::json!({ "cascaded": true })),
                );
            }
            tracing::info!(
                item_id = id,
                %recurrence_id,
                occurrences = series.len(),
                "Cancelled recurring series"
            );
        }
    }

    Ok(Json(updated))
}

/// POST /api/v1/events/{id}/reschedule
pub async fn reschedule(
    RequireEventManagement(user): RequireEventManagement,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<RescheduleRequest>,
) -> AppResult<Json<Event>> {
    if body.ends_at <= body.starts_at {
        return Err(AppError::Core(CoreError::Validation(
            "ends_at must be after starts_at".into(),
        )));
    }

    let event = load_event(&state, id).await?;
    ensure_not_locked_by_other(&event, &user.session_id)?;
    let new_state = next_state(&event, WorkflowAction::Reschedule)?;

    let updated = EventRepo::reschedule(
        &state.pool,
        id,
        body.starts_at,
        body.ends_at,
        new_state.as_str(),
    )
    .await?
    .ok_or(CoreError::NotFound { entity: "Event", id })?;

    let payload = serde_json::to_value(&body)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    state.event_bus.publish(
        ItemEvent::new(ItemKind::Events.as_str(), id, event_types::RESCHEDULED)
            .with_actor(user.user_id)
            .with_payload(payload),
    );

    Ok(Json(updated))
}

/// POST /api/v1/events/{id}/postpone
pub async fn postpone(
    RequireEventManagement(user): RequireEventManagement,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<PostponeRequest>,
) -> AppResult<Json<Event>> {
    let payload = serde_json::to_value(&body)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    let updated = transition(
        &state,
        &user,
        id,
        WorkflowAction::Postpone,
        event_types::POSTPONED,
        payload,
    )
    .await?;
    Ok(Json(updated))
}
