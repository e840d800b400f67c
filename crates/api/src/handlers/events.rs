//! Handlers for the base `/events` resource.
//!
//! Creation expands a recurrence rule into one row per occurrence, all
//! sharing a fresh `recurrence_id`. Update and delete are rejected while
//! another session holds the item lock.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use pressroom_core::error::CoreError;
use pressroom_core::locking::{ItemKind, LockError};
use pressroom_core::types::DbId;
use pressroom_db::models::event::{CreateEvent, Event, NewEvent, UpdateEvent};
use pressroom_db::repositories::EventRepo;
use pressroom_events::{event_types, ItemEvent};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::privilege::RequireEventManagement;
use crate::state::AppState;

/// Reject a mutation while another session holds the item lock.
pub(crate) fn ensure_not_locked_by_other(event: &Event, session_id: &str) -> AppResult<()> {
    let lock = event.lock_state();
    if lock.is_locked() && !lock.held_by_session(session_id) {
        if let Some(user) = lock.lock_user {
            return Err(LockError::AlreadyLocked { user }.into());
        }
    }
    Ok(())
}

pub(crate) async fn load_event(state: &AppState, id: DbId) -> AppResult<Event> {
    EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Event", id }))
}

/// POST /api/v1/events
///
/// Creates one event, or -- when the body carries a `recurrence_rule` -- the
/// full series of occurrences. Always returns the created rows as an array.
pub async fn create(
    RequireEventManagement(user): RequireEventManagement,
    State(state): State<AppState>,
    Json(input): Json<CreateEvent>,
) -> AppResult<(StatusCode, Json<Vec<Event>>)> {
    if input.ends_at <= input.starts_at {
        return Err(AppError::Core(CoreError::Validation(
            "ends_at must be after starts_at".into(),
        )));
    }

    let occurrences = match &input.recurrence_rule {
        Some(rule) => {
            rule.validate()
                .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
            let recurrence_id = Uuid::new_v4();
            rule.expand(input.starts_at, input.ends_at)
                .into_iter()
                .map(|(starts_at, ends_at)| NewEvent {
                    name: input.name.clone(),
                    description: input.description.clone(),
                    starts_at,
                    ends_at,
                    recurrence_id: Some(recurrence_id),
                })
                .collect()
        }
        None => vec![NewEvent {
            name: input.name.clone(),
            description: input.description.clone(),
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            recurrence_id: None,
        }],
    };

    let mut created = Vec::with_capacity(occurrences.len());
    for occurrence in &occurrences {
        let event = EventRepo::create(&state.pool, occurrence).await?;
        state.event_bus.publish(
            ItemEvent::new(ItemKind::Events.as_str(), event.id, event_types::CREATED)
                .with_actor(user.user_id),
        );
        created.push(event);
    }

    tracing::info!(
        user_id = user.user_id,
        count = created.len(),
        "Created event(s)"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/events
pub async fn list(_auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Event>>> {
    let events = EventRepo::list(&state.pool).await?;
    Ok(Json(events))
}

/// GET /api/v1/events/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Event>> {
    let event = load_event(&state, id).await?;
    Ok(Json(event))
}

/// PATCH /api/v1/events/{id}
///
/// Rejected with 409 while another session holds the item lock.
pub async fn update(
    RequireEventManagement(user): RequireEventManagement,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEvent>,
) -> AppResult<Json<Event>> {
    let event = load_event(&state, id).await?;
    ensure_not_locked_by_other(&event, &user.session_id)?;

    let updated = EventRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound { entity: "Event", id })?;

    let payload = serde_json::to_value(&input)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    state.event_bus.publish(
        ItemEvent::new(ItemKind::Events.as_str(), id, event_types::UPDATED)
            .with_actor(user.user_id)
            .with_payload(payload),
    );

    Ok(Json(updated))
}

/// DELETE /api/v1/events/{id}
///
/// Rejected with 409 while another session holds the item lock.
pub async fn delete(
    RequireEventManagement(user): RequireEventManagement,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let event = load_event(&state, id).await?;
    ensure_not_locked_by_other(&event, &user.session_id)?;

    let deleted = EventRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "Event", id }));
    }

    state.event_bus.publish(
        ItemEvent::new(ItemKind::Events.as_str(), id, event_types::DELETED)
            .with_actor(user.user_id),
    );

    Ok(StatusCode::NO_CONTENT)
}
