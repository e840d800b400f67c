//! Duplicate handler: copy an event into a fresh draft.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use pressroom_core::locking::ItemKind;
use pressroom_core::types::DbId;
use pressroom_db::models::event::{Event, NewEvent};
use pressroom_db::repositories::EventRepo;
use pressroom_events::{event_types, ItemEvent};

use crate::error::AppResult;
use crate::handlers::events::load_event;
use crate::middleware::privilege::RequireEventManagement;
use crate::state::AppState;

/// POST /api/v1/events/{id}/duplicate
///
/// The copy starts life as an independent draft: lock fields cleared, no
/// recurrence linkage, regardless of the source's state.
pub async fn duplicate(
    RequireEventManagement(user): RequireEventManagement,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<Event>)> {
    let source = load_event(&state, id).await?;

    let copy = EventRepo::create(
        &state.pool,
        &NewEvent {
            name: source.name.clone(),
            description: source.description.clone(),
            starts_at: source.starts_at,
            ends_at: source.ends_at,
            recurrence_id: None,
        },
    )
    .await?;

    state.event_bus.publish(
        ItemEvent::new(ItemKind::Events.as_str(), source.id, event_types::DUPLICATED)
            .with_actor(user.user_id)
            .with_payload(serde_json::json!({ "duplicate_id": copy.id })),
    );
    state.event_bus.publish(
        ItemEvent::new(ItemKind::Events.as_str(), copy.id, event_types::CREATED)
            .with_actor(user.user_id)
            .with_payload(serde_json::json!({ "duplicated_from": source.id })),
    );

    tracing::info!(
        source_id = source.id,
        duplicate_id = copy.id,
        user_id = user.user_id,
        "Duplicated event"
    );
    Ok((StatusCode::CREATED, Json(copy)))
}
