//! Route definitions for the events resource.
//!
//! All endpoints require authentication; write methods are additionally
//! gated by privilege extractors in the handlers.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{events, events_duplicate, events_history, events_lock, events_workflow};
use crate::state::AppState;

/// Events routes mounted at `/events`.
///
/// ```text
/// POST   /                  -> create (single or recurring series)
/// GET    /                  -> list
/// GET    /{id}              -> get_by_id
/// PATCH  /{id}              -> update
/// DELETE /{id}              -> delete
/// POST   /{id}/lock         -> lock
/// GET    /{id}/lock         -> get_lock
/// POST   /{id}/unlock       -> unlock
/// POST   /{id}/spike        -> spike
/// POST   /{id}/unspike      -> unspike
/// POST   /{id}/publish      -> publish
/// POST   /{id}/cancel       -> cancel
/// POST   /{id}/reschedule   -> reschedule
/// POST   /{id}/postpone     -> postpone
/// POST   /{id}/duplicate    -> duplicate
/// GET    /{id}/history      -> get_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(events::create).get(events::list))
        .route(
            "/{id}",
            get(events::get_by_id)
                .patch(events::update)
                .delete(events::delete),
        )
        .route("/{id}/lock", post(events_lock::lock).get(events_lock::get_lock))
        .route("/{id}/unlock", post(events_lock::unlock))
        .route("/{id}/spike", post(events_workflow::spike))
        .route("/{id}/unspike", post(events_workflow::unspike))
        .route("/{id}/publish", post(events_workflow::publish))
        .route("/{id}/cancel", post(events_workflow::cancel))
        .route("/{id}/reschedule", post(events_workflow::reschedule))
        .route("/{id}/postpone", post(events_workflow::postpone))
        .route("/{id}/duplicate", post(events_duplicate::duplicate))
        .route("/{id}/history", get(events_history::get_history))
}
