pub mod events;
pub mod health;
pub mod planning;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /events      base resource, transition sub-resources, lock, history
/// /planning    planning items and their lock sub-resource
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/events", events::router())
        .nest("/planning", planning::router())
}
