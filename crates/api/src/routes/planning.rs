//! Route definitions for the planning resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::planning;
use crate::state::AppState;

/// Planning routes mounted at `/planning`.
///
/// ```text
/// POST /                -> create
/// GET  /                -> list
/// GET  /{id}            -> get_by_id
/// POST /{id}/lock       -> lock
/// POST /{id}/unlock     -> unlock
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(planning::create).get(planning::list))
        .route("/{id}", get(planning::get_by_id))
        .route("/{id}/lock", post(planning::lock))
        .route("/{id}/unlock", post(planning::unlock))
}
