//! History sub-resource handler.

use axum::extract::{Path, State};
use axum::Json;

use pressroom_core::locking::ItemKind;
use pressroom_core::types::DbId;
use pressroom_db::models::history::HistoryEntry;
use pressroom_db::repositories::HistoryRepo;

use crate::error::AppResult;
use crate::handlers::events::load_event;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/events/{id}/history
///
/// History rows for the item, oldest first.
pub async fn get_history(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    // 404 for unknown items rather than an empty list.
    load_event(&state, id).await?;

    let entries =
        HistoryRepo::list_for_item(&state.pool, ItemKind::Events.as_str(), id).await?;
    Ok(Json(entries))
}
