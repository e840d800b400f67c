use std::sync::Arc;

use crate::config::ServerConfig;
use crate::locks::LockService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: pressroom_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Centralized event bus; handlers publish lifecycle events here.
    pub event_bus: Arc<pressroom_events::EventBus>,
    /// The item lock service, constructor-injected so every resource shares
    /// one policy.
    pub lock_service: Arc<LockService>,
}
