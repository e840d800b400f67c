//! Durable history recording.
//!
//! [`HistoryRecorder`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and writes every received [`ItemEvent`] to the
//! `item_history` table. It runs as a long-lived background task and shuts
//! down gracefully when the bus sender is dropped.
//!
//! Because the recorder is a single subscriber task, history rows appear in
//! publish order.

use tokio::sync::broadcast;

use pressroom_core::types::DbId;
use pressroom_db::models::history::CreateHistory;
use pressroom_db::repositories::HistoryRepo;
use pressroom_db::DbPool;

use crate::bus::ItemEvent;

/// Background service that persists item lifecycle events as history rows.
pub struct HistoryRecorder;

impl HistoryRecorder {
    /// Run the recording loop.
    ///
    /// Subscribes to the event bus via the provided `receiver` and persists
    /// every event it receives. The loop exits when the channel is closed
    /// (i.e. the [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<ItemEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::record(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event = %event.name(),
                            item_id = event.item_id,
                            "Failed to record history entry"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "History recorder lagged, some events were not recorded"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, history recorder shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event to the `item_history` table.
    async fn record(pool: &DbPool, event: &ItemEvent) -> Result<DbId, sqlx::Error> {
        let entry = CreateHistory {
            item_kind: event.item_kind.clone(),
            item_id: event.item_id,
            operation: event.operation.clone(),
            update_json: event.payload.clone(),
            user_id: event.actor_user_id,
        };
        HistoryRepo::create(pool, &entry).await.map(|row| row.id)
    }
}
