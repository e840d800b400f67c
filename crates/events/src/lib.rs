//! Pressroom lifecycle-event infrastructure.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ItemEvent`] -- the canonical lifecycle event envelope emitted after
//!   every item mutation.
//! - [`HistoryRecorder`] -- background subscriber that durably writes every
//!   lifecycle event to the `item_history` table.

pub mod bus;
pub mod recorder;

pub use bus::{event_types, EventBus, ItemEvent};
pub use recorder::HistoryRecorder;
