//! Pressroom domain layer.
//!
//! Zero-internal-dependency building blocks shared by the persistence,
//! event, and API crates: common type aliases, the error taxonomy, the
//! item-lock kernel (actions, policy, errors), the workflow state machine
//! gating item transitions, the privilege catalog, and recurring-series
//! helpers.

pub mod error;
pub mod locking;
pub mod privileges;
pub mod recurrence;
pub mod types;
pub mod workflow;
