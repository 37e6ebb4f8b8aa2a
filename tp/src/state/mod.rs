//! State management with actor pattern
//!
//! StateManager owns the TaskStore and processes messages via channels,
//! providing thread-safe access to persistent state.

mod analytics;
mod manager;
mod messages;

pub use analytics::{Analytics, Overview};
pub use manager::StateManager;
pub use messages::{StateCommand, StateError, StateResponse};
