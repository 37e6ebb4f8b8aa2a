//! Domain types for TaskPlanner
//!
//! Goal and Task implement the Record trait for TaskStore persistence.
//! CanonicalTask is the in-memory shape produced by the planning pipeline.

mod category;
mod goal;
mod id;
mod priority;
mod status;
mod task;

pub use category::{GoalCategory, TaskCategory};
pub use goal::{DEFAULT_DURATION_DAYS, Goal};
pub use id::generate_id;
pub use priority::Priority;
pub use status::{GoalStatus, TaskStatus};
pub use task::{CanonicalTask, MAX_ESTIMATED_HOURS, MIN_ESTIMATED_HOURS, Task, TaskUpdate, clamp_progress};

// Re-export taskstore types for convenience
pub use taskstore::{Filter, FilterOp, IndexValue, Record, Store};
