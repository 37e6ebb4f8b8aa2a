//! Goal decomposition pipeline
//!
//! prompt -> generator -> normalizer -> persist, with the local fallback
//! templates standing in whenever generation fails. `Decomposer` drives it.

mod decomposer;
mod error;
pub mod fallback;
mod generator;
pub mod normalizer;
pub mod persist;
mod prompt;

pub use decomposer::{Decomposer, GenerateRequest, GenerationOutcome, MIN_GOAL_CHARS, Statistics, TaskSource};
pub use error::{GenerationError, PlanError};
pub use fallback::{FallbackTemplate, generate_fallback};
pub use generator::{GenerationClient, extract_task_array, parse_task_array};
pub use normalizer::{normalize_task, normalize_tasks};
pub use persist::{PersistedPlan, PlanStore, discard_goal, persist_plan};
pub use prompt::{PromptBuilder, PromptContext};
