//! TaskPlanner - turn a free-text goal into a persisted task plan
//!
//! A goal is sent to an OpenAI-compatible chat model, which is asked for a
//! JSON array of tasks. Whatever comes back is normalized into canonical
//! tasks, dependency titles are resolved to task IDs, and the goal and its
//! tasks are saved to TaskStore. If the model is unavailable or its answer
//! can't be parsed, a local template plan is used instead.
//!
//! # Modules
//!
//! - [`planning`] - Prompt building, generation, normalization, fallback and persistence
//! - [`state`] - Actor that owns the store, plus analytics
//! - [`domain`] - Goal, Task and their enums
//! - [`llm`] - LLM client trait and Chat Completions implementation
//! - [`prompts`] - `.pmt` template loading
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod llm;
pub mod planning;
pub mod prompts;
pub mod state;

pub use config::Config;
pub use domain::{Goal, Task, TaskUpdate};
pub use planning::{Decomposer, GenerateRequest, GenerationClient, GenerationOutcome, TaskSource};
pub use state::StateManager;
