//! Planning error types

use thiserror::Error;

use crate::llm::LlmError;
use crate::state::StateError;

/// Failures of the generation path
///
/// None of these reach the caller of `Decomposer::generate`; each one moves the
/// decomposition to the local fallback generator.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation service not configured: {0}")]
    MissingCredential(String),

    #[error("Generation service error: {0}")]
    Service(#[from] LlmError),

    #[error("No task array found in response: {0}")]
    Extraction(String),

    #[error("Task array is not valid JSON: {0}")]
    Parse(String),

    #[error("Failed to build prompt: {0}")]
    Prompt(String),
}

/// Errors surfaced by planning and plan management operations
#[derive(Debug, Error)]
pub enum PlanError {
    /// Bad caller input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced goal or task doesn't exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store rejected a write or read
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<StateError> for PlanError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::NotFound(what) => PlanError::NotFound(what),
            StateError::Validation(msg) => PlanError::Validation(msg),
            other => PlanError::Persistence(other.to_string()),
        }
    }
}
