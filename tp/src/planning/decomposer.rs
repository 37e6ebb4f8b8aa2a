//! Decomposer - goal text to a persisted task plan
//!
//! Runs the primary/fallback state machine and hands the normalized batch to
//! the persistence adapter. Generation failures never reach the caller; they
//! switch the request to the local templates.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::PlanError;
use super::fallback::generate_fallback;
use super::generator::GenerationClient;
use super::normalizer::normalize_tasks;
use super::persist::{PlanStore, persist_plan};
use super::prompt::PromptContext;
use crate::domain::{DEFAULT_DURATION_DAYS, Goal, GoalCategory, Priority, Task};

/// Shortest accepted goal text, after trimming
pub const MIN_GOAL_CHARS: usize = 5;

/// Caller input for one decomposition
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub goal_text: String,
    pub deadline: Option<DateTime<Utc>>,
    pub category: GoalCategory,
    pub priority: Priority,
    /// Days; defaults to a week
    pub estimated_duration: u32,
    pub budget: f64,
}

impl GenerateRequest {
    pub fn new(goal_text: impl Into<String>) -> Self {
        Self {
            goal_text: goal_text.into(),
            deadline: None,
            category: GoalCategory::default(),
            priority: Priority::default(),
            estimated_duration: DEFAULT_DURATION_DAYS,
            budget: 0.0,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_category(mut self, category: GoalCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_estimated_duration(mut self, days: u32) -> Self {
        self.estimated_duration = days;
        self
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = budget;
        self
    }

    /// Trimmed goal text, or a validation error if it's too short
    pub fn validated_text(&self) -> Result<&str, PlanError> {
        let text = self.goal_text.trim();
        if text.chars().count() < MIN_GOAL_CHARS {
            return Err(PlanError::Validation(format!(
                "Goal text must be at least {} characters",
                MIN_GOAL_CHARS
            )));
        }
        Ok(text)
    }
}

/// Where a plan's tasks came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskSource {
    Ai,
    Fallback,
}

impl std::fmt::Display for TaskSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ai => write!(f, "ai"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Decomposition state machine
#[derive(Debug)]
enum DecompositionState {
    Primary,
    Fallback,
    Done(TaskSource, Vec<Value>),
}

/// Timing and size of one decomposition
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total_tasks: usize,
    pub source: TaskSource,
    /// Time spent producing candidate tasks, both branches included
    pub generation_ms: u64,
    pub total_ms: u64,
}

/// Result of a decomposition; the same shape for both branches
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub success: bool,
    pub source: TaskSource,
    pub message: String,
    pub goal: Goal,
    pub tasks: Vec<Task>,
    pub statistics: Statistics,
    pub warnings: Vec<String>,
}

/// Turns goals into persisted plans
pub struct Decomposer {
    generator: GenerationClient,
    store: Arc<dyn PlanStore>,
}

impl Decomposer {
    pub fn new(generator: GenerationClient, store: Arc<dyn PlanStore>) -> Self {
        Self { generator, store }
    }

    /// Decompose a goal into tasks and persist both
    ///
    /// Fails only on invalid input or a store error.
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerationOutcome, PlanError> {
        debug!(goal_text = %request.goal_text, ?request.deadline, "Decomposer::generate: called");
        let started = Instant::now();
        let goal_text = request.validated_text()?.to_string();

        // title from the trimmed text, description exactly as given
        let goal = Goal::new(goal_text.clone())
            .with_description(request.goal_text.clone())
            .with_category(request.category)
            .with_priority(request.priority)
            .with_deadline(request.deadline)
            .with_estimated_duration(request.estimated_duration)
            .with_budget(request.budget)
            .with_ai_generated(true);
        self.store.create_goal(goal.clone()).await?;
        info!(goal_id = %goal.id, title = %goal.title, "Goal saved");

        let generation_started = Instant::now();
        let (source, raw) = self.decompose(&goal_text, &request).await;
        let generation_ms = generation_started.elapsed().as_millis() as u64;

        let batch = normalize_tasks(&raw, Utc::now());
        let plan = persist_plan(self.store.as_ref(), goal, &batch).await?;

        let total_ms = started.elapsed().as_millis() as u64;
        info!(
            goal_id = %plan.goal.id,
            %source,
            task_count = plan.tasks.len(),
            generation_ms,
            total_ms,
            "Task generation completed"
        );

        let message = match source {
            TaskSource::Ai => "Tasks generated successfully using AI",
            TaskSource::Fallback => "Tasks generated successfully (using fallback)",
        };

        Ok(GenerationOutcome {
            success: true,
            source,
            message: message.to_string(),
            statistics: Statistics {
                total_tasks: plan.tasks.len(),
                source,
                generation_ms,
                total_ms,
            },
            goal: plan.goal,
            tasks: plan.tasks,
            warnings: plan.warnings,
        })
    }

    /// Run primary then, if needed, fallback; no retries and no mixing
    async fn decompose(&self, goal_text: &str, request: &GenerateRequest) -> (TaskSource, Vec<Value>) {
        let mut state = DecompositionState::Primary;
        loop {
            debug!(?state, "Decomposer::decompose: state");
            state = match state {
                DecompositionState::Primary => {
                    let context = PromptContext::new(goal_text, request.deadline, request.category, request.priority);
                    match self.generator.generate(&context).await {
                        Ok(raw) => DecompositionState::Done(TaskSource::Ai, raw),
                        Err(e) => {
                            warn!(error = %e, "Generation failed, falling back to local templates");
                            DecompositionState::Fallback
                        }
                    }
                }
                DecompositionState::Fallback => {
                    let raw = generate_fallback(goal_text, request.deadline, Utc::now());
                    DecompositionState::Done(TaskSource::Fallback, raw)
                }
                DecompositionState::Done(source, raw) => return (source, raw),
            };
        }
    }
}
