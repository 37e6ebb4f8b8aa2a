//! Dependency Resolver / Persistence Adapter
//!
//! Writes a normalized batch under an existing goal in two passes. Pass 1
//! creates every task without dependencies and records title -> id. Pass 2
//! rewrites each task's dependency titles as ids. The map lives only for the
//! duration of one batch.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::error::PlanError;
use crate::domain::{CanonicalTask, Goal, Task};
use crate::state::{StateManager, StateResponse};

/// The writes the planner needs from a store
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn create_goal(&self, goal: Goal) -> StateResponse<String>;
    async fn update_goal(&self, goal: Goal) -> StateResponse<()>;
    async fn create_task(&self, task: Task) -> StateResponse<String>;
    async fn update_task(&self, task: Task) -> StateResponse<()>;
    /// Cascades to the goal's tasks
    async fn delete_goal(&self, id: &str) -> StateResponse<usize>;
}

#[async_trait]
impl PlanStore for StateManager {
    async fn create_goal(&self, goal: Goal) -> StateResponse<String> {
        StateManager::create_goal(self, goal).await
    }

    async fn update_goal(&self, goal: Goal) -> StateResponse<()> {
        StateManager::update_goal(self, goal).await
    }

    async fn create_task(&self, task: Task) -> StateResponse<String> {
        StateManager::create_task(self, task).await
    }

    async fn update_task(&self, task: Task) -> StateResponse<()> {
        StateManager::update_task(self, task).await
    }

    async fn delete_goal(&self, id: &str) -> StateResponse<usize> {
        StateManager::delete_goal(self, id).await
    }
}

/// A goal and its tasks as written to the store
#[derive(Debug, Clone)]
pub struct PersistedPlan {
    pub goal: Goal,
    /// In batch order, dependencies as task ids
    pub tasks: Vec<Task>,
    pub warnings: Vec<String>,
}

/// Persist a batch under `goal`, which must already be stored
///
/// Unknown or self-referencing dependency titles are dropped with a warning.
/// When two tasks share a title, references resolve to the later one. On any
/// store error the goal and whatever was written for it are deleted before the
/// error is returned.
pub async fn persist_plan(store: &dyn PlanStore, goal: Goal, batch: &[CanonicalTask]) -> Result<PersistedPlan, PlanError> {
    debug!(goal_id = %goal.id, task_count = batch.len(), "persist_plan: called");
    let goal_id = goal.id.clone();

    match write_batch(store, goal, batch).await {
        Ok(plan) => {
            info!(goal_id = %plan.goal.id, task_count = plan.tasks.len(), "Persisted plan");
            Ok(plan)
        }
        Err(e) => {
            warn!(%goal_id, error = %e, "Persisting plan failed, removing partial writes");
            discard_goal(store, &goal_id).await;
            Err(e)
        }
    }
}

/// Best-effort removal of a goal and its tasks
pub async fn discard_goal(store: &dyn PlanStore, goal_id: &str) {
    debug!(%goal_id, "discard_goal: called");
    match store.delete_goal(goal_id).await {
        Ok(deleted_tasks) => info!(%goal_id, deleted_tasks, "Removed partially persisted goal"),
        Err(e) => warn!(%goal_id, error = %e, "Failed to remove partially persisted goal"),
    }
}

async fn write_batch(store: &dyn PlanStore, mut goal: Goal, batch: &[CanonicalTask]) -> Result<PersistedPlan, PlanError> {
    let mut warnings = Vec::new();
    let mut tasks = Vec::with_capacity(batch.len());
    let mut title_to_id: HashMap<&str, String> = HashMap::new();

    // Pass 1: create tasks and collect title -> id mapping
    for canonical in batch {
        let task = Task::from_canonical(&goal.id, canonical);
        store.create_task(task.clone()).await?;

        if let Some(previous) = title_to_id.insert(canonical.title.as_str(), task.id.clone()) {
            debug!(title = %canonical.title, %previous, "write_batch: duplicate title");
            warnings.push(format!(
                "Duplicate task title '{}', dependencies resolve to the later task",
                canonical.title
            ));
        }
        tasks.push(task);
    }

    // Pass 2: resolve dependencies (title -> id)
    for (task, canonical) in tasks.iter_mut().zip(batch) {
        if canonical.dependencies.is_empty() {
            continue;
        }

        let mut resolved: Vec<String> = Vec::new();
        for dep_title in &canonical.dependencies {
            match title_to_id.get(dep_title.as_str()) {
                Some(dep_id) if *dep_id == task.id => {
                    warnings.push(format!("Task '{}' depends on itself, dropped", canonical.title));
                }
                Some(dep_id) => {
                    if !resolved.contains(dep_id) {
                        resolved.push(dep_id.clone());
                    }
                }
                None => {
                    warnings.push(format!(
                        "Task '{}' depends on unknown task '{}', dropped",
                        canonical.title, dep_title
                    ));
                }
            }
        }

        if !resolved.is_empty() {
            task.set_dependencies(resolved);
            store.update_task(task.clone()).await?;
        }
    }

    goal.set_task_count(tasks.len());
    store.update_goal(goal.clone()).await?;

    for warning in &warnings {
        warn!(goal_id = %goal.id, "{}", warning);
    }

    Ok(PersistedPlan { goal, tasks, warnings })
}
