//! StateManager - actor that owns TaskStore
//!
//! Processes commands via channels for thread-safe access to persistent state.
//! Multi-record operations (cascade delete, dependency pruning) run inside the
//! actor so no other command interleaves with them.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::analytics::Analytics;
use super::messages::{StateCommand, StateError, StateResponse};
use crate::domain::{Filter, Goal, IndexValue, Store, Task, TaskStatus, TaskUpdate};

/// Handle to send commands to the StateManager
#[derive(Clone)]
pub struct StateManager {
    tx: mpsc::Sender<StateCommand>,
}

impl StateManager {
    /// Spawn a new StateManager actor
    pub fn spawn(store_path: impl AsRef<Path>) -> eyre::Result<Self> {
        debug!(store_path = %store_path.as_ref().display(), "spawn: called");
        let mut store = Store::open(store_path.as_ref())?;

        let goal_count = store.rebuild_indexes::<Goal>()?;
        let task_count = store.rebuild_indexes::<Task>()?;
        info!(goal_count, task_count, "Rebuilt indexes for Goal and Task records");

        let (tx, rx) = mpsc::channel(256);
        tokio::spawn(actor_loop(store, rx));

        info!("StateManager spawned");
        Ok(Self { tx })
    }

    // === Goal operations ===

    /// Create a new Goal record
    pub async fn create_goal(&self, goal: Goal) -> StateResponse<String> {
        debug!(goal_id = %goal.id, "create_goal: called");
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send(StateCommand::CreateGoal { goal, reply: reply_tx })
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    /// Get a Goal record by ID
    pub async fn get_goal(&self, id: &str) -> StateResponse<Option<Goal>> {
        debug!(%id, "get_goal: called");
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send(StateCommand::GetGoal {
                id: id.to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    /// Replace a Goal record
    pub async fn update_goal(&self, goal: Goal) -> StateResponse<()> {
        debug!(goal_id = %goal.id, task_count = goal.task_count, "update_goal: called");
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send(StateCommand::UpdateGoal { goal, reply: reply_tx })
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    /// All goals, newest first
    pub async fn list_goals(&self, status_filter: Option<String>) -> StateResponse<Vec<Goal>> {
        debug!(?status_filter, "list_goals: called");
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send(StateCommand::ListGoals {
                status_filter,
                reply: reply_tx,
            })
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    /// A goal and its tasks in generation order
    pub async fn get_goal_with_tasks(&self, id: &str) -> StateResponse<(Goal, Vec<Task>)> {
        debug!(%id, "get_goal_with_tasks: called");
        let goal = self
            .get_goal(id)
            .await?
            .ok_or_else(|| StateError::NotFound(format!("goal {}", id)))?;
        let tasks = self.list_tasks(Some(id.to_string()), None).await?;
        Ok((goal, tasks))
    }

    /// Delete a goal and all of its tasks, returning how many tasks went with it
    pub async fn delete_goal(&self, id: &str) -> StateResponse<usize> {
        debug!(%id, "delete_goal: called");
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send(StateCommand::DeleteGoal {
                id: id.to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    // === Task operations ===

    /// Create a new Task record
    pub async fn create_task(&self, task: Task) -> StateResponse<String> {
        debug!(task_id = %task.id, goal = %task.goal, "create_task: called");
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send(StateCommand::CreateTask { task, reply: reply_tx })
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    /// Get a Task record by ID
    pub async fn get_task(&self, id: &str) -> StateResponse<Option<Task>> {
        debug!(%id, "get_task: called");
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send(StateCommand::GetTask {
                id: id.to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    /// Replace a Task record
    pub async fn update_task(&self, task: Task) -> StateResponse<()> {
        debug!(task_id = %task.id, "update_task: called");
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send(StateCommand::UpdateTask { task, reply: reply_tx })
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    /// List tasks with optional filters, in creation order
    pub async fn list_tasks(
        &self,
        goal_filter: Option<String>,
        status_filter: Option<String>,
    ) -> StateResponse<Vec<Task>> {
        debug!(?goal_filter, ?status_filter, "list_tasks: called");
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send(StateCommand::ListTasks {
                goal_filter,
                status_filter,
                reply: reply_tx,
            })
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    /// Set a task's status and optionally its progress
    ///
    /// Progress is clamped to 0-100; completing without a progress sets 100.
    pub async fn update_task_status(&self, id: &str, status: TaskStatus, progress: Option<f64>) -> StateResponse<Task> {
        debug!(%id, ?status, ?progress, "update_task_status: called");
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send(StateCommand::UpdateTaskStatus {
                id: id.to_string(),
                status,
                progress,
                reply: reply_tx,
            })
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    /// Patch a task's mutable fields
    ///
    /// Dependency ids that aren't other tasks of the same goal are dropped.
    pub async fn apply_task_update(&self, id: &str, update: TaskUpdate) -> StateResponse<Task> {
        debug!(%id, ?update, "apply_task_update: called");
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send(StateCommand::ApplyTaskUpdate {
                id: id.to_string(),
                update,
                reply: reply_tx,
            })
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    /// Delete a task, pruning it from every other task's dependency list
    pub async fn delete_task(&self, id: &str) -> StateResponse<()> {
        debug!(%id, "delete_task: called");
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send(StateCommand::DeleteTask {
                id: id.to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    // === Reporting ===

    /// Aggregate counts over every goal and task
    pub async fn get_analytics(&self, now: DateTime<Utc>) -> StateResponse<Analytics> {
        debug!(%now, "get_analytics: called");
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send(StateCommand::GetAnalytics { now, reply: reply_tx })
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> StateResponse<()> {
        debug!("shutdown: called");
        self.tx
            .send(StateCommand::Shutdown)
            .await
            .map_err(|_| StateError::ChannelError)?;
        Ok(())
    }
}

fn store_err(e: eyre::Report) -> StateError {
    StateError::StoreError(e.to_string())
}

fn load_task(store: &Store, id: &str) -> StateResponse<Task> {
    store
        .get::<Task>(id)
        .map_err(store_err)?
        .ok_or_else(|| StateError::NotFound(format!("task {}", id)))
}

fn tasks_for_goal(store: &Store, goal_id: &str) -> StateResponse<Vec<Task>> {
    store.list(&[Filter::eq("goal", goal_id)]).map_err(store_err)
}

/// Keep only ids of other tasks in the same goal, first occurrence wins
fn sibling_dependencies(store: &Store, task: &Task, requested: Vec<String>) -> StateResponse<Vec<String>> {
    let siblings: HashSet<String> = tasks_for_goal(store, &task.goal)?
        .into_iter()
        .map(|t| t.id)
        .filter(|sibling_id| *sibling_id != task.id)
        .collect();

    let mut kept: Vec<String> = Vec::with_capacity(requested.len());
    for dep_id in requested {
        if siblings.contains(&dep_id) && !kept.contains(&dep_id) {
            kept.push(dep_id);
        } else {
            debug!(task_id = %task.id, %dep_id, "sibling_dependencies: dropped");
        }
    }
    Ok(kept)
}

fn delete_goal(store: &mut Store, id: &str) -> StateResponse<usize> {
    if store.get::<Goal>(id).map_err(store_err)?.is_none() {
        return Err(StateError::NotFound(format!("goal {}", id)));
    }
    let deleted_tasks = store
        .delete_by_index::<Task>("goal", IndexValue::String(id.to_string()))
        .map_err(store_err)?;
    store.delete::<Goal>(id).map_err(store_err)?;
    info!(%id, deleted_tasks, "Deleted goal");
    Ok(deleted_tasks)
}

fn delete_task(store: &mut Store, id: &str) -> StateResponse<()> {
    let task = load_task(store, id)?;

    for mut other in store.list::<Task>(&[]).map_err(store_err)? {
        if other.id != task.id && other.remove_dependency(&task.id) {
            debug!(other_id = %other.id, "delete_task: pruned dependency");
            store.update(other).map_err(store_err)?;
        }
    }

    store.delete::<Task>(id).map_err(store_err)?;

    match store.get::<Goal>(&task.goal).map_err(store_err)? {
        Some(mut goal) => {
            goal.decrement_task_count();
            store.update(goal).map_err(store_err)?;
        }
        None => warn!(%id, goal = %task.goal, "Deleted task's goal no longer exists"),
    }
    info!(%id, "Deleted task");
    Ok(())
}

/// The actor loop that processes commands
async fn actor_loop(mut store: Store, mut rx: mpsc::Receiver<StateCommand>) {
    debug!("actor_loop: called");
    debug!("StateManager actor started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            // Goal operations
            StateCommand::CreateGoal { goal, reply } => {
                debug!(goal_id = %goal.id, "actor_loop: CreateGoal command");
                let result = store.create(goal).map_err(store_err);
                let _ = reply.send(result);
            }

            StateCommand::GetGoal { id, reply } => {
                debug!(%id, "actor_loop: GetGoal command");
                let result: StateResponse<Option<Goal>> = store.get(&id).map_err(store_err);
                let _ = reply.send(result);
            }

            StateCommand::UpdateGoal { goal, reply } => {
                debug!(goal_id = %goal.id, "actor_loop: UpdateGoal command");
                let result = store.update(goal).map_err(store_err);
                let _ = reply.send(result);
            }

            StateCommand::ListGoals { status_filter, reply } => {
                debug!(?status_filter, "actor_loop: ListGoals command");
                let mut filters = Vec::new();
                if let Some(status) = status_filter {
                    debug!(%status, "actor_loop: ListGoals adding status filter");
                    filters.push(Filter::eq("status", status));
                }
                let result: StateResponse<Vec<Goal>> = store.list(&filters).map_err(store_err);
                // Newest first; among equal timestamps the later insert wins
                let result = result.map(|mut goals| {
                    goals.reverse();
                    goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                    goals
                });
                let _ = reply.send(result);
            }

            StateCommand::DeleteGoal { id, reply } => {
                debug!(%id, "actor_loop: DeleteGoal command");
                let _ = reply.send(delete_goal(&mut store, &id));
            }

            // Task operations
            StateCommand::CreateTask { task, reply } => {
                debug!(task_id = %task.id, "actor_loop: CreateTask command");
                let result = store.create(task).map_err(store_err);
                let _ = reply.send(result);
            }

            StateCommand::GetTask { id, reply } => {
                debug!(%id, "actor_loop: GetTask command");
                let result: StateResponse<Option<Task>> = store.get(&id).map_err(store_err);
                let _ = reply.send(result);
            }

            StateCommand::UpdateTask { task, reply } => {
                debug!(task_id = %task.id, "actor_loop: UpdateTask command");
                let result = store.update(task).map_err(store_err);
                let _ = reply.send(result);
            }

            StateCommand::ListTasks {
                goal_filter,
                status_filter,
                reply,
            } => {
                debug!(?goal_filter, ?status_filter, "actor_loop: ListTasks command");
                let mut filters = Vec::new();
                if let Some(goal) = goal_filter {
                    debug!(%goal, "actor_loop: ListTasks adding goal filter");
                    filters.push(Filter::eq("goal", goal));
                }
                if let Some(status) = status_filter {
                    debug!(%status, "actor_loop: ListTasks adding status filter");
                    filters.push(Filter::eq("status", status));
                }
                let result: StateResponse<Vec<Task>> = store.list(&filters).map_err(store_err);
                let _ = reply.send(result);
            }

            StateCommand::UpdateTaskStatus {
                id,
                status,
                progress,
                reply,
            } => {
                debug!(%id, ?status, ?progress, "actor_loop: UpdateTaskStatus command");
                let result = load_task(&store, &id).and_then(|mut task| {
                    task.set_status(status, progress);
                    store.update(task.clone()).map_err(store_err)?;
                    Ok(task)
                });
                let _ = reply.send(result);
            }

            StateCommand::ApplyTaskUpdate { id, update, reply } => {
                debug!(%id, "actor_loop: ApplyTaskUpdate command");
                let result = load_task(&store, &id).and_then(|mut task| {
                    let mut update = update;
                    if let Some(dependencies) = update.dependencies.take() {
                        update.dependencies = Some(sibling_dependencies(&store, &task, dependencies)?);
                    }
                    task.apply_update(update).map_err(StateError::Validation)?;
                    store.update(task.clone()).map_err(store_err)?;
                    Ok(task)
                });
                let _ = reply.send(result);
            }

            StateCommand::DeleteTask { id, reply } => {
                debug!(%id, "actor_loop: DeleteTask command");
                let _ = reply.send(delete_task(&mut store, &id));
            }

            StateCommand::GetAnalytics { now, reply } => {
                debug!(%now, "actor_loop: GetAnalytics command");
                let result = store.list::<Goal>(&[]).and_then(|goals| {
                    let tasks = store.list::<Task>(&[])?;
                    Ok(Analytics::compute(&goals, &tasks, now))
                });
                let _ = reply.send(result.map_err(store_err));
            }

            StateCommand::Shutdown => {
                info!("StateManager shutting down");
                break;
            }
        }
    }

    debug!("StateManager actor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CanonicalTask, Priority, TaskCategory};
    use tempfile::tempdir;

    fn canonical(title: &str) -> CanonicalTask {
        let now = Utc::now();
        CanonicalTask {
            title: title.to_string(),
            description: format!("{} work", title),
            start_date: now,
            end_date: now + chrono::Duration::days(2),
            priority: Priority::Medium,
            category: TaskCategory::Other,
            estimated_hours: 4.0,
            dependencies: vec![],
            tags: vec![],
        }
    }

    /// Goal with tasks a <- b, a <- c, b <- c
    async fn seed(manager: &StateManager) -> (Goal, Task, Task, Task) {
        let mut goal = Goal::new("Ship the thing");
        manager.create_goal(goal.clone()).await.unwrap();

        let a = Task::from_canonical(&goal.id, &canonical("a"));
        let mut b = Task::from_canonical(&goal.id, &canonical("b"));
        let mut c = Task::from_canonical(&goal.id, &canonical("c"));
        b.set_dependencies(vec![a.id.clone()]);
        c.set_dependencies(vec![a.id.clone(), b.id.clone()]);
        for task in [&a, &b, &c] {
            manager.create_task(task.clone()).await.unwrap();
        }

        goal.set_task_count(3);
        manager.update_goal(goal.clone()).await.unwrap();
        (goal, a, b, c)
    }

    #[tokio::test]
    async fn test_state_manager_goal_crud() {
        let temp = tempdir().unwrap();
        let manager = StateManager::spawn(temp.path()).unwrap();

        let goal = Goal::new("Learn the cello");
        let id = manager.create_goal(goal.clone()).await.unwrap();
        assert_eq!(id, goal.id);

        let retrieved = manager.get_goal(&id).await.unwrap().unwrap();
        assert_eq!(retrieved.title, "Learn the cello");

        assert!(manager.get_goal("missing").await.unwrap().is_none());
        assert_eq!(manager.list_goals(None).await.unwrap().len(), 1);
        assert_eq!(manager.list_goals(Some("draft".to_string())).await.unwrap().len(), 0);

        manager.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_list_goals_newest_first() {
        let temp = tempdir().unwrap();
        let manager = StateManager::spawn(temp.path()).unwrap();

        let mut older = Goal::new("Older goal");
        older.created_at -= 10_000;
        let newer = Goal::new("Newer goal");
        manager.create_goal(newer.clone()).await.unwrap();
        manager.create_goal(older.clone()).await.unwrap();

        let goals = manager.list_goals(None).await.unwrap();
        assert_eq!(goals[0].id, newer.id);
        assert_eq!(goals[1].id, older.id);
    }

    #[tokio::test]
    async fn test_get_goal_with_tasks() {
        let temp = tempdir().unwrap();
        let manager = StateManager::spawn(temp.path()).unwrap();
        let (goal, a, b, c) = seed(&manager).await;

        let (found, tasks) = manager.get_goal_with_tasks(&goal.id).await.unwrap();
        assert_eq!(found.task_count, 3);
        let ids: Vec<_> = tasks.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);

        assert!(matches!(
            manager.get_goal_with_tasks("missing").await,
            Err(StateError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_task_prunes_dependencies() {
        let temp = tempdir().unwrap();
        let manager = StateManager::spawn(temp.path()).unwrap();
        let (goal, a, b, c) = seed(&manager).await;

        manager.delete_task(&a.id).await.unwrap();

        assert!(manager.get_task(&a.id).await.unwrap().is_none());
        let b = manager.get_task(&b.id).await.unwrap().unwrap();
        assert!(b.dependencies.is_empty());
        let c = manager.get_task(&c.id).await.unwrap().unwrap();
        assert_eq!(c.dependencies, vec![b.id.clone()]);

        let goal = manager.get_goal(&goal.id).await.unwrap().unwrap();
        assert_eq!(goal.task_count, 2);

        assert!(matches!(manager.delete_task(&a.id).await, Err(StateError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_goal_cascades() {
        let temp = tempdir().unwrap();
        let manager = StateManager::spawn(temp.path()).unwrap();
        let (goal, a, _, _) = seed(&manager).await;
        let (other, ..) = seed(&manager).await;

        let deleted = manager.delete_goal(&goal.id).await.unwrap();
        assert_eq!(deleted, 3);
        assert!(manager.get_goal(&goal.id).await.unwrap().is_none());
        assert!(manager.get_task(&a.id).await.unwrap().is_none());
        assert!(manager.list_tasks(Some(goal.id.clone()), None).await.unwrap().is_empty());

        assert_eq!(manager.list_tasks(Some(other.id.clone()), None).await.unwrap().len(), 3);
        assert!(matches!(manager.delete_goal(&goal.id).await, Err(StateError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_task_status() {
        let temp = tempdir().unwrap();
        let manager = StateManager::spawn(temp.path()).unwrap();
        let (_, a, b, _) = seed(&manager).await;

        let done = manager.update_task_status(&a.id, TaskStatus::Completed, None).await.unwrap();
        assert_eq!(done.progress, 100);

        let partial = manager
            .update_task_status(&b.id, TaskStatus::InProgress, Some(150.0))
            .await
            .unwrap();
        assert_eq!(partial.progress, 100);

        let stored = manager.get_task(&b.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::InProgress);

        let pending = manager.list_tasks(None, Some("pending".to_string())).await.unwrap();
        assert_eq!(pending.len(), 1);

        assert!(matches!(
            manager.update_task_status("missing", TaskStatus::Blocked, None).await,
            Err(StateError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_apply_task_update() {
        let temp = tempdir().unwrap();
        let manager = StateManager::spawn(temp.path()).unwrap();
        let (goal, a, _, _) = seed(&manager).await;

        let update = TaskUpdate {
            title: Some("Gather requirements".to_string()),
            notes: Some("talk to ops".to_string()),
            ..Default::default()
        };
        let updated = manager.apply_task_update(&a.id, update).await.unwrap();
        assert_eq!(updated.title, "Gather requirements");
        assert_eq!(updated.goal, goal.id);

        let bad = TaskUpdate {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            manager.apply_task_update(&a.id, bad).await,
            Err(StateError::Validation(_))
        ));
        let stored = manager.get_task(&a.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Gather requirements");

        let complete = TaskUpdate {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        let completed = manager.apply_task_update(&a.id, complete).await.unwrap();
        assert_eq!(completed.progress, 100);
    }

    #[tokio::test]
    async fn test_apply_task_update_keeps_only_sibling_dependencies() {
        let temp = tempdir().unwrap();
        let manager = StateManager::spawn(temp.path()).unwrap();
        let (_, a, b, c) = seed(&manager).await;
        let (_, other, _, _) = seed(&manager).await;

        let update = TaskUpdate {
            dependencies: Some(vec![
                other.id.clone(),
                "task-missing".to_string(),
                a.id.clone(),
                c.id.clone(),
                a.id.clone(),
                b.id.clone(),
            ]),
            ..Default::default()
        };
        let updated = manager.apply_task_update(&c.id, update).await.unwrap();
        assert_eq!(updated.dependencies, vec![a.id.clone(), b.id.clone()]);

        let stored = manager.get_task(&c.id).await.unwrap().unwrap();
        assert_eq!(stored.dependencies, vec![a.id.clone(), b.id.clone()]);
    }

    #[tokio::test]
    async fn test_delete_task_prunes_other_goals() {
        let temp = tempdir().unwrap();
        let manager = StateManager::spawn(temp.path()).unwrap();
        let (_, a, _, _) = seed(&manager).await;
        let (_, _, _, mut foreign) = seed(&manager).await;

        // Whole-record writes aren't filtered, so a cross-goal link can exist
        foreign.set_dependencies(vec![a.id.clone()]);
        manager.update_task(foreign.clone()).await.unwrap();

        manager.delete_task(&a.id).await.unwrap();

        let foreign = manager.get_task(&foreign.id).await.unwrap().unwrap();
        assert!(foreign.dependencies.is_empty());
    }

    #[tokio::test]
    async fn test_get_analytics() {
        let temp = tempdir().unwrap();
        let manager = StateManager::spawn(temp.path()).unwrap();
        let (_, a, _, _) = seed(&manager).await;
        manager.update_task_status(&a.id, TaskStatus::Completed, None).await.unwrap();

        let analytics = manager.get_analytics(Utc::now()).await.unwrap();
        assert_eq!(analytics.overview.total_goals, 1);
        assert_eq!(analytics.overview.total_tasks, 3);
        assert_eq!(analytics.overview.completed_tasks, 1);
        assert_eq!(analytics.overview.completion_rate, 33);
        assert_eq!(analytics.tasks_by_priority["medium"], 3);
    }
}
