//! Task domain types
//!
//! `CanonicalTask` is the validated shape the planning pipeline produces, with
//! dependencies still expressed as titles. `Task` is the persisted record, with
//! dependencies expressed as task IDs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskstore::{IndexValue, Record, now_ms};
use tracing::debug;

use super::category::TaskCategory;
use super::id::generate_id;
use super::priority::Priority;
use super::status::TaskStatus;

/// Bounds for estimated hours
pub const MIN_ESTIMATED_HOURS: f64 = 1.0;
pub const MAX_ESTIMATED_HOURS: f64 = 40.0;

/// A fully validated task, independent of where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTask {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub priority: Priority,
    pub category: TaskCategory,
    /// Always within [1, 40]
    pub estimated_hours: f64,
    /// Titles of prerequisite tasks in the same batch
    pub dependencies: Vec<String>,
    pub tags: Vec<String>,
}

/// A persisted task belonging to a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: String,

    /// Owning goal ID
    pub goal: String,

    pub title: String,

    pub description: String,

    pub start_date: DateTime<Utc>,

    pub end_date: DateTime<Utc>,

    pub priority: Priority,

    pub category: TaskCategory,

    pub estimated_hours: f64,

    #[serde(default)]
    pub actual_hours: f64,

    /// IDs of prerequisite tasks in the same goal
    #[serde(default)]
    pub dependencies: Vec<String>,

    pub status: TaskStatus,

    /// Percent complete (0-100)
    #[serde(default)]
    pub progress: u8,

    pub assignee: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub notes: String,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

/// Clamp a progress value into 0-100
pub fn clamp_progress(progress: f64) -> u8 {
    if progress.is_nan() {
        return 0;
    }
    progress.round().clamp(0.0, 100.0) as u8
}

impl Task {
    /// Create a pending task under `goal_id` from a canonical task
    ///
    /// Dependencies are left empty; they are titles at this point and get
    /// resolved to IDs once every task in the batch has one.
    pub fn from_canonical(goal_id: impl Into<String>, canonical: &CanonicalTask) -> Self {
        let goal = goal_id.into();
        debug!(%goal, title = %canonical.title, "Task::from_canonical: called");
        let now = now_ms();

        Self {
            id: generate_id("task", &canonical.title),
            goal,
            title: canonical.title.clone(),
            description: canonical.description.clone(),
            start_date: canonical.start_date,
            end_date: canonical.end_date,
            priority: canonical.priority,
            category: canonical.category,
            estimated_hours: canonical.estimated_hours,
            actual_hours: 0.0,
            dependencies: Vec::new(),
            status: TaskStatus::Pending,
            progress: 0,
            assignee: "Unassigned".to_string(),
            tags: canonical.tags.clone(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_dependencies(&mut self, dependencies: Vec<String>) {
        debug!(%self.id, ?dependencies, "Task::set_dependencies: called");
        self.dependencies = dependencies;
        self.updated_at = now_ms();
    }

    /// Drop a task ID from the dependency list, returning whether it was present
    pub fn remove_dependency(&mut self, task_id: &str) -> bool {
        debug!(%self.id, %task_id, "Task::remove_dependency: called");
        let before = self.dependencies.len();
        self.dependencies.retain(|d| d != task_id);
        let removed = self.dependencies.len() != before;
        if removed {
            self.updated_at = now_ms();
        }
        removed
    }

    /// Set status and progress
    ///
    /// Progress is clamped to 0-100. Completing without an explicit progress
    /// sets it to 100; other statuses keep the current progress.
    pub fn set_status(&mut self, status: TaskStatus, progress: Option<f64>) {
        debug!(%self.id, ?status, ?progress, "Task::set_status: called");
        self.status = status;
        match progress {
            Some(p) => self.progress = clamp_progress(p),
            None if status == TaskStatus::Completed => self.progress = 100,
            None => {}
        }
        self.updated_at = now_ms();
    }

    /// 100 when completed, otherwise the recorded progress
    pub fn completion_rate(&self) -> u8 {
        if self.status == TaskStatus::Completed {
            100
        } else {
            self.progress
        }
    }

    /// End date has passed and the task is still open
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.end_date < now && !self.status.is_closed()
    }
}

/// Partial update of a task's mutable fields
///
/// `id`, `goal` and `created_at` are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub category: Option<TaskCategory>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    /// Replacement list of task IDs
    pub dependencies: Option<Vec<String>>,
    pub status: Option<TaskStatus>,
    pub progress: Option<f64>,
    pub assignee: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Task {
    /// Apply a partial update
    ///
    /// Rejects an empty title. Hours are clamped like generated tasks, progress
    /// to 0-100. On error the task is left untouched.
    pub fn apply_update(&mut self, update: TaskUpdate) -> Result<(), String> {
        debug!(%self.id, ?update, "Task::apply_update: called");
        if let Some(title) = &update.title
            && title.trim().is_empty()
        {
            return Err("Task title cannot be empty".to_string());
        }

        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(start_date) = update.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            self.end_date = end_date;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(hours) = update.estimated_hours.filter(|h| h.is_finite()) {
            self.estimated_hours = hours.clamp(MIN_ESTIMATED_HOURS, MAX_ESTIMATED_HOURS);
        }
        if let Some(hours) = update.actual_hours.filter(|h| h.is_finite()) {
            self.actual_hours = hours.max(0.0);
        }
        if let Some(dependencies) = update.dependencies {
            self.dependencies = dependencies;
        }
        match (update.status, update.progress) {
            (Some(status), progress) => self.set_status(status, progress),
            (None, Some(progress)) => self.progress = clamp_progress(progress),
            (None, None) => {}
        }
        if let Some(assignee) = update.assignee {
            self.assignee = assignee;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }

        self.updated_at = now_ms();
        Ok(())
    }
}

impl Record for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn collection_name() -> &'static str {
        "tasks"
    }

    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        let mut fields = HashMap::new();
        fields.insert("goal".to_string(), IndexValue::String(self.goal.clone()));
        fields.insert("status".to_string(), IndexValue::String(self.status.to_string()));
        fields.insert("priority".to_string(), IndexValue::String(self.priority.to_string()));
        fields.insert("category".to_string(), IndexValue::String(self.category.to_string()));
        fields
    }
}
