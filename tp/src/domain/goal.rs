//! Goal domain type
//!
//! The parent record a batch of generated tasks is grouped under.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskstore::{IndexValue, Record, now_ms};
use tracing::debug;

use super::category::GoalCategory;
use super::id::generate_id;
use super::priority::Priority;
use super::status::GoalStatus;

/// Goal text longer than this is truncated for the title
const TITLE_MAX_CHARS: usize = 50;
const TITLE_KEEP_CHARS: usize = 47;

/// Default expected duration in days
pub const DEFAULT_DURATION_DAYS: u32 = 7;

/// A user goal that owns a batch of tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    pub id: String,

    /// Display title (goal text, truncated)
    pub title: String,

    /// Full goal text
    pub description: String,

    pub category: GoalCategory,

    pub priority: Priority,

    /// Optional target date
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,

    /// Expected duration in days (at least 1)
    pub estimated_duration: u32,

    /// Budget, never negative
    #[serde(default)]
    pub budget: f64,

    pub status: GoalStatus,

    /// Percent complete (0-100)
    #[serde(default)]
    pub progress: u8,

    pub owner: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub notes: String,

    /// Created by the decomposition pipeline
    #[serde(default)]
    pub ai_generated: bool,

    /// Number of tasks referencing this goal
    #[serde(default)]
    pub task_count: usize,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Goal {
    /// Create a goal from free-form goal text
    pub fn new(goal_text: impl Into<String>) -> Self {
        let description = goal_text.into();
        debug!(%description, "Goal::new: called");
        let title = Self::title_from_text(&description);
        let now = now_ms();

        Self {
            id: generate_id("goal", &title),
            title,
            description,
            category: GoalCategory::default(),
            priority: Priority::default(),
            deadline: None,
            estimated_duration: DEFAULT_DURATION_DAYS,
            budget: 0.0,
            status: GoalStatus::default(),
            progress: 0,
            owner: "Self".to_string(),
            tags: Vec::new(),
            notes: String::new(),
            ai_generated: false,
            task_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Title for a goal text: the text itself, or its first 47 chars plus `...` past 50
    pub fn title_from_text(text: &str) -> String {
        if text.chars().count() > TITLE_MAX_CHARS {
            let head: String = text.chars().take(TITLE_KEEP_CHARS).collect();
            format!("{}...", head)
        } else {
            text.to_string()
        }
    }

    /// Replace the description without touching the title
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
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

    pub fn with_deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set the expected duration, raised to at least one day
    pub fn with_estimated_duration(mut self, days: u32) -> Self {
        self.estimated_duration = days.max(1);
        self
    }

    /// Set the budget, negative values become zero
    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = if budget.is_finite() { budget.max(0.0) } else { 0.0 };
        self
    }

    pub fn with_ai_generated(mut self, ai_generated: bool) -> Self {
        self.ai_generated = ai_generated;
        self
    }

    /// Update the denormalized task count
    pub fn set_task_count(&mut self, count: usize) {
        debug!(%self.id, count, "Goal::set_task_count: called");
        self.task_count = count;
        self.updated_at = now_ms();
    }

    /// Decrement the task count, never below zero
    pub fn decrement_task_count(&mut self) {
        debug!(%self.id, self.task_count, "Goal::decrement_task_count: called");
        self.task_count = self.task_count.saturating_sub(1);
        self.updated_at = now_ms();
    }

    pub fn set_status(&mut self, status: GoalStatus) {
        debug!(%self.id, ?status, "Goal::set_status: called");
        self.status = status;
        self.updated_at = now_ms();
    }

    /// Whole days until the deadline, rounded up; None without a deadline
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.deadline.map(|deadline| {
            let ms = (deadline - now).num_milliseconds();
            let day_ms = 24 * 60 * 60 * 1000;
            // ceiling division that also works for negative values
            ms.div_euclid(day_ms) + i64::from(ms.rem_euclid(day_ms) != 0)
        })
    }

    /// Deadline has passed and the goal isn't completed
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) => deadline < now && self.status != GoalStatus::Completed,
            None => false,
        }
    }
}

impl Record for Goal {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn collection_name() -> &'static str {
        "goals"
    }

    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        let mut fields = HashMap::new();
        fields.insert("status".to_string(), IndexValue::String(self.status.to_string()));
        fields.insert("category".to_string(), IndexValue::String(self.category.to_string()));
        fields.insert("priority".to_string(), IndexValue::String(self.priority.to_string()));
        fields
    }
}
