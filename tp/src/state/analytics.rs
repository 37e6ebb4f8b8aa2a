//! Aggregate counts over all goals and tasks

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::domain::{Goal, GoalCategory, GoalStatus, Priority, Task, TaskStatus};

/// Headline numbers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overview {
    pub total_goals: usize,
    pub active_goals: usize,
    pub completed_goals: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Past their end date and neither completed nor cancelled
    pub overdue_tasks: usize,
    /// Completed tasks as a rounded percentage, 0 with no tasks
    pub completion_rate: u8,
}

/// Dashboard summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analytics {
    pub overview: Overview,
    pub tasks_by_priority: BTreeMap<String, usize>,
    pub tasks_by_status: BTreeMap<String, usize>,
    pub goals_by_category: BTreeMap<String, usize>,
}

impl Analytics {
    /// Every known priority, status and category appears in the maps, zeros included
    pub fn compute(goals: &[Goal], tasks: &[Task], now: DateTime<Utc>) -> Self {
        debug!(goal_count = goals.len(), task_count = tasks.len(), "Analytics::compute: called");

        let completed_tasks = tasks.iter().filter(|t| t.status == TaskStatus::Completed).count();
        let completion_rate = if tasks.is_empty() {
            0
        } else {
            (completed_tasks as f64 / tasks.len() as f64 * 100.0).round() as u8
        };

        let overview = Overview {
            total_goals: goals.len(),
            active_goals: goals.iter().filter(|g| g.status == GoalStatus::Active).count(),
            completed_goals: goals.iter().filter(|g| g.status == GoalStatus::Completed).count(),
            total_tasks: tasks.len(),
            completed_tasks,
            overdue_tasks: tasks.iter().filter(|t| t.is_overdue(now)).count(),
            completion_rate,
        };

        let mut tasks_by_priority = zeroed(Priority::ALL.iter().map(|p| p.as_str()));
        let mut tasks_by_status = zeroed(TaskStatus::ALL.iter().map(|s| s.as_str()));
        for task in tasks {
            *tasks_by_priority.entry(task.priority.to_string()).or_default() += 1;
            *tasks_by_status.entry(task.status.to_string()).or_default() += 1;
        }

        let mut goals_by_category = zeroed(GoalCategory::ALL.iter().map(|c| c.as_str()));
        for goal in goals {
            *goals_by_category.entry(goal.category.to_string()).or_default() += 1;
        }

        Self {
            overview,
            tasks_by_priority,
            tasks_by_status,
            goals_by_category,
        }
    }
}

fn zeroed<'a>(keys: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    keys.map(|k| (k.to_string(), 0)).collect()
}
