//! State manager messages
//!
//! Commands and responses for the actor pattern.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::oneshot;

use super::analytics::Analytics;
use crate::domain::{Goal, Task, TaskStatus, TaskUpdate};

/// Errors from state operations
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Invalid update: {0}")]
    Validation(String),

    #[error("Channel error")]
    ChannelError,
}

/// Response from state operations
pub type StateResponse<T> = Result<T, StateError>;

/// Commands sent to the StateManager actor
#[derive(Debug)]
pub enum StateCommand {
    // Goal operations
    CreateGoal {
        goal: Goal,
        reply: oneshot::Sender<StateResponse<String>>,
    },
    GetGoal {
        id: String,
        reply: oneshot::Sender<StateResponse<Option<Goal>>>,
    },
    UpdateGoal {
        goal: Goal,
        reply: oneshot::Sender<StateResponse<()>>,
    },
    ListGoals {
        status_filter: Option<String>,
        reply: oneshot::Sender<StateResponse<Vec<Goal>>>,
    },
    /// Cascade: the goal's tasks go first; replies with their count
    DeleteGoal {
        id: String,
        reply: oneshot::Sender<StateResponse<usize>>,
    },

    // Task operations
    CreateTask {
        task: Task,
        reply: oneshot::Sender<StateResponse<String>>,
    },
    GetTask {
        id: String,
        reply: oneshot::Sender<StateResponse<Option<Task>>>,
    },
    UpdateTask {
        task: Task,
        reply: oneshot::Sender<StateResponse<()>>,
    },
    ListTasks {
        goal_filter: Option<String>,
        status_filter: Option<String>,
        reply: oneshot::Sender<StateResponse<Vec<Task>>>,
    },
    UpdateTaskStatus {
        id: String,
        status: TaskStatus,
        progress: Option<f64>,
        reply: oneshot::Sender<StateResponse<Task>>,
    },
    ApplyTaskUpdate {
        id: String,
        update: TaskUpdate,
        reply: oneshot::Sender<StateResponse<Task>>,
    },
    /// Prunes the ID from sibling dependency lists and decrements the goal's count
    DeleteTask {
        id: String,
        reply: oneshot::Sender<StateResponse<()>>,
    },

    // Reporting
    GetAnalytics {
        now: DateTime<Utc>,
        reply: oneshot::Sender<StateResponse<Analytics>>,
    },

    // Shutdown
    Shutdown,
}
