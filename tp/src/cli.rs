//! CLI command definitions and subcommands

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::domain::{GoalCategory, Priority, TaskCategory, TaskStatus};
use crate::planning::normalizer::parse_date;

/// TaskPlanner - break a goal into a dependency-linked task plan
#[derive(Parser)]
#[command(
    name = "tp",
    about = "Turn a free-text goal into a persisted plan of dependent tasks",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decompose a goal into tasks and save the plan
    Generate {
        /// What you want to achieve (at least 5 characters)
        goal: String,

        /// Target date (YYYY-MM-DD or RFC 3339)
        #[arg(short, long, value_parser = parse_date_arg)]
        deadline: Option<DateTime<Utc>>,

        /// Goal category (business, personal, project, learning, health, other)
        #[arg(long, default_value = "other")]
        category: GoalCategory,

        /// Goal priority (low, medium, high, urgent)
        #[arg(short, long, default_value = "medium")]
        priority: Priority,

        /// Expected duration in days
        #[arg(long)]
        duration: Option<u32>,

        /// Budget for the goal
        #[arg(long)]
        budget: Option<f64>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Inspect and delete goals
    Goals {
        #[command(subcommand)]
        command: GoalsCommand,
    },

    /// Update and delete tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Show goal and task statistics
    Stats {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Goal subcommands
#[derive(Debug, Subcommand)]
pub enum GoalsCommand {
    /// List all goals, newest first
    List {
        /// Filter by status (draft, active, on-hold, completed, cancelled)
        #[arg(short, long)]
        status: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a goal and its tasks
    Show {
        /// Goal ID
        id: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a goal and all of its tasks
    Delete {
        /// Goal ID
        id: String,
    },
}

/// Task subcommands
#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Set a task's status
    Status {
        /// Task ID
        id: String,

        /// New status (pending, in-progress, completed, blocked, cancelled)
        status: TaskStatus,

        /// Percent complete (clamped to 0-100)
        #[arg(short, long)]
        progress: Option<f64>,
    },

    /// Change task fields
    Update {
        /// Task ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Start date (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<DateTime<Utc>>,

        /// End date (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<DateTime<Utc>>,

        #[arg(long)]
        priority: Option<Priority>,

        #[arg(long)]
        category: Option<TaskCategory>,

        /// Estimated hours (clamped to 1-40)
        #[arg(long)]
        hours: Option<f64>,

        /// Hours actually spent
        #[arg(long)]
        actual_hours: Option<f64>,

        #[arg(long)]
        status: Option<TaskStatus>,

        #[arg(long)]
        progress: Option<f64>,

        #[arg(long)]
        assignee: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Replace tags (repeatable)
        #[arg(long = "tag")]
        tags: Option<Vec<String>>,

        /// Replace dependencies with these task IDs (repeatable)
        #[arg(long = "depends-on")]
        dependencies: Option<Vec<String>>,
    },

    /// Delete a task and unlink it from its dependents
    Delete {
        /// Task ID
        id: String,
    },
}

/// Parse a `--deadline`/`--start`/`--end` value
pub fn parse_date_arg(s: &str) -> Result<DateTime<Utc>, String> {
    debug!(%s, "parse_date_arg: called");
    parse_date(s).ok_or_else(|| format!("Invalid date: {}. Use YYYY-MM-DD or RFC 3339", s))
}

/// Output format for listing and reporting commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskplanner")
        .join("logs")
        .join("taskplanner.log")
}
