//! TaskPlanner - goal decomposition CLI
//!
//! Entry point for generating plans and managing the stored goals and tasks.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result, bail};
use tracing::{debug, info};

use taskplanner::cli::{Cli, Command, GoalsCommand, OutputFormat, TaskCommand};
use taskplanner::config::Config;
use taskplanner::domain::{Goal, Task, TaskStatus, TaskUpdate};
use taskplanner::planning::{Decomposer, GenerateRequest, GenerationClient, GenerationOutcome, TaskSource};
use taskplanner::state::StateManager;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskplanner")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("taskplanner.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;
    info!(store = %config.storage.taskstore_dir, provider = %config.llm.provider, "TaskPlanner loaded config");

    let state = StateManager::spawn(&config.storage.taskstore_dir).context("Failed to open task store")?;

    debug!(command = ?cli.command, "main: dispatching command");
    let result = match cli.command {
        Command::Generate {
            goal,
            deadline,
            category,
            priority,
            duration,
            budget,
            format,
        } => {
            debug!(%goal, ?deadline, %category, %priority, "main: matched Generate command");
            let mut request = GenerateRequest::new(goal)
                .with_deadline(deadline)
                .with_category(category)
                .with_priority(priority);
            if let Some(days) = duration {
                request = request.with_estimated_duration(days);
            }
            if let Some(budget) = budget {
                request = request.with_budget(budget);
            }
            cmd_generate(&config, &state, request, format).await
        }
        Command::Goals { command } => {
            debug!(?command, "main: matched Goals command");
            cmd_goals(&state, command).await
        }
        Command::Task { command } => {
            debug!(?command, "main: matched Task command");
            cmd_task(&state, command).await
        }
        Command::Stats { format } => {
            debug!(%format, "main: matched Stats command");
            cmd_stats(&state, format).await
        }
    };

    let _ = state.shutdown().await;
    result
}

/// Decompose a goal and save the plan
async fn cmd_generate(config: &Config, state: &StateManager, request: GenerateRequest, format: OutputFormat) -> Result<()> {
    debug!(goal_text = %request.goal_text, %format, "cmd_generate: called");
    let generator = GenerationClient::from_config(config);
    if !generator.is_configured() && format == OutputFormat::Text {
        eprintln!(
            "{} no API key in ${}, using local templates",
            "note:".yellow(),
            config.llm.api_key_env
        );
    }

    let decomposer = Decomposer::new(generator, Arc::new(state.clone()));
    let outcome = decomposer.generate(request).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => print_outcome(&outcome),
    }
    Ok(())
}

fn print_outcome(outcome: &GenerationOutcome) {
    let source = match outcome.source {
        TaskSource::Ai => "AI".green(),
        TaskSource::Fallback => "local templates".yellow(),
    };
    println!("{} {}", "Goal:".bold(), outcome.goal.title);
    println!("  id:     {}", outcome.goal.id.cyan());
    println!("  source: {}", source);
    println!(
        "  tasks:  {} ({} ms generating, {} ms total)",
        outcome.statistics.total_tasks, outcome.statistics.generation_ms, outcome.statistics.total_ms
    );
    println!();
    print_tasks(&outcome.tasks);

    for warning in &outcome.warnings {
        println!("{} {}", "warning:".yellow(), warning);
    }
}

fn print_tasks(tasks: &[Task]) {
    let titles: HashMap<&str, &str> = tasks.iter().map(|t| (t.id.as_str(), t.title.as_str())).collect();

    for (i, task) in tasks.iter().enumerate() {
        println!(
            "{:>2}. {} [{}] {}",
            i + 1,
            task.title.bold(),
            task.priority,
            status_label(task.status)
        );
        println!("    id: {}", task.id.dimmed());
        println!(
            "    {} -> {}, {}h, {}, {}%",
            task.start_date.format("%Y-%m-%d"),
            task.end_date.format("%Y-%m-%d"),
            task.estimated_hours,
            task.category,
            task.completion_rate()
        );
        if !task.dependencies.is_empty() {
            let after: Vec<&str> = task
                .dependencies
                .iter()
                .map(|id| titles.get(id.as_str()).copied().unwrap_or(id.as_str()))
                .collect();
            println!("    after: {}", after.join(", "));
        }
    }
}

fn status_label(status: TaskStatus) -> colored::ColoredString {
    match status {
        TaskStatus::Completed => status.as_str().green(),
        TaskStatus::InProgress => status.as_str().cyan(),
        TaskStatus::Blocked => status.as_str().red(),
        TaskStatus::Cancelled => status.as_str().dimmed(),
        TaskStatus::Pending => status.as_str().normal(),
    }
}

fn print_goal_line(goal: &Goal) {
    println!(
        "{}  {:<9}  {:>2} tasks  {}",
        goal.id.cyan(),
        goal.status,
        goal.task_count,
        goal.title
    );
}

/// Handle goal management commands
async fn cmd_goals(state: &StateManager, command: GoalsCommand) -> Result<()> {
    debug!(?command, "cmd_goals: called");
    match command {
        GoalsCommand::List { status, format } => {
            let goals = state.list_goals(status).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&goals)?),
                OutputFormat::Text if goals.is_empty() => println!("No goals yet. Try `tp generate \"<goal>\"`."),
                OutputFormat::Text => goals.iter().for_each(print_goal_line),
            }
        }
        GoalsCommand::Show { id, format } => {
            let (goal, tasks) = state.get_goal_with_tasks(&id).await?;
            match format {
                OutputFormat::Json => {
                    let body = serde_json::json!({ "goal": goal, "tasks": tasks });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                OutputFormat::Text => {
                    let now = chrono::Utc::now();
                    println!("{} {}", "Goal:".bold(), goal.title);
                    println!("  id:       {}", goal.id.cyan());
                    println!("  status:   {} ({}%)", goal.status, goal.progress);
                    println!("  category: {}, priority: {}", goal.category, goal.priority);
                    if let Some(deadline) = goal.deadline {
                        let overdue = if goal.is_overdue(now) { " overdue".red() } else { "".normal() };
                        println!(
                            "  deadline: {} ({} days left){}",
                            deadline.format("%Y-%m-%d"),
                            goal.days_remaining(now).unwrap_or_default(),
                            overdue
                        );
                    }
                    println!();
                    print_tasks(&tasks);
                }
            }
        }
        GoalsCommand::Delete { id } => {
            let deleted_tasks = state.delete_goal(&id).await?;
            println!("Deleted goal {} and {} tasks", id.cyan(), deleted_tasks);
        }
    }
    Ok(())
}

/// Handle task management commands
async fn cmd_task(state: &StateManager, command: TaskCommand) -> Result<()> {
    debug!(?command, "cmd_task: called");
    match command {
        TaskCommand::Status { id, status, progress } => {
            let task = state.update_task_status(&id, status, progress).await?;
            println!("{} {} ({}%)", task.title.bold(), status_label(task.status), task.progress);
        }
        TaskCommand::Update {
            id,
            title,
            description,
            start,
            end,
            priority,
            category,
            hours,
            actual_hours,
            status,
            progress,
            assignee,
            notes,
            tags,
            dependencies,
        } => {
            let update = TaskUpdate {
                title,
                description,
                start_date: start,
                end_date: end,
                priority,
                category,
                estimated_hours: hours,
                actual_hours,
                dependencies,
                status,
                progress,
                assignee,
                tags,
                notes,
            };
            if update.is_empty() {
                bail!("Nothing to update; pass at least one field flag");
            }
            let task = state.apply_task_update(&id, update).await?;
            println!("Updated task {}", task.title.bold());
        }
        TaskCommand::Delete { id } => {
            state.delete_task(&id).await?;
            println!("Deleted task {}", id.cyan());
        }
    }
    Ok(())
}

/// Show aggregate statistics
async fn cmd_stats(state: &StateManager, format: OutputFormat) -> Result<()> {
    debug!(%format, "cmd_stats: called");
    let analytics = state.get_analytics(chrono::Utc::now()).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analytics)?),
        OutputFormat::Text => {
            let o = &analytics.overview;
            println!("TaskPlanner Statistics");
            println!("----------------------");
            println!(
                "Goals: {} ({} active, {} completed)",
                o.total_goals, o.active_goals, o.completed_goals
            );
            println!(
                "Tasks: {} ({} completed, {} overdue)",
                o.total_tasks, o.completed_tasks, o.overdue_tasks
            );
            println!("Completion rate: {}%", o.completion_rate);
            for (label, counts) in [
                ("By priority", &analytics.tasks_by_priority),
                ("By status", &analytics.tasks_by_status),
                ("Goals by category", &analytics.goals_by_category),
            ] {
                println!();
                println!("{}:", label);
                for (key, count) in counts {
                    println!("  {:<12} {}", key, count);
                }
            }
        }
    }
    Ok(())
}
