//! Integration tests for TaskPlanner
//!
//! These drive the public API and the `tp` binary against a real TaskStore
//! in a temp directory.

use std::sync::Arc;

use assert_cmd::Command;
use async_trait::async_trait;
use predicates::prelude::*;
use tempfile::TempDir;

use taskplanner::config::PlannerConfig;
use taskplanner::domain::{Priority, TaskStatus};
use taskplanner::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use taskplanner::planning::{Decomposer, GenerateRequest, GenerationClient, PromptBuilder, TaskSource};
use taskplanner::state::StateManager;

/// Replies with the same text to every request
struct CannedClient(String);

#[async_trait]
impl LlmClient for CannedClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Ok(CompletionResponse::text(self.0.clone()))
    }
}

fn decomposer(state: &StateManager, llm: Option<Arc<dyn LlmClient>>) -> Decomposer {
    let generator = GenerationClient::new(llm, PromptBuilder::default(), &PlannerConfig::default());
    Decomposer::new(generator, Arc::new(state.clone()))
}

// =============================================================================
// End-to-end scenarios
// =============================================================================

#[tokio::test]
async fn test_offline_mobile_app_plan() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let state = StateManager::spawn(temp_dir.path()).expect("Failed to spawn state manager");

    let outcome = decomposer(&state, None)
        .generate(GenerateRequest::new("Launch a mobile app in 2 weeks"))
        .await
        .expect("generate should succeed offline");

    assert!(outcome.success);
    assert_eq!(outcome.source, TaskSource::Fallback);
    assert_eq!(outcome.goal.title, "Launch a mobile app in 2 weeks");
    assert_eq!(outcome.tasks.len(), 7);

    let first = &outcome.tasks[0];
    assert_eq!(first.title, "Requirements Analysis");
    assert!(first.dependencies.is_empty());

    let id_of = |title: &str| {
        outcome
            .tasks
            .iter()
            .find(|t| t.title == title)
            .map(|t| t.id.clone())
            .expect("task should exist")
    };
    let integration = &outcome.tasks[4];
    assert_eq!(integration.title, "Integration");
    assert_eq!(
        integration.dependencies,
        vec![id_of("Develop Backend"), id_of("Develop Frontend")]
    );

    // Everything in the outcome is what the store now holds
    let (goal, tasks) = state
        .get_goal_with_tasks(&outcome.goal.id)
        .await
        .expect("Failed to load goal");
    assert_eq!(goal.task_count, 7);
    assert_eq!(tasks.len(), 7);
    let stored = tasks
        .iter()
        .find(|t| t.id == integration.id)
        .expect("integration task should be stored");
    assert_eq!(stored.dependencies, integration.dependencies);
}

#[tokio::test]
async fn test_ai_plan_with_surrounding_prose() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let state = StateManager::spawn(temp_dir.path()).expect("Failed to spawn state manager");

    let reply = r#"Here is your plan:
[
  {"title": "Pick a venue", "priority": "HIGH", "estimatedHours": "6"},
  {"title": "Send invitations", "dependencies": ["Pick a venue", "Book a band"]}
]
Good luck!"#;
    let llm: Arc<dyn LlmClient> = Arc::new(CannedClient(reply.to_string()));

    let outcome = decomposer(&state, Some(llm))
        .generate(GenerateRequest::new("Organize a family reunion"))
        .await
        .expect("generate should succeed");

    assert_eq!(outcome.source, TaskSource::Ai);
    assert_eq!(outcome.tasks.len(), 2);
    assert_eq!(outcome.tasks[0].priority, Priority::High);
    assert_eq!(outcome.tasks[0].estimated_hours, 6.0);
    assert_eq!(outcome.tasks[1].dependencies, vec![outcome.tasks[0].id.clone()]);
    assert_eq!(outcome.warnings.len(), 1, "unknown dependency should be reported");
}

#[tokio::test]
async fn test_garbage_reply_falls_back() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let state = StateManager::spawn(temp_dir.path()).expect("Failed to spawn state manager");
    let llm: Arc<dyn LlmClient> = Arc::new(CannedClient("[not json at all]".to_string()));

    let outcome = decomposer(&state, Some(llm))
        .generate(GenerateRequest::new("Redesign the company website"))
        .await
        .expect("generate should succeed");

    assert_eq!(outcome.source, TaskSource::Fallback);
    assert_eq!(outcome.tasks.len(), 6);
}

#[tokio::test]
async fn test_completed_status_sets_full_progress() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let state = StateManager::spawn(temp_dir.path()).expect("Failed to spawn state manager");
    let outcome = decomposer(&state, None)
        .generate(GenerateRequest::new("Learn to play the guitar"))
        .await
        .expect("generate should succeed");

    let task = state
        .update_task_status(&outcome.tasks[0].id, TaskStatus::Completed, None)
        .await
        .expect("Failed to update status");
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.progress, 100);
}

#[tokio::test]
async fn test_delete_goal_reports_deleted_tasks() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let state = StateManager::spawn(temp_dir.path()).expect("Failed to spawn state manager");
    let reply = r#"[{"title": "One"}, {"title": "Two"}, {"title": "Three"}]"#;
    let llm: Arc<dyn LlmClient> = Arc::new(CannedClient(reply.to_string()));

    let outcome = decomposer(&state, Some(llm))
        .generate(GenerateRequest::new("Run a small experiment"))
        .await
        .expect("generate should succeed");
    assert_eq!(outcome.tasks.len(), 3);

    let deleted = state.delete_goal(&outcome.goal.id).await.expect("Failed to delete goal");
    assert_eq!(deleted, 3);
    assert!(state.get_goal(&outcome.goal.id).await.expect("get_goal failed").is_none());
    let remaining = state.list_tasks(None, None).await.expect("Failed to list tasks");
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn test_delete_shared_prerequisite_unlinks_dependents() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let state = StateManager::spawn(temp_dir.path()).expect("Failed to spawn state manager");
    let reply = r#"[
        {"title": "Base"},
        {"title": "Left", "dependencies": ["Base"]},
        {"title": "Right", "dependencies": ["Base"]}
    ]"#;
    let llm: Arc<dyn LlmClient> = Arc::new(CannedClient(reply.to_string()));

    let outcome = decomposer(&state, Some(llm))
        .generate(GenerateRequest::new("Build a small shed"))
        .await
        .expect("generate should succeed");
    let base = outcome.tasks[0].id.clone();

    state.delete_task(&base).await.expect("Failed to delete task");

    for dependent in &outcome.tasks[1..] {
        let task = state
            .get_task(&dependent.id)
            .await
            .expect("get_task failed")
            .expect("dependent should still exist");
        assert!(task.dependencies.is_empty(), "{} still depends on Base", task.title);
    }
    let goal = state
        .get_goal(&outcome.goal.id)
        .await
        .expect("get_goal failed")
        .expect("goal should still exist");
    assert_eq!(goal.task_count, 2);
}

#[tokio::test]
async fn test_analytics_after_generation() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let state = StateManager::spawn(temp_dir.path()).expect("Failed to spawn state manager");
    let outcome = decomposer(&state, None)
        .generate(GenerateRequest::new("Launch a mobile app"))
        .await
        .expect("generate should succeed");
    state
        .update_task_status(&outcome.tasks[0].id, TaskStatus::Completed, None)
        .await
        .expect("Failed to update status");

    let analytics = state.get_analytics(chrono::Utc::now()).await.expect("analytics failed");
    assert_eq!(analytics.overview.total_goals, 1);
    assert_eq!(analytics.overview.total_tasks, 7);
    assert_eq!(analytics.overview.completed_tasks, 1);
    assert_eq!(analytics.overview.completion_rate, 14);
}

// =============================================================================
// CLI
// =============================================================================

fn write_config(dir: &TempDir) -> std::path::PathBuf {
    let store = dir.path().join("store");
    let config = format!(
        "llm:\n  api-key-env: TASKPLANNER_IT_UNSET_KEY\nstorage:\n  taskstore-dir: {}\n",
        store.display()
    );
    let path = dir.path().join("taskplanner.yml");
    std::fs::write(&path, config).expect("Failed to write config");
    path
}

fn tp(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tp").expect("tp binary should build");
    cmd.env("HOME", dir.path())
        .env("XDG_DATA_HOME", dir.path().join("data"))
        .env_remove("TASKPLANNER_IT_UNSET_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_generate_offline_json() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(&dir);

    let output = tp(&dir)
        .arg("-c")
        .arg(&config)
        .args(["generate", "Launch a mobile app in 2 weeks", "--format", "json"])
        .output()
        .expect("Failed to run tp");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["success"], true);
    assert_eq!(json["source"], "fallback");
    assert_eq!(json["tasks"].as_array().map(Vec::len), Some(7));
    assert_eq!(json["goal"]["task_count"], 7);

    tp(&dir)
        .arg("-c")
        .arg(&config)
        .args(["goals", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Launch a mobile app in 2 weeks"));
}

#[test]
fn test_cli_rejects_short_goal() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(&dir);

    tp(&dir)
        .arg("-c")
        .arg(&config)
        .args(["generate", "app"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 5 characters"));
}
