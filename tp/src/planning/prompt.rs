//! Prompt Builder
//!
//! Turns goal attributes into the instruction sent to the generation service.

use chrono::{DateTime, Utc};
use eyre::Result;
use serde::Serialize;
use tracing::debug;

use crate::domain::{GoalCategory, Priority};
use crate::prompts::PromptLoader;

/// Values substituted into `decompose.pmt`
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    pub goal: String,
    pub category: String,
    pub priority: String,
    /// `YYYY-MM-DD`, absent when the goal has no deadline
    pub deadline: Option<String>,
}

impl PromptContext {
    pub fn new(goal: &str, deadline: Option<DateTime<Utc>>, category: GoalCategory, priority: Priority) -> Self {
        Self {
            goal: goal.to_string(),
            category: category.to_string(),
            priority: priority.to_string(),
            deadline: deadline.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Renders the system instruction and the decomposition prompt
pub struct PromptBuilder {
    loader: PromptLoader,
}

impl PromptBuilder {
    pub fn new(loader: PromptLoader) -> Self {
        Self { loader }
    }

    /// The decomposition prompt for one goal
    ///
    /// Only fails if an override template is unreadable or malformed.
    pub fn build(&self, context: &PromptContext) -> Result<String> {
        debug!(goal = %context.goal, category = %context.category, priority = %context.priority, "PromptBuilder::build: called");
        self.loader.render("decompose", context)
    }

    /// The fixed system instruction
    pub fn system_prompt(&self) -> Result<String> {
        debug!("PromptBuilder::system_prompt: called");
        Ok(self.loader.load_template("system")?.trim().to_string())
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(PromptLoader::embedded_only())
    }
}
