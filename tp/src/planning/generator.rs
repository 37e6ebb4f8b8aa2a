//! Generation Client
//!
//! Asks the text-generation service for a task breakdown and pulls the JSON
//! array out of whatever text comes back. Output is raw and untrusted; the
//! normalizer makes it safe.

use std::sync::{Arc, LazyLock};
use std::time::Instant;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::GenerationError;
use super::prompt::{PromptBuilder, PromptContext};
use crate::config::{Config, PlannerConfig};
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message, StopReason, create_client};
use crate::prompts::PromptLoader;

/// First `[` followed by `{`, through the last `}` followed by `]`
static TASK_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[\s*\{.*\}\s*\]").expect("task array pattern is valid"));

/// Calls the generation service and extracts candidate tasks
pub struct GenerationClient {
    /// None when no credential is configured; every call then fails fast
    llm: Option<Arc<dyn LlmClient>>,
    prompts: PromptBuilder,
    max_tokens: u32,
    temperature: f32,
    /// Why `llm` is None, reported in `MissingCredential`
    unavailable_reason: String,
}

impl GenerationClient {
    pub fn new(llm: Option<Arc<dyn LlmClient>>, prompts: PromptBuilder, planner: &PlannerConfig) -> Self {
        debug!(has_llm = llm.is_some(), "GenerationClient::new: called");
        Self {
            llm,
            prompts,
            max_tokens: planner.max_tokens,
            temperature: planner.temperature,
            unavailable_reason: "no LLM client configured".to_string(),
        }
    }

    /// Build from configuration
    ///
    /// A missing API key or unknown provider doesn't fail here: the client is
    /// created without a service and every generation reports
    /// `MissingCredential`, which routes requests to the fallback.
    pub fn from_config(config: &Config) -> Self {
        debug!(provider = %config.llm.provider, "GenerationClient::from_config: called");
        let prompts = PromptBuilder::new(PromptLoader::new(&config.planner.prompts_dir));
        match create_client(&config.llm) {
            Ok(llm) => Self::new(Some(llm), prompts, &config.planner),
            Err(e) => {
                warn!(error = %e, "Generation service unavailable, tasks will come from local templates");
                let mut client = Self::new(None, prompts, &config.planner);
                client.unavailable_reason = e.to_string();
                client
            }
        }
    }

    /// Whether a generation service is configured
    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    /// Generate raw candidate tasks for a goal
    pub async fn generate(&self, context: &PromptContext) -> Result<Vec<Value>, GenerationError> {
        debug!(goal = %context.goal, "GenerationClient::generate: called");
        let llm = self
            .llm
            .as_ref()
            .ok_or_else(|| GenerationError::MissingCredential(self.unavailable_reason.clone()))?;

        let prompt = self
            .prompts
            .build(context)
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;
        let system_prompt = self
            .prompts
            .system_prompt()
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;

        let request = CompletionRequest {
            system_prompt,
            messages: vec![Message::user(prompt)],
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
        };

        let started = Instant::now();
        let response = llm.complete(request).await?;
        let text = response
            .content
            .ok_or_else(|| GenerationError::Service(LlmError::InvalidResponse("response had no content".to_string())))?;
        info!(
            response_len = text.len(),
            output_tokens = response.usage.output_tokens,
            total_tokens = response.usage.total(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Received generation response"
        );
        if response.stop_reason == StopReason::MaxTokens {
            warn!(max_tokens = self.max_tokens, "Generation hit the token limit, the task array may be cut short");
        }

        let array = extract_task_array(&text)?;
        let tasks = parse_task_array(array)?;
        debug!(task_count = tasks.len(), "GenerationClient::generate: parsed tasks");
        Ok(tasks)
    }
}

/// Find the embedded array-of-objects in free text
pub fn extract_task_array(text: &str) -> Result<&str, GenerationError> {
    debug!(text_len = text.len(), "extract_task_array: called");
    TASK_ARRAY.find(text).map(|m| m.as_str()).ok_or_else(|| {
        let preview: String = text.chars().take(80).collect();
        GenerationError::Extraction(format!("no bracketed array of objects in {:?}", preview))
    })
}

/// Decode an extracted array into untyped candidate objects
pub fn parse_task_array(json: &str) -> Result<Vec<Value>, GenerationError> {
    debug!(json_len = json.len(), "parse_task_array: called");
    serde_json::from_str::<Vec<Value>>(json).map_err(|e| GenerationError::Parse(e.to_string()))
}
