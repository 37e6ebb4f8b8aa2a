//! TaskPlanner configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main TaskPlanner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Task generation settings
    pub planner: PlannerConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// 1. Explicit `--config` path (errors are fatal)
    /// 2. `./.taskplanner.yml`
    /// 3. `~/.config/taskplanner/taskplanner.yml`
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        debug!(?config_path, "Config::load: called");
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = PathBuf::from(".taskplanner.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("taskplanner").join("taskplanner.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("groq" or "openai", both speak the Chat Completions API)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            base_url: "https://api.groq.com/openai".to_string(),
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    ///
    /// Unset and empty are both treated as missing.
    pub fn api_key(&self) -> Option<String> {
        debug!(api_key_env = %self.api_key_env, "LlmConfig::api_key: called");
        std::env::var(&self.api_key_env).ok().filter(|k| !k.trim().is_empty())
    }
}

/// Task generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum tokens per generation response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Sampling temperature; higher favors more varied breakdowns
    pub temperature: f32,

    /// Directory holding prompt overrides (`{name}.pmt`)
    #[serde(rename = "prompts-dir")]
    pub prompts_dir: PathBuf,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_tokens: 3000,
            temperature: 0.8,
            prompts_dir: PathBuf::from(".taskplanner/prompts"),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for TaskStore data
    #[serde(rename = "taskstore-dir")]
    pub taskstore_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/taskplanner on Linux)
        let taskstore_dir = dirs::data_dir()
            .map(|d| d.join("taskplanner"))
            .unwrap_or_else(|| PathBuf::from(".taskstore"))
            .to_string_lossy()
            .into_owned();

        Self { taskstore_dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "groq");
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.planner.max_tokens, 3000);
        assert!((config.planner.temperature - 0.8).abs() < f32::EPSILON);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: openai
  model: gpt-4o-mini
  api-key-env: MY_API_KEY
  base-url: https://api.example.com
  timeout-ms: 60000

planner:
  max-tokens: 2000
  temperature: 0.2

storage:
  taskstore-dir: /tmp/plans

log-level: DEBUG
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.timeout_ms, 60000);
        assert_eq!(config.planner.max_tokens, 2000);
        assert_eq!(config.storage.taskstore_dir, "/tmp/plans");
        assert_eq!(config.log_level.as_deref(), Some("DEBUG"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: llama-3.3-70b-versatile
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.provider, "groq");
        assert_eq!(config.llm.base_url, "https://api.groq.com/openai");
        assert_eq!(config.planner.max_tokens, 3000);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "planner:\n  max-tokens: 1234\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.planner.max_tokens, 1234);
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let path = PathBuf::from("/nonexistent/taskplanner.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    #[serial]
    fn test_api_key_missing_or_empty() {
        let config = LlmConfig {
            api_key_env: "TASKPLANNER_TEST_KEY".to_string(),
            ..Default::default()
        };

        unsafe { std::env::remove_var("TASKPLANNER_TEST_KEY") };
        assert!(config.api_key().is_none());

        unsafe { std::env::set_var("TASKPLANNER_TEST_KEY", "  ") };
        assert!(config.api_key().is_none());

        unsafe { std::env::set_var("TASKPLANNER_TEST_KEY", "secret") };
        assert_eq!(config.api_key().as_deref(), Some("secret"));

        unsafe { std::env::remove_var("TASKPLANNER_TEST_KEY") };
    }
}
