//! Server configuration types
//!
//! Contains all configuration structures for the Augury server.

use augury_core::{EngineSettings, RetryPolicy};
use augury_llm::SafetySetting;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub gemini: GeminiAppConfig,
    #[serde(default)]
    pub personas: PersonasConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `pretty` (default) or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Engine configuration (cascade timing and request limits)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_attempts_per_model")]
    pub attempts_per_model: u32,
    #[serde(default = "default_attempt_delay_ms")]
    pub attempt_delay_ms: u64,
    #[serde(default = "default_model_delay_ms")]
    pub model_delay_ms: u64,
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
    /// Block threshold applied to every standard harm category
    #[serde(default = "default_safety_threshold")]
    pub safety_threshold: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            attempts_per_model: default_attempts_per_model(),
            attempt_delay_ms: default_attempt_delay_ms(),
            model_delay_ms: default_model_delay_ms(),
            max_message_chars: default_max_message_chars(),
            history_turns: default_history_turns(),
            safety_threshold: default_safety_threshold(),
        }
    }
}

impl EngineConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new()
            .with_attempts_per_model(self.attempts_per_model)
            .with_attempt_delay(Duration::from_millis(self.attempt_delay_ms))
            .with_model_delay(Duration::from_millis(self.model_delay_ms))
    }

    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            max_message_chars: self.max_message_chars,
            history_turns: self.history_turns,
        }
    }

    pub fn safety_settings(&self) -> Vec<SafetySetting> {
        SafetySetting::standard()
            .into_iter()
            .map(|s| SafetySetting::new(s.category, self.safety_threshold.clone()))
            .collect()
    }
}

fn default_attempts_per_model() -> u32 {
    3
}
fn default_attempt_delay_ms() -> u64 {
    500
}
fn default_model_delay_ms() -> u64 {
    1000
}
fn default_max_message_chars() -> usize {
    augury_core::chat::DEFAULT_MAX_MESSAGE_CHARS
}
fn default_history_turns() -> usize {
    augury_core::prompt::DEFAULT_HISTORY_TURNS
}
fn default_safety_threshold() -> String {
    "BLOCK_MEDIUM_AND_ABOVE".to_string()
}

/// Completion backend selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// `gemini` or `mock`
    #[serde(default = "default_provider")]
    pub provider: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}

/// Gemini settings (the API key always comes from the environment)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiAppConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiAppConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

/// Persona file location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonasConfig {
    #[serde(default = "default_personas_dir")]
    pub dir: String,
}

impl Default for PersonasConfig {
    fn default() -> Self {
        Self {
            dir: default_personas_dir(),
        }
    }
}

fn default_personas_dir() -> String {
    augury_core::persona::DEFAULT_PERSONA_DIR.to_string()
}
