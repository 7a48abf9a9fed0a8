//! Persona configuration
//!
//! One TOML file per advisor, e.g.:
//!
//! ```toml
//! [persona]
//! id = "tarot"
//! name = "Tarot Reader"
//! instructions = "You are a tarot reader..."
//!
//! [generation]
//! model_cascade = ["gemini-2.5-flash-lite", "gemini-2.0-flash"]
//! free_message_limit = 3
//!
//! [generation.full]
//! min_length = 80
//! repair_threshold = 80
//! max_output_tokens = 1024
//!
//! [generation.partial]
//! min_length = 100
//! repair_threshold = 80
//! max_output_tokens = 400
//!
//! [teaser]
//! hook = "\n\n🔒 ..."
//! paywall_message = "Unlock the full reading"
//! ```

use crate::error::{Error, Result};
use crate::gate::Tier;
use augury_llm::GenerationParams;
use serde::{Deserialize, Serialize};

/// Default number of free messages per session
pub const DEFAULT_FREE_MESSAGE_LIMIT: u32 = 3;

/// Identity and instruction block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaInfo {
    /// Stable id, used in routes
    pub id: String,
    /// Display name (also used as the advisor role in history)
    pub name: String,
    /// Short description (optional)
    #[serde(default)]
    pub description: Option<String>,
    /// Instruction block sent ahead of every conversation
    pub instructions: String,
}

/// Generation parameters and length thresholds for one tier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierProfile {
    /// Minimum accepted output length (characters, after trimming)
    pub min_length: usize,
    /// Length a sentence-aligned prefix must exceed during repair
    pub repair_threshold: usize,
    /// Output token budget
    pub max_output_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Top-k sampling
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// Nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Extra instructions appended for this tier
    #[serde(default)]
    pub guidance: Option<String>,
}

impl TierProfile {
    /// Parameter bundle for the completion service
    #[must_use]
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            top_k: self.top_k,
            top_p: self.top_p,
            max_output_tokens: self.max_output_tokens,
        }
    }

    fn validate(&self, persona: &str, tier: Tier) -> Result<()> {
        if self.max_output_tokens == 0 {
            return Err(Error::Configuration(format!(
                "{}: {} max_output_tokens must be > 0",
                persona, tier
            )));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::Configuration(format!(
                "{}: {} temperature out of range: {}",
                persona, tier, self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(Error::Configuration(format!(
                "{}: {} top_p out of range: {}",
                persona, tier, self.top_p
            )));
        }
        Ok(())
    }
}

fn default_temperature() -> f32 {
    0.8
}

fn default_top_k() -> u32 {
    40
}

fn default_top_p() -> f32 {
    0.95
}

fn default_free_message_limit() -> u32 {
    DEFAULT_FREE_MESSAGE_LIMIT
}

/// Cascade and per-tier profiles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Models in preference order
    pub model_cascade: Vec<String>,
    /// Free messages before the paywall
    #[serde(default = "default_free_message_limit")]
    pub free_message_limit: u32,
    /// Profile for full answers
    pub full: TierProfile,
    /// Profile for teaser answers
    pub partial: TierProfile,
}

/// Accepted trailing characters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSettings {
    /// Extra terminators (typically emoji); `. ! ? …` are always accepted
    #[serde(default = "default_terminators")]
    pub terminators: Vec<String>,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            terminators: default_terminators(),
        }
    }
}

fn default_terminators() -> Vec<String> {
    ["✨", "🔮", "⭐", "🌟", "🌙", "💫"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

/// Teaser hook and paywall copy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeaserSettings {
    /// Appended verbatim after the teaser sentences
    pub hook: String,
    /// Shown alongside the paywall
    pub paywall_message: String,
}

/// Persona configuration (loaded from TOML)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Identity and instructions
    pub persona: PersonaInfo,
    /// Cascade and tier profiles
    pub generation: GenerationSettings,
    /// Terminators
    #[serde(default)]
    pub completion: CompletionSettings,
    /// Teaser copy
    pub teaser: TeaserSettings,
}

impl PersonaConfig {
    /// Persona id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.persona.id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.persona.name
    }

    /// Models in preference order
    #[must_use]
    pub fn model_cascade(&self) -> &[String] {
        &self.generation.model_cascade
    }

    /// Free messages before the paywall
    #[must_use]
    pub fn free_message_limit(&self) -> u32 {
        self.generation.free_message_limit
    }

    /// Profile for a tier
    #[must_use]
    pub fn profile(&self, tier: Tier) -> &TierProfile {
        match tier {
            Tier::Full => &self.generation.full,
            Tier::Partial => &self.generation.partial,
        }
    }

    /// Minimum accepted output length for a tier
    #[must_use]
    pub fn min_length(&self, tier: Tier) -> usize {
        self.profile(tier).min_length
    }

    /// Extra accepted terminators
    #[must_use]
    pub fn terminators(&self) -> &[String] {
        &self.completion.terminators
    }

    /// Teaser hook
    #[must_use]
    pub fn hook_template(&self) -> &str {
        &self.teaser.hook
    }

    /// Paywall copy
    #[must_use]
    pub fn paywall_message(&self) -> &str {
        &self.teaser.paywall_message
    }

    /// Check the invariants a persona must hold before it can serve requests.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] naming the first violated rule.
    pub fn validate(&self) -> Result<()> {
        let id = self.id();
        if id.trim().is_empty() {
            return Err(Error::Configuration("persona id is empty".to_string()));
        }
        if self.persona.instructions.trim().is_empty() {
            return Err(Error::Configuration(format!("{}: instructions are empty", id)));
        }
        if self.generation.model_cascade.is_empty() {
            return Err(Error::Configuration(format!("{}: model_cascade is empty", id)));
        }
        if self
            .generation
            .model_cascade
            .iter()
            .any(|m| m.trim().is_empty())
        {
            return Err(Error::Configuration(format!(
                "{}: model_cascade contains a blank model id",
                id
            )));
        }
        if self.generation.free_message_limit < 1 {
            return Err(Error::Configuration(format!(
                "{}: free_message_limit must be >= 1",
                id
            )));
        }
        self.generation.full.validate(id, Tier::Full)?;
        self.generation.partial.validate(id, Tier::Partial)?;
        if self.generation.partial.min_length <= self.generation.full.min_length {
            return Err(Error::Configuration(format!(
                "{}: partial min_length ({}) must exceed full min_length ({})",
                id, self.generation.partial.min_length, self.generation.full.min_length
            )));
        }
        if self.teaser.hook.trim().is_empty() {
            return Err(Error::Configuration(format!("{}: teaser hook is empty", id)));
        }
        if self.teaser.paywall_message.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "{}: teaser paywall_message is empty",
                id
            )));
        }
        Ok(())
    }
}
