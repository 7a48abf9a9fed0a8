//! Generation request and response types
//!
//! This module defines what is sent to a completion service and what comes back.

use serde::{Deserialize, Serialize};

/// Sampling parameters for one generation call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Temperature (0.0 - 2.0)
    pub temperature: f32,
    /// Top-k sampling cutoff
    pub top_k: u32,
    /// Nucleus sampling cutoff (0.0 - 1.0)
    pub top_p: f32,
    /// Maximum tokens to generate
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

/// Content-safety threshold for one harm category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    /// Harm category (e.g. `HARM_CATEGORY_HARASSMENT`)
    pub category: String,
    /// Block threshold (e.g. `BLOCK_MEDIUM_AND_ABOVE`)
    pub threshold: String,
}

impl SafetySetting {
    /// Create a safety setting
    #[must_use]
    pub fn new(category: impl Into<String>, threshold: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            threshold: threshold.into(),
        }
    }

    /// Medium-and-above blocking for the four standard harm categories
    #[must_use]
    pub fn standard() -> Vec<Self> {
        [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .into_iter()
        .map(|category| Self::new(category, "BLOCK_MEDIUM_AND_ABOVE"))
        .collect()
    }
}

/// Generation request
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Full prompt text
    pub prompt: String,
    /// Sampling parameters
    pub params: GenerationParams,
    /// Safety thresholds
    pub safety: Vec<SafetySetting>,
}

impl GenerationRequest {
    /// Create a new generation request with default parameters
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Set sampling parameters
    #[must_use]
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Set safety thresholds
    #[must_use]
    pub fn with_safety(mut self, safety: Vec<SafetySetting>) -> Self {
        self.safety = safety;
        self
    }
}

/// Generation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text
    pub text: String,
    /// Finish reason reported by the backend
    pub finish_reason: Option<String>,
    /// Model used
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_request_builder() {
        let params = GenerationParams {
            temperature: 0.7,
            top_k: 20,
            top_p: 0.9,
            max_output_tokens: 300,
        };
        let request = GenerationRequest::new("Read my stars")
            .with_params(params)
            .with_safety(SafetySetting::standard());

        assert_eq!(request.prompt, "Read my stars");
        assert_eq!(request.params.max_output_tokens, 300);
        assert_eq!(request.safety.len(), 4);
    }

    #[test]
    fn test_standard_safety_thresholds() {
        let settings = SafetySetting::standard();
        assert!(settings
            .iter()
            .all(|s| s.threshold == "BLOCK_MEDIUM_AND_ABOVE"));
        assert!(settings
            .iter()
            .any(|s| s.category == "HARM_CATEGORY_DANGEROUS_CONTENT"));
    }
}
