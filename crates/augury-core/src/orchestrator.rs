//! Generation Orchestrator
//!
//! Drives the model cascade: every model in a persona's cascade gets a
//! bounded number of attempts, strictly one after another. An attempt is
//! accepted once the trimmed text reaches the tier's minimum length. Errors
//! and short answers are retried within the model, an exhausted model hands
//! over to the next one, and an exhausted cascade is an error listing the
//! last failure of every model.
//!
//! Authentication and safety rejections are not transient; they stop the
//! cascade at once.

use crate::error::{Error, ModelFailure, Result};
use crate::gate::Tier;
use crate::persona::PersonaConfig;
use augury_llm::util::sanitize_error;
use augury_llm::{CompletionService, GenerationRequest, SafetySetting};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Attempt counts and fixed delays of the cascade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per model before advancing
    pub attempts_per_model: u32,
    /// Wait between attempts on the same model
    pub attempt_delay: Duration,
    /// Wait before advancing to the next model
    pub model_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts_per_model: 3,
            attempt_delay: Duration::from_millis(500),
            model_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Create the default policy (3 attempts, 500 ms / 1000 ms)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default attempt count without any waiting
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            attempt_delay: Duration::ZERO,
            model_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Set attempts per model (at least one attempt is always made)
    #[must_use]
    pub fn with_attempts_per_model(mut self, attempts: u32) -> Self {
        self.attempts_per_model = attempts.max(1);
        self
    }

    /// Set the wait between attempts
    #[must_use]
    pub fn with_attempt_delay(mut self, delay: Duration) -> Self {
        self.attempt_delay = delay;
        self
    }

    /// Set the wait between models
    #[must_use]
    pub fn with_model_delay(mut self, delay: Duration) -> Self {
        self.model_delay = delay;
        self
    }
}

/// What a single attempt produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Accepted text
    Success(String),
    /// Text below the tier minimum
    TooShort {
        /// Trimmed length in characters
        chars: usize,
    },
    /// Service error (sanitized)
    Error(String),
}

impl AttemptOutcome {
    /// Whether the attempt was accepted
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    fn describe(&self) -> String {
        match self {
            Self::Success(_) => "success".to_string(),
            Self::TooShort { chars } => format!("too short ({} chars)", chars),
            Self::Error(message) => message.clone(),
        }
    }
}

/// Record of one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAttemptResult {
    /// Model the attempt ran against
    pub model_id: String,
    /// 1-based attempt number within the model
    pub attempt_number: u32,
    /// Outcome
    pub outcome: AttemptOutcome,
}

/// Accepted generation
#[derive(Debug, Clone)]
pub struct Generation {
    /// Accepted text, as returned by the service
    pub text: String,
    /// Model that produced it
    pub model: String,
    /// Every attempt made, including the accepted one
    pub attempts: Vec<ModelAttemptResult>,
}

/// Cascade driver over a completion service
pub struct Orchestrator {
    service: Arc<dyn CompletionService>,
    policy: RetryPolicy,
    safety: Vec<SafetySetting>,
}

impl Orchestrator {
    /// Orchestrator with the default policy and standard safety settings
    #[must_use]
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self {
            service,
            policy: RetryPolicy::default(),
            safety: SafetySetting::standard(),
        }
    }

    /// Replace the retry policy
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the safety settings sent with every request
    #[must_use]
    pub fn with_safety(mut self, safety: Vec<SafetySetting>) -> Self {
        self.safety = safety;
        self
    }

    /// Run the cascade for one prompt.
    ///
    /// # Errors
    /// - [`Error::Llm`] for authentication, safety or configuration failures
    /// - [`Error::AllModelsUnavailable`] once every model is exhausted
    #[instrument(skip(self, persona, prompt), fields(persona = %persona.id(), tier = %tier))]
    pub async fn generate(
        &self,
        persona: &PersonaConfig,
        prompt: &str,
        tier: Tier,
    ) -> Result<Generation> {
        let profile = persona.profile(tier);
        let request = GenerationRequest::new(prompt)
            .with_params(profile.params())
            .with_safety(self.safety.clone());

        let cascade = persona.model_cascade();
        let per_model = self.policy.attempts_per_model.max(1);
        let mut attempts = Vec::new();
        let mut failures = Vec::with_capacity(cascade.len());

        for (index, model) in cascade.iter().enumerate() {
            let mut last_failure = String::new();

            for attempt in 1..=per_model {
                let outcome = match self.service.generate(model, &request).await {
                    Ok(response) => {
                        let chars = response.text.trim().chars().count();
                        if chars >= profile.min_length {
                            AttemptOutcome::Success(response.text)
                        } else {
                            AttemptOutcome::TooShort { chars }
                        }
                    }
                    Err(e) if e.is_fatal() => {
                        warn!(
                            model = %model,
                            attempt = attempt,
                            error = %sanitize_error(&e.to_string()),
                            "Non-retryable completion error, stopping cascade"
                        );
                        return Err(e.into());
                    }
                    Err(e) => AttemptOutcome::Error(sanitize_error(&e.to_string())),
                };

                attempts.push(ModelAttemptResult {
                    model_id: model.clone(),
                    attempt_number: attempt,
                    outcome: outcome.clone(),
                });

                if let AttemptOutcome::Success(text) = outcome {
                    info!(
                        model = %model,
                        attempt = attempt,
                        total_attempts = attempts.len(),
                        "Generation accepted"
                    );
                    return Ok(Generation {
                        text,
                        model: model.clone(),
                        attempts,
                    });
                }

                last_failure = outcome.describe();
                debug!(
                    model = %model,
                    attempt = attempt,
                    max_attempts = per_model,
                    failure = %last_failure,
                    "Attempt rejected"
                );

                if attempt < per_model && !self.policy.attempt_delay.is_zero() {
                    sleep(self.policy.attempt_delay).await;
                }
            }

            warn!(
                model = %model,
                attempts = per_model,
                last_failure = %last_failure,
                "Model exhausted"
            );
            failures.push(ModelFailure {
                model: model.clone(),
                attempts: per_model,
                last_failure,
            });

            if index + 1 < cascade.len() && !self.policy.model_delay.is_zero() {
                sleep(self.policy.model_delay).await;
            }
        }

        Err(Error::AllModelsUnavailable { failures })
    }
}
