//! Oracle Engine
//!
//! One pipeline serves every persona:
//! validate → persona lookup → access gate → prompt → model cascade →
//! repair → (partial tier) teaser.
//!
//! The engine holds no session state; every counter the gate reads comes
//! with the request. Failures at any stage are classified into a
//! well-formed [`ChatResponse`], so [`OracleEngine::chat`] never fails.

use crate::chat::{ChatRequest, ChatResponse, DEFAULT_MAX_MESSAGE_CHARS};
use crate::classify::classify;
use crate::error::{Error, Result};
use crate::gate::{decide, Tier};
use crate::orchestrator::Orchestrator;
use crate::persona::PersonaRegistry;
use crate::prompt::{build_prompt, DEFAULT_HISTORY_TURNS};
use crate::{repair, teaser};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

#[cfg(test)]
mod tests;

/// Request-shaping limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Maximum user message length in characters
    pub max_message_chars: usize,
    /// History turns included in the prompt
    pub history_turns: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
            history_turns: DEFAULT_HISTORY_TURNS,
        }
    }
}

/// Response plus the HTTP status it should be sent with
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// HTTP status (200 on success, classifier status otherwise)
    pub status: u16,
    /// Response body
    pub response: ChatResponse,
}

impl ChatOutcome {
    /// Whether a reply was produced
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.response.success
    }
}

/// The shared generation and access-gating engine
pub struct OracleEngine {
    personas: Arc<PersonaRegistry>,
    orchestrator: Orchestrator,
    settings: EngineSettings,
}

impl OracleEngine {
    /// Create an engine over a persona registry
    #[must_use]
    pub fn new(personas: PersonaRegistry, orchestrator: Orchestrator) -> Self {
        Self {
            personas: Arc::new(personas),
            orchestrator,
            settings: EngineSettings::default(),
        }
    }

    /// Replace request-shaping limits
    #[must_use]
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Registered personas
    #[must_use]
    pub fn personas(&self) -> &PersonaRegistry {
        &self.personas
    }

    /// Limits in use
    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Handle one chat request for a persona.
    #[instrument(
        skip(self, request),
        fields(persona = %persona_id, message_count = request.message_count)
    )]
    pub async fn chat(&self, persona_id: &str, request: &ChatRequest) -> ChatOutcome {
        match self.respond(persona_id, request).await {
            Ok(response) => ChatOutcome {
                status: 200,
                response,
            },
            Err(e) => {
                let classification = classify(&e);
                if classification.status >= 500 {
                    error!(code = %classification.code, "Chat failed: {}", e);
                } else {
                    warn!(code = %classification.code, "Chat rejected: {}", e);
                }
                ChatOutcome {
                    status: classification.status,
                    response: ChatResponse::failure(&classification),
                }
            }
        }
    }

    async fn respond(&self, persona_id: &str, request: &ChatRequest) -> Result<ChatResponse> {
        let message = request.validate(self.settings.max_message_chars)?;

        let persona = self
            .personas
            .get(persona_id)
            .ok_or_else(|| Error::PersonaNotFound(persona_id.to_string()))?;

        let decision = decide(
            request.message_count,
            request.is_premium_user,
            request.bonus_credits,
            persona.free_message_limit(),
        );

        let prompt = build_prompt(
            &persona,
            decision.tier,
            &request.conversation_history,
            self.settings.history_turns,
            message,
        );

        let generation = self
            .orchestrator
            .generate(&persona, &prompt, decision.tier)
            .await?;

        let profile = persona.profile(decision.tier);
        let text = repair::repair(
            &generation.text,
            persona.terminators(),
            profile.repair_threshold,
        );
        if text.is_empty() {
            return Err(Error::EmptyResponse);
        }

        info!(
            tier = %decision.tier,
            model = %generation.model,
            attempts = generation.attempts.len(),
            free_messages_remaining = decision.free_messages_remaining,
            "Chat answered"
        );

        Ok(match decision.tier {
            Tier::Full => ChatResponse::full(text, &decision),
            Tier::Partial => ChatResponse::partial(
                teaser::synthesize(&text, persona.hook_template()),
                &decision,
                persona.paywall_message(),
            ),
        })
    }
}
