//! Chat request and response types
//!
//! Field names are camelCase on the wire.

use crate::classify::Classification;
use crate::error::ValidationError;
use crate::gate::AccessDecision;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default character limit for a user message
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 1500;

/// One prior exchange in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// `user`, or anything else for the advisor
    pub role: String,
    /// Message text
    #[serde(alias = "content")]
    pub message: String,
}

impl ConversationTurn {
    /// Whether the turn was written by the user
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role.trim().eq_ignore_ascii_case("user")
    }
}

fn default_message_count() -> u32 {
    1
}

/// Inbound chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Caller's persona descriptor (opaque beyond validation)
    #[serde(default)]
    pub persona_payload: Option<Value>,
    /// Current user message
    #[serde(default)]
    pub user_message: Option<String>,
    /// Earlier turns, oldest first
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,
    /// 1-based index of this message in the session
    #[serde(default = "default_message_count")]
    pub message_count: u32,
    /// Premium subscriber
    #[serde(default)]
    pub is_premium_user: bool,
    /// Unused bonus credits held by the caller
    #[serde(default)]
    pub bonus_credits: u32,
}

impl ChatRequest {
    /// Request carrying only a user message
    #[must_use]
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            persona_payload: None,
            user_message: Some(user_message.into()),
            conversation_history: Vec::new(),
            message_count: default_message_count(),
            is_premium_user: false,
            bonus_credits: 0,
        }
    }

    /// Set the persona payload
    #[must_use]
    pub fn with_persona_payload(mut self, payload: Value) -> Self {
        self.persona_payload = Some(payload);
        self
    }

    /// Set the session message count
    #[must_use]
    pub fn with_message_count(mut self, count: u32) -> Self {
        self.message_count = count;
        self
    }

    /// Mark the caller as premium
    #[must_use]
    pub fn with_premium(mut self, premium: bool) -> Self {
        self.is_premium_user = premium;
        self
    }

    /// Set bonus credits
    #[must_use]
    pub fn with_bonus_credits(mut self, credits: u32) -> Self {
        self.bonus_credits = credits;
        self
    }

    /// Set conversation history
    #[must_use]
    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.conversation_history = history;
        self
    }

    /// Validate the request, returning the trimmed user message.
    ///
    /// # Errors
    /// The first failed check, in order: persona payload, message presence,
    /// message length.
    pub fn validate(&self, max_message_chars: usize) -> Result<&str, ValidationError> {
        match &self.persona_payload {
            Some(Value::Object(map)) if !map.is_empty() => {}
            _ => return Err(ValidationError::MissingPersonaData),
        }

        let message = self
            .user_message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or(ValidationError::MissingUserMessage)?;

        let actual = message.chars().count();
        if actual > max_message_chars {
            return Err(ValidationError::MessageTooLong {
                max: max_message_chars,
                actual,
            });
        }

        Ok(message)
    }
}

/// Outbound chat response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Whether a reply was produced
    pub success: bool,
    /// Reply text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// User-facing error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// RFC 3339 creation time
    pub timestamp: String,
    /// Free messages left
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_messages_remaining: Option<u32>,
    /// Whether to show the paywall
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_paywall: Option<bool>,
    /// Paywall copy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paywall_message: Option<String>,
    /// False for teasers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_complete_response: Option<bool>,
}

impl ChatResponse {
    fn now() -> String {
        Utc::now().to_rfc3339()
    }

    /// Complete answer
    #[must_use]
    pub fn full(text: String, decision: &AccessDecision) -> Self {
        Self {
            success: true,
            response: Some(text),
            error: None,
            code: None,
            timestamp: Self::now(),
            free_messages_remaining: Some(decision.free_messages_remaining),
            show_paywall: Some(decision.show_paywall),
            paywall_message: None,
            is_complete_response: Some(true),
        }
    }

    /// Teaser answer
    #[must_use]
    pub fn partial(teaser: String, decision: &AccessDecision, paywall_message: &str) -> Self {
        Self {
            success: true,
            response: Some(teaser),
            error: None,
            code: None,
            timestamp: Self::now(),
            free_messages_remaining: Some(decision.free_messages_remaining),
            show_paywall: Some(decision.show_paywall),
            paywall_message: Some(paywall_message.to_string()),
            is_complete_response: Some(false),
        }
    }

    /// Failed request
    #[must_use]
    pub fn failure(classification: &Classification) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(classification.message.clone()),
            code: Some(classification.code.as_str().to_string()),
            timestamp: Self::now(),
            free_messages_remaining: None,
            show_paywall: None,
            paywall_message: None,
            is_complete_response: None,
        }
    }
}
