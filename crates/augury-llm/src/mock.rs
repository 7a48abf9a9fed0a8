//! Mock completion service for testing
//!
//! Replies are scripted per model and consumed in order. Once a model's
//! script runs out, the fallback reply is used. Test mocks record every call
//! so tests can assert which models were tried and how often; the canned
//! service used by `llm.provider = "mock"` records nothing.

use crate::error::{Error, Result};
use crate::generation::{GenerationRequest, GenerationResponse};
use crate::provider::CompletionService;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

const CANNED_REPLY: &str = "The stars are aligned in your favor today. \
    A door you thought was closed opens again, and the people around you are ready to help. \
    Trust what you feel and take the first step.";

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this text
    Text(String),
    /// Fail with the given error
    Fail(Error),
}

impl MockReply {
    /// Text reply
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Generic (retryable) API failure
    #[must_use]
    pub fn api_error(message: impl Into<String>) -> Self {
        Self::Fail(Error::Api(message.into()))
    }
}

/// A recorded call
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    /// Model the call was made against
    pub model: String,
    /// Prompt that was sent
    pub prompt: String,
    /// Requested output budget
    pub max_output_tokens: u32,
}

/// A scripted completion service
pub struct MockService {
    scripts: Arc<Mutex<HashMap<String, VecDeque<MockReply>>>>,
    fallback: MockReply,
    calls: Arc<Mutex<Vec<MockCall>>>,
    record_calls: bool,
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockService {
    /// Create a recording mock that answers every call with a canned text.
    #[must_use]
    pub fn new() -> Self {
        Self::with_fallback(MockReply::text(CANNED_REPLY))
    }

    /// Create a canned service for long-running local servers.
    ///
    /// Nothing is recorded, so [`calls`](Self::calls) stays empty.
    #[must_use]
    pub fn canned() -> Self {
        Self {
            record_calls: false,
            ..Self::new()
        }
    }

    /// Create a mock with a custom reply for unscripted calls.
    #[must_use]
    pub fn with_fallback(fallback: MockReply) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(HashMap::new())),
            fallback,
            calls: Arc::new(Mutex::new(Vec::new())),
            record_calls: true,
        }
    }

    /// Create a mock whose every call fails with the given error.
    #[must_use]
    pub fn failing(error: Error) -> Self {
        Self::with_fallback(MockReply::Fail(error))
    }

    /// Queue a reply for a model.
    pub fn push(&self, model: impl Into<String>, reply: MockReply) {
        self.scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(model.into())
            .or_default()
            .push_back(reply);
    }

    /// Queue the same reply `times` times for a model.
    pub fn push_repeated(&self, model: impl Into<String>, reply: MockReply, times: usize) {
        let model = model.into();
        for _ in 0..times {
            self.push(model.clone(), reply.clone());
        }
    }

    /// All calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of calls made against a model.
    #[must_use]
    pub fn call_count(&self, model: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|c| c.model == model)
            .count()
    }
}

#[async_trait::async_trait]
impl CompletionService for MockService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse> {
        if self.record_calls {
            self.calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(MockCall {
                    model: model.to_string(),
                    prompt: request.prompt.clone(),
                    max_output_tokens: request.params.max_output_tokens,
                });
        }

        let reply = self
            .scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(model)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| self.fallback.clone());

        match reply {
            MockReply::Text(text) => Ok(GenerationResponse {
                text,
                finish_reason: Some("STOP".to_string()),
                model: model.to_string(),
            }),
            MockReply::Fail(error) => Err(error),
        }
    }
}
