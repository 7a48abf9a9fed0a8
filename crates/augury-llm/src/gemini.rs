//! Gemini - Google Gemini API provider
//!
//! This module implements the Google Gemini `generateContent` call using reqwest,
//! and maps Gemini's failure signals onto [`Error`] variants.

use crate::error::{Error, Result};
use crate::generation::{GenerationRequest, GenerationResponse, SafetySetting};
use crate::provider::CompletionService;
use crate::util::{mask_api_key, sanitize_error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default API base URL
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "no_safety_settings")]
    safety_settings: &'a [SafetySetting],
}

fn no_safety_settings(settings: &&[SafetySetting]) -> bool {
    settings.is_empty()
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

// ============================================================================
// Error mapping
// ============================================================================

/// Map a non-success Gemini HTTP response onto an [`Error`].
///
/// Order matters: an overloaded 503 must not be reported as a generic
/// server error, and a 400 mentioning an invalid key is an auth failure.
fn map_http_error(status: u16, body: &str) -> Error {
    let (api_status, message) = match serde_json::from_str::<GeminiError>(body) {
        Ok(parsed) => (parsed.error.status, parsed.error.message),
        Err(_) => (String::new(), body.to_string()),
    };
    let detail = sanitize_error(&if api_status.is_empty() {
        format!("HTTP {}: {}", status, message)
    } else {
        format!("{}: {}", api_status, message)
    });
    let lower = message.to_lowercase();

    if status == 503 || api_status == "UNAVAILABLE" || lower.contains("overloaded") {
        return Error::Overloaded(detail);
    }
    if status == 429
        || api_status == "RESOURCE_EXHAUSTED"
        || lower.contains("quota")
        || lower.contains("rate limit")
    {
        return Error::RateLimit(detail);
    }
    if status == 401
        || status == 403
        || api_status == "UNAUTHENTICATED"
        || api_status == "PERMISSION_DENIED"
        || lower.contains("api key not valid")
        || lower.contains("api_key_invalid")
    {
        return Error::Auth(detail);
    }
    if lower.contains("safety") || lower.contains("blocked") {
        return Error::Safety(detail);
    }
    if (500..600).contains(&status) {
        return Error::ServerError(detail);
    }
    Error::Api(detail)
}

/// Map a transport-level reqwest failure onto an [`Error`].
fn map_transport_error(error: reqwest::Error, timeout: Duration) -> Error {
    if error.is_timeout() {
        Error::Timeout(timeout.as_millis() as u64)
    } else {
        Error::Network(sanitize_error(&error.to_string()))
    }
}

/// Pull the generated text out of a successful response body.
fn extract_text(response: GeminiResponse, model: &str) -> Result<GenerationResponse> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(Error::Safety(format!("prompt blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::InvalidResponse("No candidates in response".to_string()))?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(Error::Safety("candidate blocked: SAFETY".to_string()));
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if candidate.finish_reason.as_deref() == Some("MAX_TOKENS") {
        debug!(model, chars = text.chars().count(), "Gemini output hit MAX_TOKENS");
    }

    Ok(GenerationResponse {
        text,
        finish_reason: candidate.finish_reason,
        model: model.to_string(),
    })
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Gemini provider configuration
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key (sent as `?key=`)
    pub api_key: String,
    /// Base URL
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

// SECURITY: Custom Debug implementation to mask credentials
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiConfig {
    /// Create a new configuration with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `GEMINI_API_KEY`, falling back to `GOOGLE_API_KEY`.
    /// `GEMINI_BASE_URL` overrides the endpoint.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| {
                Error::NotConfigured("GEMINI_API_KEY or GOOGLE_API_KEY not set".to_string())
            })?;

        if api_key.trim().is_empty() {
            return Err(Error::NotConfigured("Gemini API key is empty".to_string()));
        }

        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self::new(api_key).with_base_url(base_url))
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn build_request<'a>(request: &'a GenerationRequest) -> GeminiRequest<'a> {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(request.prompt.clone()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.params.temperature,
                top_k: request.params.top_k,
                top_p: request.params.top_p,
                max_output_tokens: request.params.max_output_tokens,
            },
            safety_settings: &request.safety,
        }
    }
}

#[async_trait::async_trait]
impl CompletionService for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(max_tokens = request.params.max_output_tokens))]
    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse> {
        // SECURITY: Don't log the full URL (contains API key)
        debug!("Sending request to Gemini model: {}", model);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, model, self.config.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&Self::build_request(request))
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout))?;

        if !status.is_success() {
            let error = map_http_error(status.as_u16(), &body);
            warn!(status = %status, model, error = %error, "Gemini API error response");
            return Err(error);
        }

        let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            Error::InvalidResponse(format!("{}: {}", e, crate::util::truncate_safe(&body, 200)))
        })?;

        extract_text(parsed, model)
    }
}
