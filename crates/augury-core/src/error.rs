//! Error types for augury-core

use thiserror::Error;

/// Rejected caller input, detected before any generation happens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Request body could not be parsed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Persona payload absent, null, or not an object
    #[error("persona data is missing")]
    MissingPersonaData,

    /// User message absent or blank
    #[error("user message is missing")]
    MissingUserMessage,

    /// User message over the configured character limit
    #[error("user message too long: {actual} > {max} characters")]
    MessageTooLong {
        /// Configured limit
        max: usize,
        /// Actual length
        actual: usize,
    },
}

/// Last failure observed for one model of the cascade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFailure {
    /// Model identifier
    pub model: String,
    /// Attempts made against this model
    pub attempts: u32,
    /// Description of the last failed attempt
    pub last_failure: String,
}

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Caller input rejected
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No persona registered under this id
    #[error("persona not found: {0}")]
    PersonaNotFound(String),

    /// Completion service error that ended the request
    #[error("llm error: {0}")]
    Llm(#[from] augury_llm::Error),

    /// Every model of the cascade exhausted its attempts
    #[error("all models unavailable: {}", format_failures(.failures))]
    AllModelsUnavailable {
        /// Last failure per attempted model, in cascade order
        failures: Vec<ModelFailure>,
    },

    /// Generation produced no usable text
    #[error("empty response")]
    EmptyResponse,

    /// Invalid persona or engine configuration
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Model ids attempted before the cascade gave up (empty for other errors)
    #[must_use]
    pub fn attempted_models(&self) -> Vec<&str> {
        match self {
            Error::AllModelsUnavailable { failures } => {
                failures.iter().map(|f| f.model.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn format_failures(failures: &[ModelFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({} attempts, last: {})", f.model, f.attempts, f.last_failure))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
