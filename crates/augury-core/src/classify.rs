//! Error classification
//!
//! Maps any [`Error`] onto a stable code, an HTTP status, and a message that
//! is safe to show to the end user. Rules are checked in order and the first
//! match wins; classification never fails.

use crate::error::{Error, ValidationError};
use serde::Serialize;
use std::fmt;

/// Stable, programmatic error codes returned to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed request body
    InvalidRequest,
    /// Persona payload missing
    MissingPersonaData,
    /// User message missing
    MissingUserMessage,
    /// User message over the limit
    MessageTooLong,
    /// Unknown persona id
    PersonaNotFound,
    /// Upstream overloaded
    ServiceOverloaded,
    /// Upstream quota / rate limit
    QuotaExceeded,
    /// Content-safety rejection
    SafetyFilter,
    /// Upstream rejected our credentials
    AuthError,
    /// Cascade exhausted
    AllModelsUnavailable,
    /// No usable text generated
    EmptyResponse,
    /// Anything else
    InternalError,
}

impl ErrorCode {
    /// Wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::MissingPersonaData => "MISSING_PERSONA_DATA",
            Self::MissingUserMessage => "MISSING_USER_MESSAGE",
            Self::MessageTooLong => "MESSAGE_TOO_LONG",
            Self::PersonaNotFound => "PERSONA_NOT_FOUND",
            Self::ServiceOverloaded => "SERVICE_OVERLOADED",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::SafetyFilter => "SAFETY_FILTER",
            Self::AuthError => "AUTH_ERROR",
            Self::AllModelsUnavailable => "ALL_MODELS_UNAVAILABLE",
            Self::EmptyResponse => "EMPTY_RESPONSE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// HTTP status
    pub status: u16,
    /// Stable code
    pub code: ErrorCode,
    /// User-facing message
    pub message: String,
}

impl Classification {
    fn new(status: u16, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

/// Upstream failure signal, read from the variant or, for untyped
/// errors, from the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Overloaded,
    Quota,
    Safety,
    Auth,
}

fn upstream_signal(error: &augury_llm::Error) -> Option<Signal> {
    use augury_llm::Error as Llm;

    match error {
        Llm::Overloaded(_) => Some(Signal::Overloaded),
        Llm::RateLimit(_) => Some(Signal::Quota),
        Llm::Safety(_) => Some(Signal::Safety),
        Llm::Auth(_) => Some(Signal::Auth),
        Llm::Api(msg) | Llm::ServerError(msg) | Llm::InvalidResponse(msg) => {
            signal_from_message(msg)
        }
        _ => None,
    }
}

fn signal_from_message(message: &str) -> Option<Signal> {
    let lower = message.to_lowercase();
    if lower.contains("overloaded") {
        Some(Signal::Overloaded)
    } else if lower.contains("quota")
        || lower.contains("rate limit")
        || lower.contains("resource_exhausted")
    {
        Some(Signal::Quota)
    } else if lower.contains("safety") {
        Some(Signal::Safety)
    } else if lower.contains("api key")
        || lower.contains("unauthorized")
        || lower.contains("unauthenticated")
        || lower.contains("permission denied")
    {
        Some(Signal::Auth)
    } else {
        None
    }
}

fn classify_validation(error: &ValidationError) -> Classification {
    match error {
        ValidationError::InvalidRequest(_) => Classification::new(
            400,
            ErrorCode::InvalidRequest,
            "The request could not be read. Please check the data sent.",
        ),
        ValidationError::MissingPersonaData => Classification::new(
            400,
            ErrorCode::MissingPersonaData,
            "Advisor data is required.",
        ),
        ValidationError::MissingUserMessage => Classification::new(
            400,
            ErrorCode::MissingUserMessage,
            "A message is required.",
        ),
        ValidationError::MessageTooLong { max, .. } => Classification::new(
            400,
            ErrorCode::MessageTooLong,
            format!("The message is too long (maximum {} characters).", max),
        ),
    }
}

fn classify_signal(signal: Signal) -> Classification {
    match signal {
        Signal::Overloaded => Classification::new(
            503,
            ErrorCode::ServiceOverloaded,
            "The oracle is receiving many consultations right now. Please try again in a few moments.",
        ),
        Signal::Quota => Classification::new(
            429,
            ErrorCode::QuotaExceeded,
            "The consultation limit has been reached for now. Please try again later.",
        ),
        Signal::Safety => Classification::new(
            400,
            ErrorCode::SafetyFilter,
            "Your message could not be processed. Please rephrase it.",
        ),
        Signal::Auth => Classification::new(
            401,
            ErrorCode::AuthError,
            "The oracle service is not available due to a configuration problem.",
        ),
    }
}

/// Classify an error into `{status, code, message}`.
#[must_use]
pub fn classify(error: &Error) -> Classification {
    // 1. input validation
    if let Error::Validation(v) = error {
        return classify_validation(v);
    }
    if let Error::PersonaNotFound(id) = error {
        return Classification::new(
            404,
            ErrorCode::PersonaNotFound,
            format!("Unknown advisor: {}", id),
        );
    }

    // 2-5. upstream signals
    if let Error::Llm(e) = error {
        if let Some(signal) = upstream_signal(e) {
            return classify_signal(signal);
        }
    }

    match error {
        // 6. cascade exhausted
        Error::AllModelsUnavailable { .. } => Classification::new(
            503,
            ErrorCode::AllModelsUnavailable,
            format!(
                "All oracle models are currently unavailable (attempted: {}). Please try again in a few minutes.",
                error.attempted_models().join(", ")
            ),
        ),
        // 7. nothing usable came back
        Error::EmptyResponse => Classification::new(
            503,
            ErrorCode::EmptyResponse,
            "The oracle could not produce an answer. Please try again.",
        ),
        // 8. everything else
        _ => Classification::new(
            500,
            ErrorCode::InternalError,
            "Internal error. Please try again later.",
        ),
    }
}

impl Error {
    /// Classify this error (see [`classify`])
    #[must_use]
    pub fn classify(&self) -> Classification {
        classify(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelFailure;
    use augury_llm::Error as Llm;

    #[test]
    fn test_validation_rules() {
        let c = classify(&ValidationError::MissingUserMessage.into());
        assert_eq!((c.status, c.code), (400, ErrorCode::MissingUserMessage));

        let c = classify(&ValidationError::MissingPersonaData.into());
        assert_eq!((c.status, c.code), (400, ErrorCode::MissingPersonaData));

        let c = classify(
            &ValidationError::MessageTooLong {
                max: 1500,
                actual: 2000,
            }
            .into(),
        );
        assert_eq!((c.status, c.code), (400, ErrorCode::MessageTooLong));
        assert!(c.message.contains("1500"));
    }

    #[test]
    fn test_persona_not_found() {
        let c = classify(&Error::PersonaNotFound("palmistry".to_string()));
        assert_eq!((c.status, c.code), (404, ErrorCode::PersonaNotFound));
        assert!(c.message.contains("palmistry"));
    }

    #[test]
    fn test_typed_upstream_signals() {
        let cases = [
            (Llm::Overloaded("x".into()), 503, ErrorCode::ServiceOverloaded),
            (Llm::RateLimit("x".into()), 429, ErrorCode::QuotaExceeded),
            (Llm::Safety("x".into()), 400, ErrorCode::SafetyFilter),
            (Llm::Auth("x".into()), 401, ErrorCode::AuthError),
        ];
        for (llm, status, code) in cases {
            let c = classify(&Error::Llm(llm));
            assert_eq!((c.status, c.code), (status, code));
        }
    }

    #[test]
    fn test_message_signals() {
        let c = classify(&Error::Llm(Llm::Api("The model is overloaded".into())));
        assert_eq!(c.code, ErrorCode::ServiceOverloaded);

        let c = classify(&Error::Llm(Llm::ServerError(
            "RESOURCE_EXHAUSTED: try later".into(),
        )));
        assert_eq!(c.code, ErrorCode::QuotaExceeded);

        let c = classify(&Error::Llm(Llm::Api("API key expired".into())));
        assert_eq!(c.code, ErrorCode::AuthError);
    }

    #[test]
    fn test_all_models_unavailable_lists_models() {
        let error = Error::AllModelsUnavailable {
            failures: vec![
                ModelFailure {
                    model: "m-a".to_string(),
                    attempts: 3,
                    last_failure: "api error: boom".to_string(),
                },
                ModelFailure {
                    model: "m-b".to_string(),
                    attempts: 3,
                    last_failure: "api error: boom".to_string(),
                },
            ],
        };
        let c = classify(&error);
        assert_eq!((c.status, c.code), (503, ErrorCode::AllModelsUnavailable));
        assert!(c.message.contains("m-a, m-b"));
        assert!(!c.message.contains("boom"));
    }

    #[test]
    fn test_empty_and_fallthrough() {
        let c = classify(&Error::EmptyResponse);
        assert_eq!((c.status, c.code), (503, ErrorCode::EmptyResponse));

        let c = classify(&Error::Llm(Llm::Network("connection reset".into())));
        assert_eq!((c.status, c.code), (500, ErrorCode::InternalError));

        let c = classify(&Error::Configuration("tarot: teaser hook is empty".into()));
        assert_eq!((c.status, c.code), (500, ErrorCode::InternalError));
        assert!(!c.message.contains("tarot"));
    }

    #[test]
    fn test_error_code_wire_format() {
        assert_eq!(ErrorCode::AllModelsUnavailable.as_str(), "ALL_MODELS_UNAVAILABLE");
        assert_eq!(
            serde_json::to_value(ErrorCode::MessageTooLong).unwrap(),
            "MESSAGE_TOO_LONG"
        );
        assert_eq!(ErrorCode::SafetyFilter.to_string(), "SAFETY_FILTER");
    }
}
