//! Error types for augury-llm

use thiserror::Error;

/// Completion service error type
///
/// Variants map one-to-one onto the signals a completion backend can raise,
/// so callers can classify a failure without parsing messages.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Provider not configured
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// Upstream reports it is temporarily overloaded
    #[error("service overloaded: {0}")]
    Overloaded(String),

    /// Quota or rate limit exceeded
    #[error("rate limit exceeded: {0}")]
    RateLimit(String),

    /// Prompt or output rejected by the content-safety filter
    #[error("blocked by safety filter: {0}")]
    Safety(String),

    /// Credentials rejected
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Server-side failure (5xx), retryable
    #[error("server error: {0}")]
    ServerError(String),

    /// API error
    #[error("api error: {0}")]
    Api(String),

    /// Invalid response
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),
}

impl Error {
    /// Whether retrying the same prompt can succeed.
    ///
    /// Credential and content-safety rejections repeat on every model, so
    /// they end a fallback cascade immediately.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Auth(_) | Error::Safety(_) | Error::NotConfigured(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors() {
        assert!(Error::Auth("bad key".into()).is_fatal());
        assert!(Error::Safety("HARM_CATEGORY_DANGEROUS".into()).is_fatal());
        assert!(Error::NotConfigured("gemini".into()).is_fatal());
    }

    #[test]
    fn test_transient_errors() {
        assert!(!Error::Overloaded("busy".into()).is_fatal());
        assert!(!Error::RateLimit("quota".into()).is_fatal());
        assert!(!Error::ServerError("500".into()).is_fatal());
        assert!(!Error::Network("reset".into()).is_fatal());
        assert!(!Error::Timeout(30_000).is_fatal());
    }

    #[test]
    fn test_display() {
        let err = Error::Overloaded("model is overloaded".into());
        assert_eq!(err.to_string(), "service overloaded: model is overloaded");
    }
}
