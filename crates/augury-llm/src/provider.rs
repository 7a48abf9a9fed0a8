//! Completion service trait definition
//!
//! This module defines the core trait that all completion backends must implement.

use crate::error::Result;
use crate::generation::{GenerationRequest, GenerationResponse};

/// Trait for text completion backends
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Generate text for a prompt using the given model
    async fn generate(&self, model: &str, request: &GenerationRequest)
        -> Result<GenerationResponse>;
}
