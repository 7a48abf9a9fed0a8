//! Augury LLM - Completion Service Abstraction
//!
//! This crate provides the text-generation side of Augury:
//! - Provider: the `CompletionService` trait every backend implements
//! - Generation: request/response types and sampling parameters
//! - Gemini: Google Gemini `generateContent` provider
//! - Mock: scripted in-memory provider for tests and local runs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod gemini;
pub mod generation;
pub mod mock;
pub mod provider;
pub mod util;

pub use error::{Error, Result};
pub use gemini::{GeminiConfig, GeminiProvider};
pub use generation::{GenerationParams, GenerationRequest, GenerationResponse, SafetySetting};
pub use mock::{MockCall, MockReply, MockService};
pub use provider::CompletionService;
