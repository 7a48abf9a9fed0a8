//! Augury Core - Resilient Generation & Access-Gating Engine
//!
//! This crate holds the logic every oracle persona shares:
//! - Persona: per-advisor configuration loaded from TOML
//! - Gate: freemium FULL/PARTIAL access decision
//! - Orchestrator: model cascade with per-model retries
//! - Repair: completeness repair for truncated output
//! - Teaser: partial reply plus hook for gated users
//! - Classify: stable error codes and HTTP statuses
//! - Engine: the pipeline tying the pieces together

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod chat;
pub mod classify;
pub mod engine;
pub mod error;
pub mod gate;
pub mod orchestrator;
pub mod persona;
pub mod prompt;
pub mod repair;
pub mod teaser;

pub use chat::{ChatRequest, ChatResponse, ConversationTurn};
pub use classify::{classify, Classification, ErrorCode};
pub use engine::{ChatOutcome, EngineSettings, OracleEngine};
pub use error::{Error, ModelFailure, Result, ValidationError};
pub use gate::{decide, AccessDecision, Tier};
pub use orchestrator::{AttemptOutcome, Generation, ModelAttemptResult, Orchestrator, RetryPolicy};
pub use persona::{PersonaConfig, PersonaLoader, PersonaRegistry, TierProfile};
