//! Server module for Augury
//!
//! Contains the main server initialization and runtime logic.
//!
//! # Module Structure
//!
//! - `config`: Configuration structures for all server components
//! - `loader`: Configuration loading from files and environment
//! - `validation`: Production configuration warnings
//! - `init`: Engine assembly, router and run loop

pub mod config;
mod init;
mod loader;
mod validation;

// Re-export public API
pub use init::{build_engine, build_router, load_personas, resolve_completion_service, run};
pub use loader::load_config;
