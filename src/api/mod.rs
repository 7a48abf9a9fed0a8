//! Web API module for Augury
//!
//! Provides REST API endpoints for:
//! - Health checks
//! - Persona listing and chat

pub mod health;
pub mod personas;

pub use health::health_routes;
pub use personas::personas_routes;
