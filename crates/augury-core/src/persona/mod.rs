//! Persona - per-advisor configuration
//!
//! Every advisor (zodiac, tarot, numerology, ...) is served by the same
//! engine; what differs is data: the model cascade, the free-message limit,
//! length thresholds per tier, accepted terminators and the teaser hook.
//!
//! # Example
//!
//! ```rust,ignore
//! use augury_core::persona::{PersonaLoader, PersonaRegistry};
//!
//! let registry = PersonaRegistry::load(&PersonaLoader::new())?;
//! if let Some(tarot) = registry.get("tarot") {
//!     println!("{} uses {:?}", tarot.name(), tarot.model_cascade());
//! }
//! ```

mod config;
mod loader;
mod registry;

pub use config::{
    CompletionSettings, GenerationSettings, PersonaConfig, PersonaInfo, TeaserSettings,
    TierProfile, DEFAULT_FREE_MESSAGE_LIMIT,
};
pub use loader::{PersonaLoader, DEFAULT_PERSONA_DIR};
pub use registry::PersonaRegistry;

/// Persona fixture shared by unit tests
#[cfg(test)]
pub(crate) fn test_persona(id: &str, models: &[&str]) -> PersonaConfig {
    let profile = |min_length, max_output_tokens| TierProfile {
        min_length,
        repair_threshold: 40,
        max_output_tokens,
        temperature: 0.8,
        top_k: 40,
        top_p: 0.95,
        guidance: None,
    };

    PersonaConfig {
        persona: PersonaInfo {
            id: id.to_string(),
            name: format!("{} advisor", id),
            description: None,
            instructions: format!("You are the {} advisor.", id),
        },
        generation: GenerationSettings {
            model_cascade: models.iter().map(|m| (*m).to_string()).collect(),
            free_message_limit: 3,
            full: profile(20, 1024),
            partial: profile(30, 300),
        },
        completion: CompletionSettings::default(),
        teaser: TeaserSettings {
            hook: "\n\n🔒 Unlock the rest of your reading.".to_string(),
            paywall_message: "Get unlimited readings".to_string(),
        },
    }
}
