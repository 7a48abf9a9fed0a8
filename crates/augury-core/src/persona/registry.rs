//! In-memory persona table, keyed by lowercase id

use super::{PersonaConfig, PersonaLoader};
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Validated personas available to the engine
#[derive(Debug, Clone, Default)]
pub struct PersonaRegistry {
    personas: BTreeMap<String, Arc<PersonaConfig>>,
}

impl PersonaRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configs, validating each one.
    ///
    /// # Errors
    /// Validation failure or duplicate id.
    pub fn from_configs(configs: impl IntoIterator<Item = PersonaConfig>) -> Result<Self> {
        let mut registry = Self::new();
        for config in configs {
            registry.insert(config)?;
        }
        Ok(registry)
    }

    /// Load every persona the loader finds.
    ///
    /// # Errors
    /// Directory read failure or duplicate id.
    pub fn load(loader: &PersonaLoader) -> Result<Self> {
        Self::from_configs(loader.load_all()?)
    }

    /// Add a persona.
    ///
    /// # Errors
    /// Validation failure or duplicate id.
    pub fn insert(&mut self, config: PersonaConfig) -> Result<()> {
        config.validate()?;
        let key = config.id().to_lowercase();
        if self.personas.contains_key(&key) {
            return Err(Error::Configuration(format!(
                "duplicate persona id: {}",
                config.id()
            )));
        }
        self.personas.insert(key, Arc::new(config));
        Ok(())
    }

    /// Look up a persona by id (case-insensitive)
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<PersonaConfig>> {
        self.personas.get(&id.to_lowercase()).cloned()
    }

    /// Registered ids, sorted
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.personas.keys().map(String::as_str).collect()
    }

    /// Iterate personas in id order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<PersonaConfig>> {
        self.personas.values()
    }

    /// Number of personas
    #[must_use]
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    /// Whether no persona is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}
