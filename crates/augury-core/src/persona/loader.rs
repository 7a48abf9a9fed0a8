//! Persona TOML Loader
//!
//! Loads TOML files from the `config/personas/` directory.

use super::PersonaConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default persona configuration directory
pub const DEFAULT_PERSONA_DIR: &str = "config/personas";

/// Persona TOML Loader
#[derive(Debug)]
pub struct PersonaLoader {
    config_dir: PathBuf,
}

impl PersonaLoader {
    /// Create loader with default path (`config/personas/`)
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_PERSONA_DIR),
        }
    }

    /// Create loader with custom path
    #[must_use]
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            config_dir: path.as_ref().to_path_buf(),
        }
    }

    /// Return configuration directory path
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load all personas, sorted by id
    ///
    /// # Errors
    /// - Directory read failure
    /// - Individual parse or validation failures are warned and skipped
    pub fn load_all(&self) -> Result<Vec<PersonaConfig>> {
        let mut personas = Vec::new();

        if !self.config_dir.exists() {
            warn!("Persona directory not found: {:?}", self.config_dir);
            return Ok(personas);
        }

        for path in self.toml_files()? {
            match self.load_file(&path) {
                Ok(persona) => {
                    info!(
                        persona = %persona.id(),
                        models = persona.model_cascade().len(),
                        "Loaded persona: {}",
                        persona.name()
                    );
                    personas.push(persona);
                }
                Err(e) => {
                    warn!("Failed to load {:?}: {}", path, e);
                }
            }
        }

        personas.sort_by(|a, b| a.id().cmp(b.id()));

        debug!(
            "Loaded {} personas from {:?}",
            personas.len(),
            self.config_dir
        );
        Ok(personas)
    }

    /// Load single persona by file name
    ///
    /// # Arguments
    /// * `name` - File stem (case-insensitive)
    ///
    /// # Errors
    /// - File read failure
    /// - TOML parse failure
    /// - Validation failure
    pub fn load(&self, name: &str) -> Result<PersonaConfig> {
        let path = self.path_for(name);

        if !path.exists() {
            return Err(Error::Configuration(format!(
                "Persona not found: {} (expected at {:?})",
                name, path
            )));
        }

        self.load_file(&path)
    }

    /// Return list of available persona file stems
    ///
    /// # Errors
    /// Directory read failure
    pub fn list_names(&self) -> Result<Vec<String>> {
        if !self.config_dir.exists() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = self
            .toml_files()?
            .iter()
            .filter_map(|path| path.file_stem())
            .map(|stem| stem.to_string_lossy().to_string())
            .collect();

        names.sort();
        Ok(names)
    }

    /// Resolve a file stem against the files on disk, ignoring case.
    fn path_for(&self, name: &str) -> PathBuf {
        self.toml_files()
            .ok()
            .and_then(|files| {
                files.into_iter().find(|path| {
                    path.file_stem()
                        .is_some_and(|stem| stem.to_string_lossy().eq_ignore_ascii_case(name))
                })
            })
            .unwrap_or_else(|| self.config_dir.join(format!("{}.toml", name.to_lowercase())))
    }

    fn toml_files(&self) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.config_dir).map_err(|e| {
            Error::Configuration(format!(
                "Failed to read persona directory {:?}: {}",
                self.config_dir, e
            ))
        })?;

        Ok(entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| Self::is_toml_file(path))
            .collect())
    }

    fn load_file(&self, path: &Path) -> Result<PersonaConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Configuration(format!("Failed to read {:?}: {}", path, e)))?;

        let persona: PersonaConfig = toml::from_str(&content)
            .map_err(|e| Error::Configuration(format!("Failed to parse {:?}: {}", path, e)))?;

        persona.validate()?;
        Ok(persona)
    }

    fn is_toml_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "toml")
    }
}

impl Default for PersonaLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_toml(id: &str) -> String {
        format!(
            r#"
[persona]
id = "{id}"
name = "Test {id}"
instructions = "You are a test advisor."

[generation]
model_cascade = ["model-a"]
free_message_limit = 2

[generation.full]
min_length = 50
repair_threshold = 80
max_output_tokens = 1024

[generation.partial]
min_length = 80
repair_threshold = 80
max_output_tokens = 300

[teaser]
hook = " -- more awaits"
paywall_message = "Unlock"
"#
        )
    }

    fn write(dir: &TempDir, file: &str, content: &str) {
        std::fs::write(dir.path().join(file), content).unwrap();
    }

    #[test]
    fn test_loader_new() {
        let loader = PersonaLoader::new();
        assert_eq!(loader.config_dir(), Path::new(DEFAULT_PERSONA_DIR));
    }

    #[test]
    fn test_loader_nonexistent_dir() {
        let loader = PersonaLoader::with_path("/nonexistent/path");
        assert!(loader.load_all().unwrap().is_empty());
        assert!(loader.list_names().unwrap().is_empty());
    }

    #[test]
    fn test_loader_load_file() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "tarot.toml", &create_test_toml("tarot"));

        let loader = PersonaLoader::with_path(temp_dir.path());
        let persona = loader.load("Tarot").unwrap();

        assert_eq!(persona.id(), "tarot");
        assert_eq!(persona.free_message_limit(), 2);
        assert!(loader.load("TAROT").is_ok());
    }

    #[test]
    fn test_loader_loads_listed_names_with_mixed_case_stems() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "Tarot.toml", &create_test_toml("tarot"));
        write(&temp_dir, "DREAMS.toml", &create_test_toml("dreams"));

        let loader = PersonaLoader::with_path(temp_dir.path());
        let names = loader.list_names().unwrap();
        assert_eq!(names, vec!["DREAMS", "Tarot"]);
        for name in &names {
            assert!(loader.load(name).is_ok(), "{name} should load");
        }
        assert_eq!(loader.load("tarot").unwrap().id(), "tarot");
        assert!(loader.load("runes").is_err());
    }

    #[test]
    fn test_loader_load_all_sorted_and_skips_bad_files() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "zodiac.toml", &create_test_toml("zodiac"));
        write(&temp_dir, "dreams.toml", &create_test_toml("dreams"));
        write(&temp_dir, "broken.toml", "invalid toml content {{{");
        write(
            &temp_dir,
            "empty_cascade.toml",
            &create_test_toml("empty").replace(r#"["model-a"]"#, "[]"),
        );
        write(&temp_dir, "notes.txt", "not a persona");

        let loader = PersonaLoader::with_path(temp_dir.path());
        let personas = loader.load_all().unwrap();

        let ids: Vec<_> = personas.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["dreams", "zodiac"]);
    }

    #[test]
    fn test_loader_list_names() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["love", "birth_chart", "tarot"] {
            write(&temp_dir, &format!("{name}.toml"), &create_test_toml(name));
        }

        let loader = PersonaLoader::with_path(temp_dir.path());
        assert_eq!(
            loader.list_names().unwrap(),
            vec!["birth_chart", "love", "tarot"]
        );
    }

    #[test]
    fn test_loader_load_errors() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "invalid.toml", "invalid toml content {{{");
        write(
            &temp_dir,
            "nolimit.toml",
            &create_test_toml("nolimit").replace("free_message_limit = 2", "free_message_limit = 0"),
        );

        let loader = PersonaLoader::with_path(temp_dir.path());
        assert!(loader.load("nonexistent").is_err());
        assert!(loader.load("invalid").is_err());

        let err = loader.load("nolimit").unwrap_err();
        assert!(err.to_string().contains("free_message_limit"));
    }
}
