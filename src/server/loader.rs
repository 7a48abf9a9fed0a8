//! Configuration loading
//!
//! Sources, lowest to highest priority:
//! 1. `config/default.toml` embedded in the binary
//! 2. `default`, `{AUGURY_ENV}` and `local` files in the config directory
//! 3. `AUGURY_<SECTION>__<KEY>` environment variables
//!
//! The config directory is `config` unless `AUGURY_CONFIG_DIR` says otherwise.
//! A relative `personas.dir` is resolved against the directory that holds
//! the config directory, so a relocated deployment finds its persona files.

use super::config::{AppConfig, EngineConfig};
use anyhow::{ensure, Context, Result};
use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

const CONFIG_DIR_ENV: &str = "AUGURY_CONFIG_DIR";
const PROFILE_ENV: &str = "AUGURY_ENV";
const DEFAULT_CONFIG_DIR: &str = "config";
const DEFAULT_PROFILE: &str = "development";

/// Gemini `HarmBlockThreshold` values accepted in `engine.safety_threshold`
const SAFETY_THRESHOLDS: &[&str] = &[
    "BLOCK_NONE",
    "BLOCK_ONLY_HIGH",
    "BLOCK_MEDIUM_AND_ABOVE",
    "BLOCK_LOW_AND_ABOVE",
    "OFF",
];

/// Where configuration files are read from
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub dir: PathBuf,
    pub profile: String,
}

impl ConfigSource {
    /// Resolve from `AUGURY_CONFIG_DIR` and `AUGURY_ENV`
    pub fn from_env() -> Self {
        Self {
            dir: std::env::var(CONFIG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR)),
            profile: std::env::var(PROFILE_ENV).unwrap_or_else(|_| DEFAULT_PROFILE.to_string()),
        }
    }

    fn file_name(&self, stem: &str) -> String {
        self.dir.join(stem).to_string_lossy().into_owned()
    }

    /// Directory relative persona paths hang off
    fn base_dir(&self) -> &Path {
        self.dir.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&ConfigSource::from_env())
}

/// Load configuration from an explicit config directory and profile
pub fn load_config_from(source: &ConfigSource) -> Result<AppConfig> {
    debug!(dir = ?source.dir, profile = %source.profile, "Loading configuration");

    let mut config: AppConfig = Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        .add_source(File::with_name(&source.file_name("default")).required(false))
        .add_source(File::with_name(&source.file_name(&source.profile)).required(false))
        .add_source(File::with_name(&source.file_name("local")).required(false))
        // prefix_separator("_") makes AUGURY_ENGINE__X work; config-rs 0.14
        // otherwise expects AUGURY__ENGINE__X.
        .add_source(
            Environment::with_prefix("AUGURY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    check_engine(&config.engine).context("Invalid [engine] section")?;

    if Path::new(&config.personas.dir).is_relative() {
        let resolved = source.base_dir().join(&config.personas.dir);
        config.personas.dir = resolved.to_string_lossy().into_owned();
    }

    Ok(config)
}

fn check_engine(engine: &EngineConfig) -> Result<()> {
    ensure!(
        engine.attempts_per_model >= 1,
        "attempts_per_model must be at least 1"
    );
    ensure!(
        engine.max_message_chars >= 1,
        "max_message_chars must be at least 1"
    );
    ensure!(
        SAFETY_THRESHOLDS.contains(&engine.safety_threshold.as_str()),
        "unknown safety_threshold {:?} (expected one of {})",
        engine.safety_threshold,
        SAFETY_THRESHOLDS.join(", ")
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source(root: &TempDir, profile: &str) -> ConfigSource {
        let dir = root.path().join("config");
        std::fs::create_dir_all(&dir).unwrap();
        ConfigSource {
            dir,
            profile: profile.to_string(),
        }
    }

    fn write(source: &ConfigSource, file: &str, content: &str) {
        std::fs::write(source.dir.join(file), content).unwrap();
    }

    #[test]
    fn test_embedded_defaults() {
        let root = TempDir::new().unwrap();
        let config = load_config_from(&source(&root, "development")).unwrap();

        assert_eq!(config.engine.attempts_per_model, 3);
        assert_eq!(config.engine.attempt_delay_ms, 500);
        assert_eq!(config.engine.model_delay_ms, 1000);
        assert_eq!(config.engine.max_message_chars, 1500);
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(
            PathBuf::from(&config.personas.dir),
            root.path().join("config/personas")
        );
    }

    #[test]
    fn test_default_config_dir_keeps_persona_path() {
        let source = ConfigSource {
            dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            profile: "none".to_string(),
        };
        assert_eq!(
            source.base_dir().join("config/personas"),
            Path::new("config/personas")
        );
    }

    #[test]
    fn test_profile_and_local_layering() {
        let root = TempDir::new().unwrap();
        let source = source(&root, "staging");
        write(
            &source,
            "staging.toml",
            "[server]\nport = 9000\n\n[engine]\nattempts_per_model = 2\n",
        );
        write(&source, "local.toml", "[engine]\nattempts_per_model = 5\n");

        let config = load_config_from(&source).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.engine.attempts_per_model, 5);
        assert_eq!(config.engine.model_delay_ms, 1000);
    }

    #[test]
    fn test_absolute_persona_dir_is_kept() {
        let root = TempDir::new().unwrap();
        let source = source(&root, "development");
        write(&source, "local.toml", "[personas]\ndir = \"/srv/augury/personas\"\n");

        let config = load_config_from(&source).unwrap();
        assert_eq!(config.personas.dir, "/srv/augury/personas");
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let root = TempDir::new().unwrap();
        let source = source(&root, "development");
        write(&source, "local.toml", "[engine]\nattempts_per_model = 0\n");

        let err = load_config_from(&source).unwrap_err();
        assert!(format!("{:#}", err).contains("attempts_per_model"));
    }

    #[test]
    fn test_rejects_unknown_safety_threshold() {
        let root = TempDir::new().unwrap();
        let source = source(&root, "development");
        write(&source, "local.toml", "[engine]\nsafety_threshold = \"BLOCK_EVERYTHING\"\n");

        let err = load_config_from(&source).unwrap_err();
        assert!(format!("{:#}", err).contains("BLOCK_EVERYTHING"));
    }
}
