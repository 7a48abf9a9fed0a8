//! CLI module for Augury
//!
//! Commands:
//! - `serve`: run the HTTP server (default)
//! - `personas`: list loaded personas and their model cascades
//! - `check`: validate configuration and persona files

use crate::server::config::AppConfig;
use anyhow::{bail, Result};
use augury_core::PersonaLoader;
use clap::{Parser, Subcommand};

/// Augury oracle engine CLI
#[derive(Parser, Debug)]
#[command(name = "augury")]
#[command(about = "Oracle persona chat server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the server (default)
    Serve,
    /// List loaded personas
    Personas,
    /// Validate configuration and persona files
    Check,
}

/// Run the CLI command
pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => crate::server::run(config).await,
        Commands::Personas => list_personas(&config),
        Commands::Check => check(&config),
    }
}

fn list_personas(config: &AppConfig) -> Result<()> {
    let registry = crate::server::load_personas(config)?;
    for persona in registry.iter() {
        println!(
            "{:<16} {:<14} free={} models={}",
            persona.id(),
            persona.name(),
            persona.free_message_limit(),
            persona.model_cascade().join(" > ")
        );
    }
    Ok(())
}

fn check(config: &AppConfig) -> Result<()> {
    let loader = PersonaLoader::with_path(&config.personas.dir);
    let names = loader.list_names()?;
    if names.is_empty() {
        bail!("No persona files found in {:?}", loader.config_dir());
    }

    let mut failed = 0usize;
    for name in &names {
        match loader.load(name) {
            Ok(persona) => println!("ok      {} ({})", name, persona.id()),
            Err(e) => {
                failed += 1;
                println!("invalid {}: {}", name, e);
            }
        }
    }

    // duplicate ids only show up once files are combined
    crate::server::load_personas(config)?;

    if failed > 0 {
        bail!("{} of {} persona files are invalid", failed, names.len());
    }
    println!(
        "Configuration OK: {} personas, provider {}",
        names.len(),
        config.llm.provider
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        assert_eq!(Cli::parse_from(["augury"]).command, None);
        assert_eq!(
            Cli::parse_from(["augury", "check"]).command,
            Some(Commands::Check)
        );
        assert_eq!(
            Cli::parse_from(["augury", "personas"]).command,
            Some(Commands::Personas)
        );
    }

    #[test]
    fn test_check_shipped_personas() {
        let mut config = AppConfig::default();
        config.personas.dir = concat!(env!("CARGO_MANIFEST_DIR"), "/config/personas").to_string();
        assert!(check(&config).is_ok());
    }

    #[test]
    fn test_check_missing_dir() {
        let mut config = AppConfig::default();
        config.personas.dir = "/nonexistent/personas".to_string();
        assert!(check(&config).is_err());
    }
}
