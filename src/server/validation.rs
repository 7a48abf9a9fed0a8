//! Production configuration validation
//!
//! Deployment checks that only warn.

use super::config::AppConfig;
use tracing::warn;

/// Warn about risky settings when `AUGURY_ENV=production`
pub fn warn_on_exposed_config(config: &AppConfig) {
    let is_production = std::env::var("AUGURY_ENV")
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false);

    for warning in production_warnings(config, is_production) {
        warn!("SECURITY WARNING: {}", warning);
    }
}

fn production_warnings(config: &AppConfig, is_production: bool) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    if !is_production {
        return warnings;
    }

    if config.server.host == "0.0.0.0" {
        warnings.push(
            "Server is binding to all interfaces (0.0.0.0) in production. \
             Consider binding to 127.0.0.1 behind a reverse proxy.",
        );
    }

    if config.llm.provider.eq_ignore_ascii_case("mock") {
        warnings.push("The mock completion service is enabled in production.");
    }

    if !config.logging.is_json() {
        warnings.push("Log format is not json in production.");
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_warnings_outside_production() {
        let mut config = AppConfig::default();
        config.server.host = "0.0.0.0".to_string();
        assert!(production_warnings(&config, false).is_empty());
    }

    #[test]
    fn test_production_warnings() {
        let mut config = AppConfig::default();
        config.server.host = "0.0.0.0".to_string();
        config.llm.provider = "mock".to_string();
        assert_eq!(production_warnings(&config, true).len(), 3);

        config.server.host = "127.0.0.1".to_string();
        config.llm.provider = "gemini".to_string();
        config.logging.format = "json".to_string();
        assert!(production_warnings(&config, true).is_empty());
    }
}
