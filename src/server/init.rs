//! Server initialization
//!
//! Builds the engine from configuration and runs the HTTP server.

use super::config::{AppConfig, LlmConfig};
use anyhow::{bail, Context, Result};
use augury_core::{OracleEngine, Orchestrator, PersonaLoader, PersonaRegistry};
use augury_llm::{CompletionService, GeminiConfig, GeminiProvider, MockService};
use axum::{routing::get, Extension, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Resolve the completion backend named in `[llm]`
pub fn resolve_completion_service(config: &AppConfig) -> Result<Arc<dyn CompletionService>> {
    let LlmConfig { provider } = &config.llm;
    match provider.to_lowercase().as_str() {
        "gemini" => {
            let mut gemini = GeminiConfig::from_env()
                .context("Gemini provider selected but no API key is configured")?
                .with_timeout(Duration::from_secs(config.gemini.timeout_secs));
            if let Some(base_url) = &config.gemini.base_url {
                gemini = gemini.with_base_url(base_url.clone());
            }
            info!(config = ?gemini, "Using Gemini completion service");
            Ok(Arc::new(
                GeminiProvider::new(gemini).context("Failed to create Gemini provider")?,
            ))
        }
        "mock" => {
            warn!("Using mock completion service: replies are canned");
            Ok(Arc::new(MockService::canned()))
        }
        other => bail!("Unknown llm provider: {} (expected gemini or mock)", other),
    }
}

/// Load and validate the persona files named in `[personas]`
pub fn load_personas(config: &AppConfig) -> Result<PersonaRegistry> {
    let loader = PersonaLoader::with_path(&config.personas.dir);
    let registry = PersonaRegistry::load(&loader).context("Failed to load personas")?;
    if registry.is_empty() {
        bail!("No valid persona found in {:?}", loader.config_dir());
    }
    Ok(registry)
}

/// Assemble the engine
pub fn build_engine(config: &AppConfig, service: Arc<dyn CompletionService>) -> Result<OracleEngine> {
    let personas = load_personas(config)?;
    let orchestrator = Orchestrator::new(service)
        .with_policy(config.engine.retry_policy())
        .with_safety(config.engine.safety_settings());

    Ok(OracleEngine::new(personas, orchestrator).with_settings(config.engine.settings()))
}

/// Build the HTTP router
pub fn build_router(engine: Arc<OracleEngine>) -> Router {
    Router::new()
        .merge(crate::api::health_routes())
        .merge(crate::api::personas_routes())
        .route("/", get(|| async { "Augury oracle engine" }))
        .layer(Extension(engine))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the server until Ctrl+C / SIGTERM
pub async fn run(config: AppConfig) -> Result<()> {
    super::validation::warn_on_exposed_config(&config);

    let service = resolve_completion_service(&config)?;
    let engine = build_engine(&config, service)?;
    info!(
        personas = engine.personas().len(),
        ids = ?engine.personas().ids(),
        "Engine ready"
    );

    let app = build_router(Arc::new(engine));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Augury shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
