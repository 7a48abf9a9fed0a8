//! Persona endpoints
//!
//! GET  /api/v1/personas           list loaded personas
//! POST /api/v1/personas/:id/chat  chat with one persona

use augury_core::{ChatRequest, ChatResponse, Error, OracleEngine, ValidationError};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Entry of GET /api/v1/personas
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub free_message_limit: u32,
}

/// GET /api/v1/personas handler.
async fn list_personas(
    Extension(engine): Extension<Arc<OracleEngine>>,
) -> Json<Vec<PersonaSummary>> {
    Json(
        engine
            .personas()
            .iter()
            .map(|p| PersonaSummary {
                id: p.id().to_string(),
                name: p.name().to_string(),
                description: p.persona.description.clone(),
                free_message_limit: p.free_message_limit(),
            })
            .collect(),
    )
}

/// POST /api/v1/personas/:id/chat handler.
///
/// Malformed bodies are answered with an `INVALID_REQUEST` chat response
/// instead of axum's plain-text rejection.
async fn chat(
    Extension(engine): Extension<Arc<OracleEngine>>,
    Path(persona_id): Path<String>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<ChatResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(persona = %persona_id, "Rejected chat body: {}", rejection.body_text());
            let error = Error::from(ValidationError::InvalidRequest(rejection.body_text()));
            let classification = error.classify();
            return (
                status_code(classification.status),
                Json(ChatResponse::failure(&classification)),
            );
        }
    };

    let outcome = engine.chat(&persona_id, &request).await;
    (status_code(outcome.status), Json(outcome.response))
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Create persona routes
pub fn personas_routes() -> Router {
    Router::new()
        .route("/api/v1/personas", get(list_personas))
        .route("/api/v1/personas/:id/chat", post(chat))
}
