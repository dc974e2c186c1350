//! HTTP request handlers

use super::types::{ModelInfo, ModelsResponse, VersionResponse};
use super::AppState;
use crate::llm::all_models;
use crate::message::{ErrorResponse, RelayReply};
use crate::relay::{RelayError, ValidationError};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Relay
        .route("/api/chat", post(chat))
        // Model info
        .route("/api/models", get(list_models))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Relay
// ============================================================

async fn chat(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RelayReply>, AppError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Unreadable chat request body");
        AppError::from(RelayError::Validation(ValidationError::MalformedBody))
    })?;

    let reply = state.relay.relay(&body).await?;
    Ok(Json(reply))
}

// ============================================================
// Model info
// ============================================================

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let models = all_models()
        .iter()
        .map(|m| ModelInfo {
            id: m.id.to_string(),
            description: m.description.to_string(),
            context_window: m.context_window,
        })
        .collect();

    Json(ModelsResponse {
        models,
        default: state.relay.default_model().id.to_string(),
    })
}

async fn get_version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================
// Error handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Internal(String),
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        let message = err.public_message();
        match err {
            RelayError::Validation(_) => AppError::BadRequest(message),
            RelayError::Provider(_) => AppError::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
