//! HTTP server for the coaching agent
//!
//! Thin surface over the conversation flow engine: session creation, message
//! handling, state reads, manual stage overrides and a health check. Error
//! responses never leak internals; an unexpected failure still returns a
//! coherent coaching-style body with a safe follow-up question.

pub mod http;
pub mod state;

pub use http::create_router;
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use coaching_agent_agent::EngineError;

/// API error surfaced to clients
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::SessionNotFound(id) => ApiError::NotFound(format!("Session not found: {id}")),
            EngineError::InvalidTopic(topic) => {
                ApiError::BadRequest(format!("Invalid topic selected: {topic}"))
            }
            EngineError::InvalidStage(stage) => {
                ApiError::BadRequest(format!("Invalid stage: {stage}"))
            }
            EngineError::CorruptState(detail) => ApiError::Internal(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
            ApiError::Internal(detail) => {
                // Log the detail, return a safe coaching-style body
                tracing::error!(detail = %detail, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "error": "Internal server error",
                        "message": "I apologize, but I'm experiencing a technical issue. \
                                    Could you please try again?",
                        "questions": ["What would you like to explore?"],
                    })),
                )
                    .into_response()
            }
        }
    }
}
