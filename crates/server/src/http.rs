//! HTTP endpoints
//!
//! REST API fronting the conversation flow engine.

use std::time::Duration;

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use coaching_agent_agent::{
    ActionCommitmentRequest, ConversationState, IncomingMessage, SessionStarted,
};
use coaching_agent_core::CoachingResponse;

use crate::state::AppState;
use crate::ApiError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.config.server.cors_origins,
        state.config.server.cors_enabled,
    );
    let timeout_layer =
        TimeoutLayer::new(Duration::from_secs(state.config.server.request_timeout_secs));

    Router::new()
        .route("/api/sessions", post(start_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/messages", post(send_message))
        .route("/api/sessions/:id/stage", put(set_stage))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(timeout_layer)
        .layer(cors_layer)
        .with_state(state)
}

/// Build the CORS layer from configured origins
///
/// - CORS disabled: permissive (development only)
/// - No origins configured: default to localhost:3000
/// - Otherwise the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin = %origin, "Invalid CORS origin, skipping");
                None
            })
        })
        .collect();

    if parsed.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!(count = parsed.len(), "CORS configured");
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Default, Deserialize)]
struct StartSessionRequest {
    #[serde(default)]
    user_id: Option<String>,
}

/// Start a new coaching session
async fn start_session(
    State(state): State<AppState>,
    body: Option<Json<StartSessionRequest>>,
) -> Json<SessionStarted> {
    let user_id = body.and_then(|Json(request)| request.user_id);
    Json(state.engine.start_session(user_id).await)
}

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    #[serde(default)]
    message: Option<String>,
    #[serde(default = "default_message_type", rename = "type")]
    message_type: String,
    #[serde(default)]
    action: Option<ActionCommitmentRequest>,
}

fn default_message_type() -> String {
    "text".to_string()
}

impl SendMessageRequest {
    /// Validate the payload and route it into an engine message
    fn into_incoming(self) -> Result<IncomingMessage, ApiError> {
        let non_empty_message = |message: Option<String>| {
            message
                .filter(|m| !m.trim().is_empty())
                .ok_or_else(|| ApiError::BadRequest("Missing session_id or message".to_string()))
        };

        match self.message_type.as_str() {
            "text" => Ok(IncomingMessage::Text(non_empty_message(self.message)?)),
            "topic_selection" => Ok(IncomingMessage::TopicSelection(non_empty_message(
                self.message,
            )?)),
            "action_commitment" => {
                let action = self.action.ok_or_else(|| {
                    ApiError::BadRequest("Missing action payload".to_string())
                })?;
                Ok(IncomingMessage::ActionCommitment(action))
            }
            other => Err(ApiError::BadRequest(format!(
                "Invalid message type: {other}"
            ))),
        }
    }
}

/// Process one user message
async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<CoachingResponse>, ApiError> {
    let incoming = request.into_incoming()?;
    let response = state.engine.handle_message(&session_id, incoming).await?;
    Ok(Json(response))
}

/// Read the full session state
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ConversationState>, ApiError> {
    let session = state.engine.get_session(&session_id).await?;
    Ok(Json(session))
}

#[derive(Debug, Deserialize)]
struct SetStageRequest {
    stage: String,
}

/// Manual stage override
async fn set_stage(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SetStageRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let stage = state.engine.set_stage(&session_id, &request.stage).await?;
    Ok(Json(serde_json::json!({
        "session_id": session_id,
        "stage": stage.as_str(),
    })))
}

/// Health check
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "coaching-agent",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "active_sessions": state.engine.session_count(),
        "llm_configured": state.engine.llm_configured(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use coaching_agent_agent::CoachingEngine;
    use coaching_agent_config::Settings;
    use coaching_agent_persistence::InMemorySessionStore;

    fn test_app() -> Router {
        let settings = Settings::default();
        let engine = CoachingEngine::new(
            settings.engine.clone(),
            Arc::new(InMemorySessionStore::new()),
        );
        create_router(AppState::new(settings, Arc::new(engine)))
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_start_session_returns_intake_envelope() {
        let app = test_app();
        let response = app
            .oneshot(json_request("POST", "/api/sessions", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(!body["session_id"].as_str().unwrap().is_empty());
        assert_eq!(body["response"]["stage"], "intake");
        assert_eq!(body["response"]["available_topics"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_topic_selection_flow() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/sessions", "{}"))
            .await
            .unwrap();
        let body = json_body(response).await;
        let session_id = body["session_id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/sessions/{session_id}/messages"),
                r#"{"message": "performance_improvement", "type": "topic_selection"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["stage"], "exploration");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Great! Let's explore Performance Improvement"));
        assert_eq!(body["questions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_message_is_bad_request() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/sessions", "{}"))
            .await
            .unwrap();
        let body = json_body(response).await;
        let session_id = body["session_id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/sessions/{session_id}/messages"),
                r#"{"type": "text"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("message"));
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = test_app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/sessions/no-such-session/messages",
                r#"{"message": "hello", "type": "text"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_stage_override_is_bad_request() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/sessions", "{}"))
            .await
            .unwrap();
        let body = json_body(response).await;
        let session_id = body["session_id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/sessions/{session_id}/stage"),
                r#"{"stage": "closing"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(json_request(
                "PUT",
                &format!("/api/sessions/{session_id}/stage"),
                r#"{"stage": "reflection"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["stage"], "reflection");
    }

    #[tokio::test]
    async fn test_get_session_returns_full_state() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/sessions", r#"{"user_id": "u-1"}"#))
            .await
            .unwrap();
        let body = json_body(response).await;
        let session_id = body["session_id"].as_str().unwrap().to_string();
        assert_eq!(body["user_id"], "u-1");

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/api/sessions/{session_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["user_id"], "u-1");
        assert_eq!(body["current_stage"], "intake");
        assert!(body["conversation_history"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["llm_configured"], false);
    }

    #[tokio::test]
    async fn test_invalid_message_type() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/sessions", "{}"))
            .await
            .unwrap();
        let body = json_body(response).await;
        let session_id = body["session_id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/sessions/{session_id}/messages"),
                r#"{"message": "hi", "type": "telepathy"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
