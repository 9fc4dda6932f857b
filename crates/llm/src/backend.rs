//! LLM backend implementations
//!
//! One production backend: an OpenAI-compatible chat-completions client.
//! The trait exists so the conversation engine and tests can substitute
//! deterministic or failing models.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::prompt::ChatMessage;
use crate::LlmError;

/// Configuration for the OpenAI-compatible backend
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API endpoint (OpenAI: https://api.openai.com/v1, or a compatible server)
    pub endpoint: String,
    /// API key
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Temperature
    pub temperature: f32,
    /// Request timeout; expiry maps to [`LlmError::Timeout`]
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 300,
            temperature: 0.7,
            timeout: Duration::from_secs(15),
        }
    }
}

impl OpenAiConfig {
    /// Create a config for a hosted OpenAI-compatible endpoint
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// LLM backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a reply for the given messages
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;

    /// Check whether the backend is reachable
    async fn is_available(&self) -> bool;

    /// Model name for logging and health reporting
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible chat-completions backend
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Create a new backend
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() && !config.endpoint.starts_with("http://localhost") {
            return Err(LlmError::Configuration(
                "API key required for remote endpoints".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    /// Map a non-success HTTP status to the error taxonomy
    fn classify_status(status: StatusCode, body: &str) -> LlmError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                LlmError::Auth(format!("HTTP {status}: {body}"))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let lower = body.to_lowercase();
                if lower.contains("quota") || lower.contains("billing") {
                    LlmError::Quota(body.to_string())
                } else {
                    LlmError::RateLimit(body.to_string())
                }
            }
            _ => LlmError::Api(format!("HTTP {status}: {body}")),
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: messages.to_vec(),
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        };

        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, &body));
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::MalformedResponse("No choices in response".to_string()))?;

        let text = choice.message.content.trim().to_string();
        if text.is_empty() {
            return Err(LlmError::MalformedResponse(
                "Empty completion content".to_string(),
            ));
        }

        tracing::debug!(
            model = %self.config.model,
            tokens = ?response.usage.map(|u| u.completion_tokens),
            "Generated coaching reply"
        );

        Ok(text)
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.config.endpoint.trim_end_matches('/'));
        self.client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// OpenAI API wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    completion_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_requires_api_key_for_remote() {
        let config = OpenAiConfig::default();
        assert!(OpenAiBackend::new(config).is_err());

        let config = OpenAiConfig::new("sk-test", "gpt-4o-mini");
        assert!(OpenAiBackend::new(config).is_ok());

        // Local endpoints work without a key
        let config = OpenAiConfig {
            endpoint: "http://localhost:8000/v1".to_string(),
            ..Default::default()
        };
        assert!(OpenAiBackend::new(config).is_ok());
    }

    #[test]
    fn test_chat_url() {
        let backend = OpenAiBackend::new(OpenAiConfig::new("sk-test", "gpt-4o-mini")).unwrap();
        assert_eq!(
            backend.chat_url(),
            "https://api.openai.com/v1/chat/completions"
        );

        let backend = OpenAiBackend::new(
            OpenAiConfig::new("sk-test", "m").with_endpoint("https://models.github.ai/inference/"),
        )
        .unwrap();
        assert_eq!(
            backend.chat_url(),
            "https://models.github.ai/inference/chat/completions"
        );
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            OpenAiBackend::classify_status(StatusCode::UNAUTHORIZED, "bad key"),
            LlmError::Auth(_)
        ));
        assert!(matches!(
            OpenAiBackend::classify_status(StatusCode::FORBIDDEN, "no"),
            LlmError::Auth(_)
        ));
        assert!(matches!(
            OpenAiBackend::classify_status(
                StatusCode::TOO_MANY_REQUESTS,
                "You exceeded your current quota"
            ),
            LlmError::Quota(_)
        ));
        assert!(matches!(
            OpenAiBackend::classify_status(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            LlmError::RateLimit(_)
        ));
        assert!(matches!(
            OpenAiBackend::classify_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            LlmError::Api(_)
        ));
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::user("Hello")],
            max_tokens: Some(300),
            temperature: Some(0.7),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("gpt-4o-mini"));
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("max_tokens"));
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Tell me more."}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 4, "total_tokens": 14}
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "Tell me more.");
        assert_eq!(response.usage.unwrap().completion_tokens, 4);
    }
}
