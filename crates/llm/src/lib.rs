//! Language model adapter
//!
//! Wraps a remote OpenAI-compatible chat-completions API behind the
//! [`LlmBackend`] trait. Every failure mode the conversation engine cares
//! about is a distinct [`LlmError`] variant; the engine maps all of them to
//! the same fallback behavior, so the taxonomy exists for logging and tests
//! rather than for divergent handling.

pub mod backend;
pub mod prompt;

pub use backend::{LlmBackend, OpenAiBackend, OpenAiConfig};
pub use prompt::{extract_questions, ChatMessage, ChatRole, PromptBuilder};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Quota exhausted: {0}")]
    Quota(String),

    #[error("Rate limited: {0}")]
    RateLimit(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}
