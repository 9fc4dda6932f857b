//! Conversation flow engine
//!
//! Features:
//! - Stage-based coaching dialog management (intake through follow-up)
//! - ICF competency framework and fixed topic catalog
//! - Deterministic fallback response engine with anti-repetition tracking
//! - Progressive mention-depth escalation for recurring themes
//! - Model-first reply generation with total fallback on any model failure
//! - Whole-row session persistence after every mutation

pub mod competency;
pub mod engine;
pub mod fallback;
pub mod questions;
pub mod state;
pub mod topics;
pub mod transitions;

pub use competency::{Competency, CompetencyProfile};
pub use engine::{ActionCommitmentRequest, CoachingEngine, IncomingMessage, SessionStarted};
pub use fallback::{FallbackReply, FallbackResponder};
pub use questions::QuestionBank;
pub use state::ConversationState;
pub use topics::{Topic, TopicKey};

use thiserror::Error;

/// Engine errors surfaced to the HTTP layer
///
/// Collaborator failures (model, persistence writes) are absorbed inside the
/// engine and never appear here; these variants all map to client errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    #[error("Invalid stage: {0}")]
    InvalidStage(String),

    #[error("Corrupt session state: {0}")]
    CorruptState(String),
}
