//! Core types for the coaching agent
//!
//! This crate provides foundational types used across all other crates:
//! - Conversation types (stages, messages, action commitments)
//! - The uniform response envelope returned by every stage handler

pub mod conversation;
pub mod envelope;

pub use conversation::{ActionCommitment, CoachingStage, Message, MessageRole};
pub use envelope::{ActionTemplate, CoachingResponse, EmotionalAnalysis, SessionSummary};
