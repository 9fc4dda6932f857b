//! Structured analysis output types

use serde::{Deserialize, Serialize};

/// What the user is trying to achieve with their message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserIntent {
    SeekingUnderstanding,
    SeekingSolutions,
    ReadyForAction,
    SharingInformation,
    ExpressingFeelings,
    #[default]
    Exploring,
}

impl UserIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserIntent::SeekingUnderstanding => "seeking_understanding",
            UserIntent::SeekingSolutions => "seeking_solutions",
            UserIntent::ReadyForAction => "ready_for_action",
            UserIntent::SharingInformation => "sharing_information",
            UserIntent::ExpressingFeelings => "expressing_feelings",
            UserIntent::Exploring => "exploring",
        }
    }
}

/// Self-confidence read from the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        }
    }
}

/// Readiness to move from talk to action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    #[default]
    Exploring,
    Resistant,
}

impl Readiness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Readiness::Ready => "ready",
            Readiness::Exploring => "exploring",
            Readiness::Resistant => "resistant",
        }
    }
}

/// The understood context of a single user message
///
/// Recomputed for every message and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    /// Input text after spelling correction
    pub corrected_text: String,
    /// Up to three detected emotions, in taxonomy order
    pub primary_emotions: Vec<String>,
    /// Challenge tags mentioned in the message
    pub challenges_mentioned: Vec<String>,
    /// Strength tags mentioned in the message
    pub strengths_mentioned: Vec<String>,
    /// Classified intent
    pub intent: UserIntent,
    /// Confidence assessment
    pub confidence_level: ConfidenceLevel,
    /// Readiness assessment
    pub readiness_for_action: Readiness,
    /// Up to three derived themes
    pub key_themes: Vec<String>,
    /// Sentiment in [-1, 1]; 0.0 for empty text
    pub sentiment_score: f32,
}

impl UserContext {
    /// Neutral context, used for degenerate input
    pub fn neutral(text: impl Into<String>) -> Self {
        Self {
            corrected_text: text.into(),
            primary_emotions: Vec::new(),
            challenges_mentioned: Vec::new(),
            strengths_mentioned: Vec::new(),
            intent: UserIntent::Exploring,
            confidence_level: ConfidenceLevel::Medium,
            readiness_for_action: Readiness::Exploring,
            key_themes: Vec::new(),
            sentiment_score: 0.0,
        }
    }

    /// Dominant emotion for the response envelope, "engaged" when calm
    pub fn primary_emotion(&self) -> &str {
        self.primary_emotions
            .first()
            .map(String::as_str)
            .unwrap_or("engaged")
    }
}

impl Default for UserContext {
    fn default() -> Self {
        Self::neutral("")
    }
}
