//! Uniform response envelope
//!
//! Every stage handler, whether backed by the language model or the fallback
//! engine, produces the same envelope shape. Stage-specific extras (insights,
//! action template, session summary) are optional fields that serialize only
//! when present.

use serde::{Deserialize, Serialize};

use crate::conversation::ActionCommitment;

/// Coarse emotional read of the user's latest message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalAnalysis {
    /// Dominant detected emotion, "engaged" when nothing stood out
    pub primary_emotion: String,
    /// Intensity in [0, 1]
    pub intensity: f32,
}

impl Default for EmotionalAnalysis {
    fn default() -> Self {
        Self {
            primary_emotion: "engaged".to_string(),
            intensity: 0.7,
        }
    }
}

/// Empty template handed to the client during action planning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionTemplate {
    pub action: String,
    pub by_when: String,
    pub success_criteria: String,
    pub potential_obstacles: String,
    pub support_needed: String,
}

/// Summary of the session so far, attached in the follow-up stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub message_count: usize,
    pub insight_count: usize,
    pub action_count: usize,
}

/// The response envelope returned for every coaching turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingResponse {
    /// The coach's message
    pub message: String,
    /// Follow-up questions to surface to the user
    pub questions: Vec<String>,
    /// Current stage wire name
    pub stage: String,
    /// ICF competency applied when producing the message
    pub competency_applied: String,
    /// Generation confidence (0.9 for model replies, 0.8 for fallback)
    pub ai_confidence: f32,
    /// True when the reply came from the fallback engine rather than the model
    pub demo_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotional_analysis: Option<EmotionalAnalysis>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insights: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_template: Option<ActionTemplate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_summary: Option<ActionCommitment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_summary: Option<SessionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_next_stage: Option<String>,
}

impl CoachingResponse {
    /// Create an envelope with the required fields; extras default to empty
    pub fn new(
        message: impl Into<String>,
        questions: Vec<String>,
        stage: impl Into<String>,
        competency: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            questions,
            stage: stage.into(),
            competency_applied: competency.into(),
            ai_confidence: 0.8,
            demo_mode: true,
            emotional_analysis: None,
            available_topics: Vec::new(),
            topic: None,
            insights: Vec::new(),
            action_template: None,
            action_summary: None,
            next_steps: None,
            session_summary: None,
            suggested_next_stage: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.ai_confidence = confidence;
        self
    }

    /// Mark the envelope as model-generated
    pub fn ai_powered(mut self) -> Self {
        self.demo_mode = false;
        self
    }

    pub fn with_emotional_analysis(mut self, analysis: EmotionalAnalysis) -> Self {
        self.emotional_analysis = Some(analysis);
        self
    }

    pub fn with_available_topics(mut self, topics: Vec<String>) -> Self {
        self.available_topics = topics;
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_insights(mut self, insights: Vec<String>) -> Self {
        self.insights = insights;
        self
    }

    pub fn with_action_template(mut self, template: ActionTemplate) -> Self {
        self.action_template = Some(template);
        self
    }

    pub fn with_action_summary(mut self, commitment: ActionCommitment) -> Self {
        self.action_summary = Some(commitment);
        self
    }

    pub fn with_next_steps(mut self, next_steps: impl Into<String>) -> Self {
        self.next_steps = Some(next_steps.into());
        self
    }

    pub fn with_session_summary(mut self, summary: SessionSummary) -> Self {
        self.session_summary = Some(summary);
        self
    }

    pub fn with_suggested_next_stage(mut self, stage: impl Into<String>) -> Self {
        self.suggested_next_stage = Some(stage.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_skipped() {
        let envelope = CoachingResponse::new(
            "Welcome",
            vec!["What brings you here?".to_string()],
            "intake",
            "establishing_trust_and_intimacy",
        );

        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"message\""));
        assert!(json.contains("\"demo_mode\":true"));
        assert!(!json.contains("action_template"));
        assert!(!json.contains("session_summary"));
        assert!(!json.contains("available_topics"));
    }

    #[test]
    fn test_builder_extras_serialize() {
        let envelope = CoachingResponse::new("m", vec![], "follow_up", "managing_progress")
            .ai_powered()
            .with_confidence(0.9)
            .with_session_summary(SessionSummary {
                stage: "follow_up".to_string(),
                topic: Some("Performance Improvement".to_string()),
                message_count: 12,
                insight_count: 2,
                action_count: 1,
            });

        assert!(!envelope.demo_mode);
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("session_summary"));
        assert!(json.contains("Performance Improvement"));
    }
}
