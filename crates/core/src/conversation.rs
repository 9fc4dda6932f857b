//! Conversation types including stages, messages and action commitments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conversation stages for the coaching flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoachingStage {
    /// Initial welcome, establishing trust and choosing a topic
    #[default]
    Intake,
    /// Exploring the situation through listening and questioning
    Exploration,
    /// Surfacing patterns and insights
    Reflection,
    /// Designing concrete actions and commitments
    ActionPlanning,
    /// Reviewing progress after commitments were made
    FollowUp,
}

impl CoachingStage {
    /// Wire name used in API payloads and persisted rows
    pub fn as_str(&self) -> &'static str {
        match self {
            CoachingStage::Intake => "intake",
            CoachingStage::Exploration => "exploration",
            CoachingStage::Reflection => "reflection",
            CoachingStage::ActionPlanning => "action_planning",
            CoachingStage::FollowUp => "follow_up",
        }
    }

    /// Parse a wire name back into a stage
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "intake" => Some(CoachingStage::Intake),
            "exploration" => Some(CoachingStage::Exploration),
            "reflection" => Some(CoachingStage::Reflection),
            "action_planning" => Some(CoachingStage::ActionPlanning),
            "follow_up" => Some(CoachingStage::FollowUp),
            _ => None,
        }
    }

    /// Stage display name
    pub fn display_name(&self) -> &'static str {
        match self {
            CoachingStage::Intake => "Intake",
            CoachingStage::Exploration => "Exploration",
            CoachingStage::Reflection => "Reflection",
            CoachingStage::ActionPlanning => "Action Planning",
            CoachingStage::FollowUp => "Follow Up",
        }
    }

    /// Natural next stage in the coaching arc.
    ///
    /// FollowUp recurs rather than terminating, so it has no successor.
    pub fn default_next(&self) -> Option<CoachingStage> {
        match self {
            CoachingStage::Intake => Some(CoachingStage::Exploration),
            CoachingStage::Exploration => Some(CoachingStage::Reflection),
            CoachingStage::Reflection => Some(CoachingStage::ActionPlanning),
            CoachingStage::ActionPlanning => Some(CoachingStage::FollowUp),
            CoachingStage::FollowUp => None,
        }
    }

    /// All stages in conversation order
    pub fn all() -> &'static [CoachingStage] {
        &[
            CoachingStage::Intake,
            CoachingStage::Exploration,
            CoachingStage::Reflection,
            CoachingStage::ActionPlanning,
            CoachingStage::FollowUp,
        ]
    }
}

impl std::fmt::Display for CoachingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// The person being coached
    User,
    /// The coaching assistant
    Coach,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Coach => "coach",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single message in the conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who spoke
    pub role: MessageRole,
    /// What was said
    pub content: String,
    /// When it was said
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message stamped with the current time
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create a coach message
    pub fn coach(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Coach, content)
    }
}

/// A committed action captured during action planning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCommitment {
    /// The action itself
    pub action: String,
    /// Deadline the user committed to
    pub by_when: String,
    /// How the user will know they succeeded
    pub success_criteria: String,
    /// What might get in the way
    pub potential_obstacles: String,
    /// Support the user needs
    pub support_needed: String,
    /// When the commitment was made
    pub committed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_wire_names_round_trip() {
        for stage in CoachingStage::all() {
            assert_eq!(CoachingStage::parse(stage.as_str()), Some(*stage));
        }
        assert_eq!(CoachingStage::parse("closing"), None);
        assert_eq!(CoachingStage::parse(""), None);
    }

    #[test]
    fn test_stage_progression() {
        assert_eq!(
            CoachingStage::Intake.default_next(),
            Some(CoachingStage::Exploration)
        );
        assert_eq!(
            CoachingStage::ActionPlanning.default_next(),
            Some(CoachingStage::FollowUp)
        );
        // FollowUp recurs, it never advances
        assert_eq!(CoachingStage::FollowUp.default_next(), None);
    }

    #[test]
    fn test_stage_serde_uses_snake_case() {
        let json = serde_json::to_string(&CoachingStage::ActionPlanning).unwrap();
        assert_eq!(json, "\"action_planning\"");
    }

    #[test]
    fn test_message_constructors() {
        let msg = Message::user("I keep putting things off");
        assert_eq!(msg.role, MessageRole::User);

        let msg = Message::coach("Tell me more about that.");
        assert_eq!(msg.role, MessageRole::Coach);
    }
}
