//! Per-session conversation state
//!
//! One `ConversationState` per session. History is append-only; every
//! mutation refreshes `updated_at`. The state round-trips losslessly through
//! the persisted row format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coaching_agent_core::{ActionCommitment, CoachingStage, Message, MessageRole};
use coaching_agent_persistence::SessionRecord;

use crate::topics::TopicKey;
use crate::EngineError;

/// The full mutable state of one coaching session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub user_id: String,
    pub session_id: String,
    pub current_stage: CoachingStage,
    pub topic: Option<TopicKey>,
    pub conversation_history: Vec<Message>,
    pub insights: Vec<String>,
    pub actions: Vec<ActionCommitment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationState {
    /// Create a fresh session at intake
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            current_stage: CoachingStage::Intake,
            topic: None,
            conversation_history: Vec::new(),
            insights: Vec::new(),
            actions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a user message
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.conversation_history.push(Message::user(content));
        self.touch();
    }

    /// Append a coach message
    pub fn push_coach(&mut self, content: impl Into<String>) {
        self.conversation_history.push(Message::coach(content));
        self.touch();
    }

    /// Count of user messages so far; drives depth-based stage transitions
    pub fn user_depth(&self) -> usize {
        self.conversation_history
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .count()
    }

    /// Refresh the update timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Serialize into the persisted row format
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            id: self.session_id.clone(),
            user_id: self.user_id.clone(),
            topic: self.topic.map(|t| t.as_str().to_string()),
            current_stage: self.current_stage.as_str().to_string(),
            // Vec serialization over simple types cannot fail
            conversation_history: serde_json::to_string(&self.conversation_history)
                .unwrap_or_else(|_| "[]".to_string()),
            insights: serde_json::to_string(&self.insights).unwrap_or_else(|_| "[]".to_string()),
            actions: serde_json::to_string(&self.actions).unwrap_or_else(|_| "[]".to_string()),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Rebuild state from a persisted row
    pub fn from_record(record: &SessionRecord) -> Result<Self, EngineError> {
        let corrupt = |what: &str, e: serde_json::Error| {
            EngineError::CorruptState(format!("{}: {} ({e})", record.id, what))
        };

        let current_stage = CoachingStage::parse(&record.current_stage).ok_or_else(|| {
            EngineError::CorruptState(format!(
                "{}: unknown stage {}",
                record.id, record.current_stage
            ))
        })?;

        let topic = match &record.topic {
            Some(name) => Some(TopicKey::parse(name).ok_or_else(|| {
                EngineError::CorruptState(format!("{}: unknown topic {name}", record.id))
            })?),
            None => None,
        };

        Ok(Self {
            user_id: record.user_id.clone(),
            session_id: record.id.clone(),
            current_stage,
            topic,
            conversation_history: serde_json::from_str(&record.conversation_history)
                .map_err(|e| corrupt("bad history", e))?,
            insights: serde_json::from_str(&record.insights)
                .map_err(|e| corrupt("bad insights", e))?,
            actions: serde_json::from_str(&record.actions).map_err(|e| corrupt("bad actions", e))?,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated_state() -> ConversationState {
        let mut state = ConversationState::new("user-1", "session-1");
        state.topic = Some(TopicKey::PerformanceImprovement);
        state.current_stage = CoachingStage::Reflection;
        state.push_user("I keep procrastinating");
        state.push_coach("What do you notice about when that happens?");
        state.push_user("mostly when tasks are new");
        state.insights.push("Pattern around new tasks".to_string());
        state.actions.push(ActionCommitment {
            action: "Break one project into 15-minute tasks".to_string(),
            by_when: "Friday".to_string(),
            success_criteria: "Three tasks done".to_string(),
            potential_obstacles: "Meetings".to_string(),
            support_needed: "None".to_string(),
            committed_at: Utc::now(),
        });
        state
    }

    #[test]
    fn test_user_depth_counts_only_user_messages() {
        let state = populated_state();
        assert_eq!(state.conversation_history.len(), 3);
        assert_eq!(state.user_depth(), 2);
    }

    #[test]
    fn test_record_round_trip_preserves_everything() {
        let state = populated_state();
        let record = state.to_record();
        let restored = ConversationState::from_record(&record).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let mut state = ConversationState::new("u", "s");
        for i in 0..10 {
            state.push_user(format!("user {i}"));
            state.push_coach(format!("coach {i}"));
        }
        let restored = ConversationState::from_record(&state.to_record()).unwrap();
        let contents: Vec<&str> = restored
            .conversation_history
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents[0], "user 0");
        assert_eq!(contents[19], "coach 9");
    }

    #[test]
    fn test_corrupt_rows_are_rejected() {
        let mut record = populated_state().to_record();
        record.current_stage = "closing".to_string();
        assert!(matches!(
            ConversationState::from_record(&record),
            Err(EngineError::CorruptState(_))
        ));

        let mut record = populated_state().to_record();
        record.conversation_history = "not json".to_string();
        assert!(matches!(
            ConversationState::from_record(&record),
            Err(EngineError::CorruptState(_))
        ));
    }

    #[test]
    fn test_updated_at_refreshes_on_append() {
        let mut state = ConversationState::new("u", "s");
        let before = state.updated_at;
        state.push_user("hello");
        assert!(state.updated_at >= before);
    }
}
