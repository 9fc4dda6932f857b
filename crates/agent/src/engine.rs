//! The conversation flow engine
//!
//! Owns per-session state, drives stage transitions and, for each message,
//! obtains a reply from the language model or the fallback responder. The
//! model is strictly optional: any model error, including a timeout, degrades
//! to the fallback engine for that single message with no retry.
//!
//! Sessions are keyed by id. Each entry sits behind its own async mutex, so
//! two concurrent messages for the same session serialize while different
//! sessions proceed independently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use coaching_agent_analysis::{ContextAnalyzer, UserContext};
use coaching_agent_config::EngineParams;
use coaching_agent_core::{
    ActionCommitment, ActionTemplate, CoachingResponse, CoachingStage, EmotionalAnalysis,
    SessionSummary,
};
use coaching_agent_llm::{extract_questions, LlmBackend, PromptBuilder};
use coaching_agent_persistence::SessionStore;

use crate::competency::Competency;
use crate::fallback::FallbackResponder;
use crate::state::ConversationState;
use crate::topics::TopicKey;
use crate::transitions::decide_next_stage;
use crate::EngineError;

/// Fixed intake welcome
const WELCOME_MESSAGE: &str =
    "Welcome to your coaching session! I'm here to support you in exploring what's important \
     to you. This is a confidential space where you can share openly.";

const INTAKE_QUESTIONS: &[&str] = &[
    "What brings you to coaching right now?",
    "What would you like to explore in this session?",
    "How can I best support you today?",
];

/// An incoming message, already routed by type
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    /// Free conversational text
    Text(String),
    /// Topic key selected from the catalog
    TopicSelection(String),
    /// A filled-in action template
    ActionCommitment(ActionCommitmentRequest),
}

/// Action commitment payload as received from the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionCommitmentRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub by_when: String,
    #[serde(default)]
    pub success_criteria: String,
    #[serde(default)]
    pub potential_obstacles: String,
    #[serde(default)]
    pub support_needed: String,
}

/// Result of starting a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionStarted {
    pub session_id: String,
    pub user_id: String,
    pub response: CoachingResponse,
}

/// One live session: conversation state plus the per-session fallback
/// trackers, serialized together behind one lock.
struct SessionEntry {
    state: ConversationState,
    fallback: FallbackResponder,
}

/// The conversation flow engine
pub struct CoachingEngine {
    params: EngineParams,
    analyzer: ContextAnalyzer,
    llm: Option<Arc<dyn LlmBackend>>,
    llm_timeout: Duration,
    store: Arc<dyn SessionStore>,
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionEntry>>>>,
}

impl CoachingEngine {
    /// Create an engine with no model backend; every reply uses the
    /// fallback responder and carries `demo_mode = true`.
    pub fn new(params: EngineParams, store: Arc<dyn SessionStore>) -> Self {
        Self {
            params,
            analyzer: ContextAnalyzer::new(),
            llm: None,
            llm_timeout: Duration::from_secs(15),
            store,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Attach a model backend with a bounded per-request timeout
    pub fn with_llm(mut self, backend: Arc<dyn LlmBackend>, timeout: Duration) -> Self {
        self.llm = Some(backend);
        self.llm_timeout = timeout;
        self
    }

    /// Whether a model backend is attached
    pub fn llm_configured(&self) -> bool {
        self.llm.is_some()
    }

    /// Number of sessions currently held in memory
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Start a new coaching session at the intake stage
    pub async fn start_session(&self, user_id: Option<String>) -> SessionStarted {
        let user_id = user_id
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let session_id = Uuid::new_v4().to_string();

        let state = ConversationState::new(&user_id, &session_id);
        self.persist(&state).await;

        let entry = SessionEntry {
            state,
            fallback: FallbackResponder::new(&self.params),
        };
        self.sessions
            .write()
            .insert(session_id.clone(), Arc::new(Mutex::new(entry)));

        tracing::info!(session_id = %session_id, user_id = %user_id, "Started coaching session");

        let response = CoachingResponse::new(
            WELCOME_MESSAGE,
            INTAKE_QUESTIONS.iter().map(|q| (*q).to_string()).collect(),
            CoachingStage::Intake.as_str(),
            Competency::EstablishingTrust.as_str(),
        )
        .with_available_topics(available_topics())
        .with_emotional_analysis(EmotionalAnalysis::default());

        SessionStarted {
            session_id,
            user_id,
            response,
        }
    }

    /// Read-only snapshot of a session's state
    pub async fn get_session(&self, session_id: &str) -> Result<ConversationState, EngineError> {
        let entry = self.entry(session_id).await?;
        let guard = entry.lock().await;
        Ok(guard.state.clone())
    }

    /// Manual stage override, bypassing the content-based rules.
    ///
    /// Unknown stage names are rejected without touching state.
    pub async fn set_stage(
        &self,
        session_id: &str,
        stage_name: &str,
    ) -> Result<CoachingStage, EngineError> {
        let stage = CoachingStage::parse(stage_name)
            .ok_or_else(|| EngineError::InvalidStage(stage_name.to_string()))?;

        let entry = self.entry(session_id).await?;
        let mut guard = entry.lock().await;
        let from = guard.state.current_stage;
        guard.state.current_stage = stage;
        guard.state.touch();
        self.persist(&guard.state).await;

        tracing::info!(session_id = %session_id, from = %from, to = %stage, "Manual stage override");
        Ok(stage)
    }

    /// Process one message for a session
    pub async fn handle_message(
        &self,
        session_id: &str,
        message: IncomingMessage,
    ) -> Result<CoachingResponse, EngineError> {
        let entry = self.entry(session_id).await?;
        let mut guard = entry.lock().await;

        match message {
            IncomingMessage::Text(text) => self.handle_text(&mut guard, &text).await,
            IncomingMessage::TopicSelection(raw) => match TopicKey::parse(&raw) {
                // Invalid keys are rejected before any state mutation
                Some(key) => self.handle_topic_selection(&mut guard, key).await,
                None => Err(EngineError::InvalidTopic(raw)),
            },
            IncomingMessage::ActionCommitment(request) => {
                self.handle_action_commitment(&mut guard, request).await
            }
        }
    }

    async fn handle_text(
        &self,
        entry: &mut SessionEntry,
        text: &str,
    ) -> Result<CoachingResponse, EngineError> {
        let context = self
            .analyzer
            .analyze(text, &entry.state.conversation_history);

        entry.state.push_user(text);
        let depth = entry.state.user_depth();
        let stage = entry.state.current_stage;

        // Intake advances through topic detection on free text
        if stage == CoachingStage::Intake {
            if let Some(key) = TopicKey::detect(&context.corrected_text) {
                let envelope = self.apply_topic(&mut entry.state, key).await;
                return Ok(envelope.with_emotional_analysis(emotional_analysis(&context)));
            }
        }

        let competency = Competency::for_stage(stage, depth);

        let (message, questions, ai_powered) = match self.try_llm(&entry.state, text).await {
            Some(reply) => {
                let questions = extract_questions(&reply);
                (reply, questions, true)
            }
            None => {
                let reply = entry.fallback.respond(
                    &context,
                    &entry.state.conversation_history,
                    depth,
                    stage,
                );
                (reply.message, reply.questions, false)
            }
        };

        entry.state.push_coach(&message);

        let mut envelope = CoachingResponse::new(
            message,
            questions,
            stage.as_str(),
            competency.as_str(),
        )
        .with_emotional_analysis(emotional_analysis(&context));

        if ai_powered {
            envelope = envelope.ai_powered().with_confidence(0.9);
        }

        if let Some(topic) = entry.state.topic {
            envelope = envelope.with_topic(topic.topic().name);
        }

        match stage {
            CoachingStage::Intake => {
                envelope = envelope.with_available_topics(available_topics());
            }
            CoachingStage::Reflection => {
                let insights = self.generate_insights(&entry.state, &context);
                entry.state.insights.extend(insights.iter().cloned());
                envelope = envelope.with_insights(insights);
            }
            CoachingStage::ActionPlanning => {
                envelope = envelope.with_action_template(ActionTemplate::default());
            }
            CoachingStage::FollowUp => {
                envelope = envelope.with_session_summary(session_summary(&entry.state));
            }
            CoachingStage::Exploration => {}
        }

        let text_lower = context.corrected_text.to_lowercase();
        if let Some(next) = decide_next_stage(stage, &text_lower, depth, &self.params) {
            entry.state.current_stage = next;
            entry.state.touch();
            envelope = envelope.with_suggested_next_stage(next.as_str());
            tracing::info!(
                session_id = %entry.state.session_id,
                from = %stage,
                to = %next,
                depth,
                "Stage transition"
            );
        }

        self.persist(&entry.state).await;
        Ok(envelope)
    }

    async fn handle_topic_selection(
        &self,
        entry: &mut SessionEntry,
        key: TopicKey,
    ) -> Result<CoachingResponse, EngineError> {
        entry.state.push_user(key.as_str());

        // Topic is set exactly once. Re-selection is rejected politely:
        // the active topic stays and the reply says so.
        if let Some(active) = entry.state.topic {
            let topic = active.topic();
            let message = format!(
                "We're already exploring {} in this session, so let's stay with it. {} would \
                 be a great focus for a future session.",
                topic.name,
                key.topic().name
            );
            entry.state.push_coach(&message);
            self.persist(&entry.state).await;

            let question = format!(
                "What feels most important to keep exploring about {}?",
                topic.name
            );
            return Ok(CoachingResponse::new(
                message,
                vec![question],
                entry.state.current_stage.as_str(),
                Competency::ActiveListening.as_str(),
            )
            .with_topic(topic.name));
        }

        let envelope = self.apply_topic(&mut entry.state, key).await;
        Ok(envelope)
    }

    /// Set the topic, move intake to exploration and emit the fixed intro
    /// envelope. The current user message is already in history.
    async fn apply_topic(&self, state: &mut ConversationState, key: TopicKey) -> CoachingResponse {
        let topic = key.topic();
        state.topic = Some(key);
        if state.current_stage == CoachingStage::Intake {
            state.current_stage = CoachingStage::Exploration;
        }
        state.push_coach(topic.intro_message);
        self.persist(state).await;

        tracing::info!(
            session_id = %state.session_id,
            topic = %key,
            "Topic selected, moving to exploration"
        );

        CoachingResponse::new(
            topic.intro_message,
            topic.intro_questions(),
            state.current_stage.as_str(),
            Competency::ActiveListening.as_str(),
        )
        .with_topic(topic.name)
    }

    async fn handle_action_commitment(
        &self,
        entry: &mut SessionEntry,
        request: ActionCommitmentRequest,
    ) -> Result<CoachingResponse, EngineError> {
        let commitment = ActionCommitment {
            action: request.action,
            by_when: request.by_when,
            success_criteria: request.success_criteria,
            potential_obstacles: request.potential_obstacles,
            support_needed: request.support_needed,
            committed_at: Utc::now(),
        };

        entry.state.actions.push(commitment.clone());
        entry.state.touch();

        // A concrete commitment completes action planning
        if entry.state.current_stage == CoachingStage::ActionPlanning {
            entry.state.current_stage = CoachingStage::FollowUp;
        }
        self.persist(&entry.state).await;

        tracing::info!(
            session_id = %entry.state.session_id,
            action = %commitment.action,
            "Action commitment recorded"
        );

        let profile = Competency::DesigningActions.profile();
        Ok(CoachingResponse::new(
            "Thank you for making that commitment. I'm confident you can achieve this.",
            profile.follow_up_questions[3..]
                .iter()
                .map(|q| (*q).to_string())
                .collect(),
            entry.state.current_stage.as_str(),
            Competency::DesigningActions.as_str(),
        )
        .with_action_summary(commitment)
        .with_next_steps("We can schedule a follow-up to review your progress.")
        .with_session_summary(session_summary(&entry.state)))
    }

    /// Attempt model generation within the bounded timeout.
    ///
    /// Returns `None` on every failure path; the caller falls back. No retry
    /// is attempted within the same request.
    async fn try_llm(&self, state: &ConversationState, text: &str) -> Option<String> {
        let backend = self.llm.as_ref()?;

        let stage = state.current_stage;
        let depth = state.user_depth();
        let competency = Competency::for_stage(stage, depth);

        let (topic_prompt, areas) = match state.topic {
            Some(key) => {
                let topic = key.topic();
                (
                    format!("{} - {}", topic.name, topic.description),
                    topic
                        .exploration_areas
                        .iter()
                        .map(|a| (*a).to_string())
                        .collect(),
                )
            }
            None => ("personal development".to_string(), Vec::new()),
        };

        let builder = PromptBuilder::new(topic_prompt)
            .with_stage_guidance(Competency::stage_guidance(stage))
            .with_competency_guidance(competency.profile().guidance)
            .with_exploration_areas(areas)
            .with_history_window(self.params.llm_history_window);

        // The current user message was already appended; the prompt builder
        // adds it explicitly, so hand it the history before that point.
        let history = &state.conversation_history
            [..state.conversation_history.len().saturating_sub(1)];
        let messages = builder.build(history, text);

        match tokio::time::timeout(self.llm_timeout, backend.generate(&messages)).await {
            Ok(Ok(reply)) => Some(reply),
            Ok(Err(e)) => {
                tracing::warn!(
                    session_id = %state.session_id,
                    error = %e,
                    "Model generation failed, falling back"
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    session_id = %state.session_id,
                    timeout = ?self.llm_timeout,
                    "Model generation timed out, falling back"
                );
                None
            }
        }
    }

    /// Reflection-stage insight derivation over the accumulated history
    fn generate_insights(&self, state: &ConversationState, context: &UserContext) -> Vec<String> {
        if state.user_depth() < 2 {
            return Vec::new();
        }

        let theme = context
            .key_themes
            .first()
            .map(String::as_str)
            .unwrap_or("what's not working");

        let mut insights = vec![
            "I notice you've mentioned several interconnected challenges.".to_string(),
            format!("There seems to be a pattern around {theme} in what you're sharing."),
            "You appear to have clear awareness of what's not working.".to_string(),
        ];
        insights.truncate(2);
        insights.retain(|i| !state.insights.contains(i));
        insights
    }

    /// Fetch a live session entry, recovering from the store when the
    /// process no longer holds it in memory.
    async fn entry(&self, session_id: &str) -> Result<Arc<Mutex<SessionEntry>>, EngineError> {
        if let Some(entry) = self.sessions.read().get(session_id) {
            return Ok(entry.clone());
        }

        let record = match self.store.load(session_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return Err(EngineError::SessionNotFound(session_id.to_string())),
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "Session store load failed");
                return Err(EngineError::SessionNotFound(session_id.to_string()));
            }
        };

        let state = ConversationState::from_record(&record)?;
        tracing::info!(session_id = %session_id, "Recovered session from store");

        let entry = Arc::new(Mutex::new(SessionEntry {
            state,
            fallback: FallbackResponder::new(&self.params),
        }));

        let mut sessions = self.sessions.write();
        Ok(sessions
            .entry(session_id.to_string())
            .or_insert(entry)
            .clone())
    }

    /// Write-through persistence; failures are logged and absorbed
    async fn persist(&self, state: &ConversationState) {
        if let Err(e) = self.store.upsert(&state.to_record()).await {
            tracing::error!(
                session_id = %state.session_id,
                error = %e,
                "Failed to persist session, continuing"
            );
        }
    }
}

fn available_topics() -> Vec<String> {
    TopicKey::all().iter().map(|k| k.as_str().to_string()).collect()
}

fn session_summary(state: &ConversationState) -> SessionSummary {
    SessionSummary {
        stage: state.current_stage.as_str().to_string(),
        topic: state.topic.map(|t| t.topic().name.to_string()),
        message_count: state.conversation_history.len(),
        insight_count: state.insights.len(),
        action_count: state.actions.len(),
    }
}

fn emotional_analysis(context: &UserContext) -> EmotionalAnalysis {
    if context.primary_emotions.is_empty() {
        EmotionalAnalysis::default()
    } else {
        EmotionalAnalysis {
            primary_emotion: context.primary_emotion().to_string(),
            intensity: (0.5 + context.sentiment_score.abs() * 0.5).clamp(0.4, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coaching_agent_llm::{ChatMessage, LlmError};
    use coaching_agent_persistence::InMemorySessionStore;

    struct FixedBackend {
        reply: String,
    }

    #[async_trait]
    impl LlmBackend for FixedBackend {
        async fn generate(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
            Ok(self.reply.clone())
        }
        async fn is_available(&self) -> bool {
            true
        }
        fn model_name(&self) -> &str {
            "fixed-test-model"
        }
    }

    struct TimeoutBackend;

    #[async_trait]
    impl LlmBackend for TimeoutBackend {
        async fn generate(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
            Err(LlmError::Timeout)
        }
        async fn is_available(&self) -> bool {
            false
        }
        fn model_name(&self) -> &str {
            "timeout-test-model"
        }
    }

    fn engine() -> CoachingEngine {
        CoachingEngine::new(
            EngineParams::default(),
            Arc::new(InMemorySessionStore::new()),
        )
    }

    #[tokio::test]
    async fn test_start_session_envelope() {
        let engine = engine();
        let started = engine.start_session(None).await;

        assert!(!started.session_id.is_empty());
        assert_eq!(started.response.stage, "intake");
        assert_eq!(started.response.questions.len(), 3);
        assert_eq!(started.response.available_topics.len(), 4);
        assert_eq!(
            started.response.competency_applied,
            "establishing_trust_and_intimacy"
        );
        assert!(started.response.demo_mode);
        assert_eq!(engine.session_count(), 1);
    }

    #[tokio::test]
    async fn test_topic_selection_scenario() {
        let engine = engine();
        let started = engine.start_session(None).await;

        let response = engine
            .handle_message(
                &started.session_id,
                IncomingMessage::TopicSelection("performance_improvement".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(response.stage, "exploration");
        assert!(response
            .message
            .starts_with("Great! Let's explore Performance Improvement together."));
        assert_eq!(
            response.questions,
            vec![
                "What specific aspect of your performance would you like to improve?",
                "What's currently working well in your performance?",
            ]
        );

        let state = engine.get_session(&started.session_id).await.unwrap();
        assert_eq!(state.current_stage, CoachingStage::Exploration);
        assert_eq!(state.topic, Some(TopicKey::PerformanceImprovement));
    }

    #[tokio::test]
    async fn test_invalid_topic_rejected_without_mutation() {
        let engine = engine();
        let started = engine.start_session(None).await;

        let result = engine
            .handle_message(
                &started.session_id,
                IncomingMessage::TopicSelection("astrology".to_string()),
            )
            .await;
        assert!(matches!(result, Err(EngineError::InvalidTopic(_))));

        let state = engine.get_session(&started.session_id).await.unwrap();
        assert!(state.topic.is_none());
        assert!(state.conversation_history.is_empty());
        assert_eq!(state.current_stage, CoachingStage::Intake);
    }

    #[tokio::test]
    async fn test_topic_reselection_is_rejected() {
        let engine = engine();
        let started = engine.start_session(None).await;
        let sid = &started.session_id;

        engine
            .handle_message(
                sid,
                IncomingMessage::TopicSelection("performance_improvement".to_string()),
            )
            .await
            .unwrap();

        let response = engine
            .handle_message(
                sid,
                IncomingMessage::TopicSelection("career_development".to_string()),
            )
            .await
            .unwrap();

        assert!(response.message.contains("already exploring Performance Improvement"));
        assert_eq!(response.topic.as_deref(), Some("Performance Improvement"));
        assert!(!response.questions.is_empty());

        let state = engine.get_session(sid).await.unwrap();
        assert_eq!(state.topic, Some(TopicKey::PerformanceImprovement));
    }

    #[tokio::test]
    async fn test_stage_monotonicity_under_default_thresholds() {
        let engine = engine();
        let started = engine.start_session(None).await;
        let sid = &started.session_id;

        engine
            .handle_message(
                sid,
                IncomingMessage::TopicSelection("performance_improvement".to_string()),
            )
            .await
            .unwrap();

        // Nine generic messages with no content triggers: depth thresholds
        // 5/7/9 alone must walk the session to follow-up.
        for _ in 0..9 {
            engine
                .handle_message(sid, IncomingMessage::Text("okay".to_string()))
                .await
                .unwrap();
        }

        let state = engine.get_session(sid).await.unwrap();
        assert_eq!(state.user_depth(), 10);
        assert_eq!(state.current_stage, CoachingStage::FollowUp);
    }

    #[tokio::test]
    async fn test_total_llm_failure_still_coaches() {
        let store = Arc::new(InMemorySessionStore::new());
        let engine = CoachingEngine::new(EngineParams::default(), store)
            .with_llm(Arc::new(TimeoutBackend), Duration::from_secs(1));
        let started = engine.start_session(None).await;
        let sid = &started.session_id;

        engine
            .handle_message(
                sid,
                IncomingMessage::TopicSelection("career_development".to_string()),
            )
            .await
            .unwrap();

        for text in ["i'm worried about my role", "still worried", "what should i do"] {
            let response = engine
                .handle_message(sid, IncomingMessage::Text(text.to_string()))
                .await
                .unwrap();
            assert!(!response.message.is_empty());
            assert!(!response.questions.is_empty());
            assert!(response.demo_mode);
        }
    }

    #[tokio::test]
    async fn test_model_reply_marks_ai_powered() {
        let backend = FixedBackend {
            reply: "That sounds significant. What would success look like for you? \
                    What support would make the first step easier?"
                .to_string(),
        };
        let engine = CoachingEngine::new(
            EngineParams::default(),
            Arc::new(InMemorySessionStore::new()),
        )
        .with_llm(Arc::new(backend), Duration::from_secs(5));

        let started = engine.start_session(None).await;
        let sid = &started.session_id;
        engine
            .handle_message(
                sid,
                IncomingMessage::TopicSelection("leadership_growth".to_string()),
            )
            .await
            .unwrap();

        let response = engine
            .handle_message(sid, IncomingMessage::Text("i feel stretched thin".to_string()))
            .await
            .unwrap();

        assert!(!response.demo_mode);
        assert_eq!(response.ai_confidence, 0.9);
        assert_eq!(response.questions.len(), 2);
        assert!(response.questions[1].contains("support"));

        // Coach reply landed in history
        let state = engine.get_session(sid).await.unwrap();
        assert!(state
            .conversation_history
            .last()
            .unwrap()
            .content
            .contains("What support would make"));
    }

    #[tokio::test]
    async fn test_manual_stage_override() {
        let engine = engine();
        let started = engine.start_session(None).await;
        let sid = &started.session_id;

        let result = engine.set_stage(sid, "closing").await;
        assert!(matches!(result, Err(EngineError::InvalidStage(_))));
        let state = engine.get_session(sid).await.unwrap();
        assert_eq!(state.current_stage, CoachingStage::Intake);

        let stage = engine.set_stage(sid, "reflection").await.unwrap();
        assert_eq!(stage, CoachingStage::Reflection);
        let state = engine.get_session(sid).await.unwrap();
        assert_eq!(state.current_stage, CoachingStage::Reflection);
    }

    #[tokio::test]
    async fn test_reflection_stage_produces_insights() {
        let engine = engine();
        let started = engine.start_session(None).await;
        let sid = &started.session_id;

        engine
            .handle_message(
                sid,
                IncomingMessage::TopicSelection("performance_improvement".to_string()),
            )
            .await
            .unwrap();
        engine
            .handle_message(sid, IncomingMessage::Text("i keep procrastinating".to_string()))
            .await
            .unwrap();
        engine.set_stage(sid, "reflection").await.unwrap();

        let response = engine
            .handle_message(
                sid,
                IncomingMessage::Text("i keep avoiding the hard reports".to_string()),
            )
            .await
            .unwrap();

        assert!(!response.insights.is_empty());
        let state = engine.get_session(sid).await.unwrap();
        assert!(!state.insights.is_empty());
    }

    #[tokio::test]
    async fn test_action_commitment_is_recorded() {
        let engine = engine();
        let started = engine.start_session(None).await;
        let sid = &started.session_id;

        engine
            .handle_message(
                sid,
                IncomingMessage::TopicSelection("performance_improvement".to_string()),
            )
            .await
            .unwrap();
        engine.set_stage(sid, "action_planning").await.unwrap();

        let response = engine
            .handle_message(
                sid,
                IncomingMessage::ActionCommitment(ActionCommitmentRequest {
                    action: "Break one project into 15-minute tasks".to_string(),
                    by_when: "Friday".to_string(),
                    success_criteria: "Three tasks done".to_string(),
                    potential_obstacles: "Meetings".to_string(),
                    support_needed: "None".to_string(),
                }),
            )
            .await
            .unwrap();

        assert_eq!(response.stage, "follow_up");
        assert!(response.action_summary.is_some());
        assert!(response.next_steps.is_some());
        assert!(!response.questions.is_empty());

        let state = engine.get_session(sid).await.unwrap();
        assert_eq!(state.actions.len(), 1);
        assert_eq!(state.current_stage, CoachingStage::FollowUp);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let engine = engine();
        let result = engine
            .handle_message("no-such-session", IncomingMessage::Text("hi".to_string()))
            .await;
        assert!(matches!(result, Err(EngineError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_session_recovery_from_store() {
        let store: Arc<InMemorySessionStore> = Arc::new(InMemorySessionStore::new());

        let sid = {
            let engine = CoachingEngine::new(EngineParams::default(), store.clone());
            let started = engine.start_session(Some("user-9".to_string())).await;
            engine
                .handle_message(
                    &started.session_id,
                    IncomingMessage::TopicSelection("work_life_balance".to_string()),
                )
                .await
                .unwrap();
            started.session_id
        };

        // A fresh engine sharing the store recovers the session
        let engine = CoachingEngine::new(EngineParams::default(), store);
        let state = engine.get_session(&sid).await.unwrap();
        assert_eq!(state.user_id, "user-9");
        assert_eq!(state.topic, Some(TopicKey::WorkLifeBalance));
        assert_eq!(state.current_stage, CoachingStage::Exploration);

        let response = engine
            .handle_message(&sid, IncomingMessage::Text("hello again".to_string()))
            .await
            .unwrap();
        assert!(!response.message.is_empty());
    }

    #[tokio::test]
    async fn test_intake_free_text_detects_topic() {
        let engine = engine();
        let started = engine.start_session(None).await;

        let response = engine
            .handle_message(
                &started.session_id,
                IncomingMessage::Text("I'd like to work on my leadership skills".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(response.stage, "exploration");
        assert_eq!(response.topic.as_deref(), Some("Leadership Growth"));

        let state = engine.get_session(&started.session_id).await.unwrap();
        assert_eq!(state.topic, Some(TopicKey::LeadershipGrowth));
    }
}
