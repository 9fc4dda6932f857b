//! Prompt construction and reply post-processing

use coaching_agent_core::{Message, MessageRole};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Role in a chat-completions request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single chat-completions message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Builds the message list for one coaching turn
///
/// System prompt first, then the trimmed conversation history (coach turns
/// map to the assistant role), then the current user message.
pub struct PromptBuilder {
    topic: String,
    stage_guidance: String,
    competency_guidance: String,
    exploration_areas: Vec<String>,
    history_window: usize,
}

impl PromptBuilder {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            stage_guidance: String::new(),
            competency_guidance: String::new(),
            exploration_areas: Vec::new(),
            history_window: 6,
        }
    }

    pub fn with_stage_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.stage_guidance = guidance.into();
        self
    }

    pub fn with_competency_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.competency_guidance = guidance.into();
        self
    }

    pub fn with_exploration_areas(mut self, areas: Vec<String>) -> Self {
        self.exploration_areas = areas;
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    /// Assemble the full request message list
    pub fn build(&self, history: &[Message], user_message: &str) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.system_prompt(history.len()))];

        let start = history.len().saturating_sub(self.history_window);
        for entry in &history[start..] {
            let msg = match entry.role {
                MessageRole::User => ChatMessage::user(&entry.content),
                MessageRole::Coach => ChatMessage::assistant(&entry.content),
            };
            messages.push(msg);
        }

        messages.push(ChatMessage::user(user_message));
        messages
    }

    fn system_prompt(&self, depth: usize) -> String {
        let areas = if self.exploration_areas.is_empty() {
            String::new()
        } else {
            format!(
                "\n\nAreas worth exploring for this topic: {}",
                self.exploration_areas.join(", ")
            )
        };
        format!(
            "You are an expert ICF-certified executive coach specializing in {topic}.\n\n\
             Key coaching principles:\n\
             - Use powerful questions to create awareness\n\
             - Listen actively and reflect what you hear\n\
             - Help the client discover their own insights\n\
             - Focus on action and accountability\n\
             - Be empathetic but challenge thinking patterns\n\
             - Never give direct advice - guide discovery\n\n\
             Competency focus: {competency}\n\n\
             Stage focus: {stage}{areas}\n\n\
             Conversation style:\n\
             - Warm, professional, supportive\n\
             - Ask 1-2 powerful questions per response\n\
             - Acknowledge emotions and patterns\n\
             - Keep responses concise but meaningful (2-3 sentences max)\n\
             - End with a thoughtful question that moves the conversation forward\n\n\
             Current conversation depth: {depth} exchanges",
            topic = self.topic,
            competency = self.competency_guidance,
            stage = self.stage_guidance,
            depth = depth,
        )
    }
}

static QUESTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.!?\n]*\?").expect("question pattern must compile"));

/// Minimum length for an extracted question to count as substantive
const MIN_QUESTION_LEN: usize = 15;

/// Pull up to the last two substantive questions out of a generated reply.
///
/// When the reply carries no usable question, substitute a content-keyed
/// default pair so the envelope always offers at least one follow-up.
pub fn extract_questions(reply: &str) -> Vec<String> {
    let mut questions: Vec<String> = QUESTION_RE
        .find_iter(reply)
        .map(|m| m.as_str().trim().trim_start_matches("- ").trim().to_string())
        .filter(|q| q.len() > MIN_QUESTION_LEN)
        .filter(|q| !q.to_lowercase().starts_with("what do you think"))
        .collect();

    if questions.len() > 2 {
        questions = questions.split_off(questions.len() - 2);
    }

    if !questions.is_empty() {
        return questions;
    }

    let lower = reply.to_lowercase();
    if lower.contains("fear") || lower.contains("afraid") {
        vec![
            "What would it look like to approach this with curiosity instead of fear?".to_string(),
            "What evidence do you have that contradicts this fear?".to_string(),
        ]
    } else if lower.contains("procrastination") || lower.contains("delay") {
        vec![
            "What would help you take the first step on a challenging task?".to_string(),
            "What patterns do you notice about when procrastination shows up?".to_string(),
        ]
    } else {
        vec![
            "What patterns are you noticing as we explore this?".to_string(),
            "What feels most important for you to understand about this situation?".to_string(),
        ]
    }
}
