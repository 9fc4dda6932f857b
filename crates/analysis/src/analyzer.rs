//! The context analyzer
//!
//! Pure function of the message text plus the trailing conversation history.
//! Every step is ordered: correction, sentiment, emotions, challenges,
//! strengths, intent, confidence, readiness, themes.

use coaching_agent_core::{Message, MessageRole};

use crate::context::{ConfidenceLevel, Readiness, UserContext, UserIntent};
use crate::lexicon::*;
use crate::spelling::correct_spelling;

/// Maximum emotions / themes carried in a context
const MAX_EMOTIONS: usize = 3;
const MAX_THEMES: usize = 3;

/// Trailing user messages considered for cross-message theme aggregation
const HISTORY_THEME_WINDOW: usize = 6;

/// Analyzes user input for semantic meaning and context
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAnalyzer;

impl ContextAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze a user message into a structured context
    ///
    /// Never fails; empty input yields a neutral context.
    pub fn analyze(&self, text: &str, history: &[Message]) -> UserContext {
        let corrected = correct_spelling(text);
        if corrected.trim().is_empty() {
            return UserContext::neutral(corrected);
        }

        let lower = corrected.to_lowercase();

        let sentiment_score = self.sentiment(&corrected, &lower);
        let primary_emotions = self.extract_emotions(&lower);
        let challenges_mentioned = self.extract_challenges(&lower);
        let strengths_mentioned = self.extract_strengths(&lower);
        let intent = self.classify_intent(&lower);
        let confidence_level = self.assess_confidence(&lower, &primary_emotions);
        let readiness_for_action = self.assess_readiness(&lower, intent);
        let key_themes = self.derive_themes(
            &challenges_mentioned,
            &strengths_mentioned,
            &primary_emotions,
            history,
        );

        UserContext {
            corrected_text: corrected,
            primary_emotions,
            challenges_mentioned,
            strengths_mentioned,
            intent,
            confidence_level,
            readiness_for_action,
            key_themes,
            sentiment_score,
        }
    }

    /// Presence-based sentiment over fixed word lists, scaled by length
    fn sentiment(&self, corrected: &str, lower: &str) -> f32 {
        let word_count = corrected.split_whitespace().count();
        if word_count == 0 {
            return 0.0;
        }

        let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as f32;
        let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as f32;

        ((positive - negative) / word_count as f32 * 2.0).clamp(-1.0, 1.0)
    }

    fn extract_emotions(&self, lower: &str) -> Vec<String> {
        let mut emotions: Vec<String> = EMOTION_PATTERNS
            .iter()
            .filter(|(_, patterns)| contains_any(lower, patterns))
            .map(|(name, _)| (*name).to_string())
            .collect();

        if contains_any(lower, DIFFICULTY_CLUES) && !emotions.iter().any(|e| e == "difficulty") {
            emotions.push("difficulty".to_string());
        }

        if contains_any(lower, MOTIVATION_CLUES) && !emotions.iter().any(|e| e == "motivation") {
            emotions.push("motivation".to_string());
        }

        emotions.truncate(MAX_EMOTIONS);
        emotions
    }

    fn extract_challenges(&self, lower: &str) -> Vec<String> {
        CHALLENGE_PATTERNS
            .iter()
            .filter(|(_, patterns)| contains_any(lower, patterns))
            .map(|(name, _)| (*name).to_string())
            .collect()
    }

    fn extract_strengths(&self, lower: &str) -> Vec<String> {
        let mut strengths: Vec<String> = STRENGTH_PATTERNS
            .iter()
            .filter(|(_, patterns)| contains_any(lower, patterns))
            .map(|(name, _)| (*name).to_string())
            .collect();

        if contains_any(lower, SELF_AWARENESS_CLUES)
            && !strengths.iter().any(|s| s == "self_awareness")
        {
            strengths.push("self_awareness".to_string());
        }

        strengths
    }

    /// First phrase group with a match wins; the ordering is the priority.
    fn classify_intent(&self, lower: &str) -> UserIntent {
        if contains_any(lower, UNDERSTANDING_PHRASES) {
            UserIntent::SeekingUnderstanding
        } else if contains_any(lower, SOLUTION_PHRASES) {
            UserIntent::SeekingSolutions
        } else if contains_any(lower, ACTION_PHRASES) {
            UserIntent::ReadyForAction
        } else if contains_any(lower, SHARING_PHRASES) {
            UserIntent::SharingInformation
        } else if contains_any(lower, FEELING_PHRASES) {
            UserIntent::ExpressingFeelings
        } else {
            UserIntent::Exploring
        }
    }

    fn assess_confidence(&self, lower: &str, emotions: &[String]) -> ConfidenceLevel {
        let high = HIGH_CONFIDENCE_WORDS
            .iter()
            .filter(|w| lower.contains(*w))
            .count();
        let low = LOW_CONFIDENCE_WORDS
            .iter()
            .filter(|w| lower.contains(*w))
            .count();

        let anxious = emotions
            .iter()
            .any(|e| e == "anxiety" || e == "doubt" || e == "difficulty");

        if anxious || low > high {
            ConfidenceLevel::Low
        } else if emotions.iter().any(|e| e == "confidence") || high > low {
            ConfidenceLevel::High
        } else {
            ConfidenceLevel::Medium
        }
    }

    fn assess_readiness(&self, lower: &str, intent: UserIntent) -> Readiness {
        let ready = READY_WORDS.iter().filter(|w| lower.contains(*w)).count();
        let resistant = RESISTANT_WORDS.iter().filter(|w| lower.contains(*w)).count();

        if intent == UserIntent::ReadyForAction || ready > resistant {
            Readiness::Ready
        } else if resistant > ready {
            Readiness::Resistant
        } else {
            Readiness::Exploring
        }
    }

    /// Combine challenges, strengths and emotions into overarching themes
    fn derive_themes(
        &self,
        challenges: &[String],
        strengths: &[String],
        emotions: &[String],
        history: &[Message],
    ) -> Vec<String> {
        let mut themes = Vec::new();

        let has = |list: &[String], tag: &str| list.iter().any(|t| t == tag);
        let fearful = has(emotions, "anxiety") || has(emotions, "doubt");

        if has(challenges, "procrastination") && fearful {
            themes.push("fear_based_avoidance".to_string());
        }

        if has(challenges, "new_tasks") && has(emotions, "doubt") {
            themes.push("comfort_zone_resistance".to_string());
        }

        if has(challenges, "confidence_issues") || fearful {
            themes.push("self_worth_concerns".to_string());
        }

        if (has(strengths, "execution") || has(strengths, "analytical")) && !challenges.is_empty() {
            themes.push("capability_awareness_gap".to_string());
        }

        if fearful || has(emotions, "frustration") || has(emotions, "difficulty") {
            themes.push("emotional_barriers".to_string());
        }

        // Growth framing applies whenever challenges surfaced, here or in the
        // trailing window of earlier user messages.
        if !challenges.is_empty() || self.history_mentions_challenges(history) {
            themes.push("growth_opportunities".to_string());
        }

        themes.truncate(MAX_THEMES);
        themes
    }

    fn history_mentions_challenges(&self, history: &[Message]) -> bool {
        history
            .iter()
            .rev()
            .filter(|m| m.role == MessageRole::User)
            .take(HISTORY_THEME_WINDOW)
            .any(|m| {
                let lower = m.content.to_lowercase();
                CHALLENGE_PATTERNS
                    .iter()
                    .any(|(_, patterns)| contains_any(&lower, patterns))
            })
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> UserContext {
        ContextAnalyzer::new().analyze(text, &[])
    }

    #[test]
    fn test_empty_input_is_neutral() {
        let ctx = analyze("");
        assert_eq!(ctx.sentiment_score, 0.0);
        assert_eq!(ctx.intent, UserIntent::Exploring);
        assert_eq!(ctx.confidence_level, ConfidenceLevel::Medium);
        assert!(ctx.primary_emotions.is_empty());

        let ctx = analyze("   ");
        assert_eq!(ctx.sentiment_score, 0.0);
    }

    #[test]
    fn test_sentiment_is_bounded() {
        let positive = analyze("great excellent confident ready");
        assert!(positive.sentiment_score > 0.0);
        assert!(positive.sentiment_score <= 1.0);

        let negative = analyze("bad terrible awful scared");
        assert!(negative.sentiment_score < 0.0);
        assert!(negative.sentiment_score >= -1.0);

        // Dense negative text must clamp, not overflow the range
        let dense = analyze("bad terrible awful scared worried");
        assert!((-1.0..=1.0).contains(&dense.sentiment_score));
    }

    #[test]
    fn test_emotion_extraction_caps_at_three() {
        let ctx = analyze("I'm scared, unsure, frustrated, and also excited and motivated");
        assert!(ctx.primary_emotions.len() <= 3);
        assert_eq!(ctx.primary_emotions[0], "anxiety");
    }

    #[test]
    fn test_misspelled_challenge_is_still_detected() {
        let ctx = analyze("my bigest chalenge is procastination");
        assert!(ctx.corrected_text.contains("procrastination"));
        assert!(ctx
            .challenges_mentioned
            .iter()
            .any(|c| c == "procrastination"));
    }

    #[test]
    fn test_fear_based_avoidance_theme() {
        let ctx = analyze("I keep procrastinating on tasks because I'm scared of failing");
        assert!(ctx.key_themes.iter().any(|t| t == "fear_based_avoidance"));
    }

    #[test]
    fn test_intent_priority_order() {
        // "why" beats the feelings group even when both match
        let ctx = analyze("I feel like I need to understand why this happens");
        assert_eq!(ctx.intent, UserIntent::SeekingUnderstanding);

        let ctx = analyze("how can I fix this");
        assert_eq!(ctx.intent, UserIntent::SeekingSolutions);

        let ctx = analyze("let me tell you about my week");
        assert_eq!(ctx.intent, UserIntent::SharingInformation);
    }

    #[test]
    fn test_anxiety_forces_low_confidence() {
        let ctx = analyze("I'm confident and skilled but honestly quite anxious about it");
        assert!(ctx.primary_emotions.iter().any(|e| e == "anxiety"));
        assert_eq!(ctx.confidence_level, ConfidenceLevel::Low);
    }

    #[test]
    fn test_readiness_detection() {
        let ctx = analyze("I'm ready to commit to a plan and start this week");
        assert_eq!(ctx.readiness_for_action, Readiness::Ready);

        let ctx = analyze("maybe, but it's difficult, not sure I can");
        assert_eq!(ctx.readiness_for_action, Readiness::Resistant);
    }

    #[test]
    fn test_history_feeds_growth_theme() {
        let analyzer = ContextAnalyzer::new();
        let history = vec![
            Message::user("I keep procrastinating on my reports"),
            Message::coach("What do you notice about when that happens?"),
        ];
        // Current message mentions no challenge, but the window does
        let ctx = analyzer.analyze("mostly in the mornings", &history);
        assert!(ctx.key_themes.iter().any(|t| t == "growth_opportunities"));
    }
}
