//! Categorized follow-up question bank
//!
//! Questions are tracked per session for the whole conversation: no question
//! is asked twice until the candidate pool is exhausted, at which point the
//! tracking set resets.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::Rng;

/// Exploration & understanding
const EXPLORATION: &[&str] = &[
    "What beliefs about yourself might be contributing to this situation?",
    "What thoughts go through your mind when facing these situations?",
    "What physical sensations do you notice when this happens?",
    "What stories do you tell yourself in these moments?",
    "What would your best friend say about this situation?",
    "What's underneath this challenge for you?",
    "What does this situation remind you of from your past?",
    "What are you learning about yourself through this?",
    "What assumptions might you be making here?",
    "What's the most surprising thing about this pattern?",
];

/// Patterns & awareness
const PATTERNS: &[&str] = &[
    "What patterns do you notice about when this happens most?",
    "When you do feel confident and capable, what's different?",
    "What circumstances tend to trigger this response?",
    "How does this show up in other areas of your life?",
    "What would need to be different for you to feel more confident?",
    "What environments or situations bring out your best?",
    "What's worked for you in similar situations before?",
    "What would someone who knows you well say about your strengths?",
    "How has this pattern served you in the past?",
    "What's changed recently that might be affecting this?",
];

/// Resources & strengths
const RESOURCES: &[&str] = &[
    "What resources or support systems do you currently have?",
    "What skills do you already possess that could help here?",
    "Who in your life believes in your capabilities?",
    "What past successes can you draw strength from?",
    "What would accessing your full potential look like?",
    "What support would be most helpful right now?",
    "What internal resources can you tap into?",
    "What would encourage you to take the next step?",
    "What would your wisest self advise you to do?",
    "What energizes you most about making this change?",
];

/// Action & implementation
const ACTION: &[&str] = &[
    "What feels like the most natural first step for you?",
    "What small experiment could you try this week?",
    "What would make taking action feel easier?",
    "What obstacles do you anticipate, and how might you address them?",
    "What would accountability look like for you?",
    "What would motivate you to follow through?",
    "How could you break this down into smaller pieces?",
    "What would you need to believe about yourself to move forward?",
    "What would happen if you trusted yourself more?",
    "What commitment are you ready to make to yourself?",
];

/// Success & vision
const SUCCESS: &[&str] = &[
    "What would it feel like to have overcome this challenge?",
    "How would others notice the change in you?",
    "What would become possible if you solved this?",
    "What impact would this change have on your work and life?",
    "How will you celebrate when you make progress?",
    "What would your future self thank you for doing now?",
    "What excites you most about this potential change?",
    "What would confidence look like in your daily life?",
    "How would you know you're making real progress?",
];

/// Content-triggered banks
const PROCRASTINATION: &[&str] = &[
    "What typically happens right before you decide to postpone a task?",
    "How long do tasks usually sit before you finally tackle them?",
    "What's the difference between tasks you complete immediately and those you postpone?",
];

const CONFIDENCE: &[&str] = &[
    "When was the last time you felt truly confident in your abilities?",
    "What would need to happen for you to trust yourself more with new challenges?",
    "How do you typically build confidence when learning something new?",
];

const NEW_TASKS: &[&str] = &[
    "What makes a task feel manageable versus overwhelming to you?",
    "How do you usually approach learning something completely new?",
    "What support would help you feel more prepared for unfamiliar work?",
];

/// Last-resort questions once the whole pool has cycled
const RESERVE: &[&str] = &[
    "What insight feels most important right now?",
    "What would you like to explore further?",
    "What's calling for your attention in this situation?",
];

/// Per-session question selection with whole-conversation tracking
#[derive(Debug, Default)]
pub struct QuestionBank {
    used: HashSet<String>,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `count` follow-up questions.
    ///
    /// Rule-specific `primary` candidates are preferred in order, then the
    /// remainder is drawn at random from the content- and depth-keyed
    /// categories. Everything selected is marked used for the rest of the
    /// session.
    pub fn select(
        &mut self,
        rng: &mut StdRng,
        primary: &[String],
        text_lower: &str,
        depth: usize,
        count: usize,
    ) -> Vec<String> {
        let mut selected: Vec<String> = Vec::with_capacity(count);

        for question in primary {
            if selected.len() >= count {
                break;
            }
            if !self.used.contains(question) && !selected.contains(question) {
                selected.push(question.clone());
            }
        }

        let mut candidates = self.candidates(text_lower, depth);
        candidates.retain(|q| !self.used.contains(*q) && !selected.iter().any(|s| s == q));

        // Exhausted the bank: reset tracking and fall back to the reserve set
        if selected.len() + candidates.len() < count {
            tracing::debug!("Question bank exhausted for session, resetting tracking");
            self.used.clear();
            candidates = RESERVE.to_vec();
        }

        while selected.len() < count && !candidates.is_empty() {
            let idx = rng.gen_range(0..candidates.len());
            selected.push(candidates.swap_remove(idx).to_string());
        }

        for question in &selected {
            self.used.insert(question.clone());
        }

        selected
    }

    /// Candidate pool keyed by message content and conversation depth
    fn candidates(&self, text_lower: &str, depth: usize) -> Vec<&'static str> {
        let mut pool: Vec<&'static str> = Vec::new();

        if text_lower.contains("procrastin") {
            pool.extend_from_slice(PROCRASTINATION);
        }
        if text_lower.contains("confidence") || text_lower.contains("doubt") {
            pool.extend_from_slice(CONFIDENCE);
        }
        if text_lower.contains("new task") || text_lower.contains("unfamiliar") {
            pool.extend_from_slice(NEW_TASKS);
        }

        if depth <= 2 {
            pool.extend_from_slice(EXPLORATION);
            pool.extend_from_slice(PATTERNS);
            pool.extend_from_slice(&RESOURCES[..3]);
        } else if depth <= 4 {
            pool.extend_from_slice(PATTERNS);
            pool.extend_from_slice(RESOURCES);
            pool.extend_from_slice(&EXPLORATION[..3]);
            pool.extend_from_slice(&ACTION[..3]);
        } else {
            pool.extend_from_slice(ACTION);
            pool.extend_from_slice(SUCCESS);
            pool.extend_from_slice(&RESOURCES[..3]);
            pool.extend_from_slice(&PATTERNS[..3]);
        }

        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_selects_requested_count() {
        let mut bank = QuestionBank::new();
        let questions = bank.select(&mut rng(), &[], "tell me more", 1, 2);
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn test_primary_candidates_win() {
        let mut bank = QuestionBank::new();
        let primary = vec![
            "What tasks do you find yourself putting off most often?".to_string(),
            "What might be underneath the procrastination?".to_string(),
        ];
        let questions = bank.select(&mut rng(), &primary, "procrastination", 1, 2);
        assert_eq!(questions, primary);
    }

    #[test]
    fn test_no_question_repeats_within_session() {
        let mut bank = QuestionBank::new();
        let mut rng = rng();
        let mut seen = HashSet::new();

        // Far fewer draws than the pool holds: every draw must be fresh
        for depth in 0..10 {
            for q in bank.select(&mut rng, &[], "confidence and doubt", depth, 2) {
                assert!(seen.insert(q), "question repeated before exhaustion");
            }
        }
    }

    #[test]
    fn test_exhaustion_resets_tracking() {
        let mut bank = QuestionBank::new();
        let mut rng = rng();

        // Drain the deep-stage pool completely
        for _ in 0..40 {
            bank.select(&mut rng, &[], "generic", 9, 2);
        }

        // Still produces the requested number of questions
        let questions = bank.select(&mut rng, &[], "generic", 9, 2);
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn test_content_keyed_banks_surface() {
        let mut bank = QuestionBank::new();
        let mut rng = rng();
        let mut all = Vec::new();
        for _ in 0..3 {
            all.extend(bank.select(&mut rng, &[], "i keep procrastinating", 1, 2));
        }
        assert!(all
            .iter()
            .any(|q| PROCRASTINATION.contains(&q.as_str()) || q.contains("postpone")));
    }
}
