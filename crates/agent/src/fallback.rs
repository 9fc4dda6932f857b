//! Deterministic fallback response engine
//!
//! Produces the canned coaching reply when the language model is
//! unavailable or fails. Selection is a decision table: the stage pools for
//! action planning and follow-up come first, then the content rules in fixed
//! priority order (procrastination > fear > physical symptoms > goals >
//! default). The procrastination and fear rules escalate through three tiers
//! keyed by how often the theme appeared in the trailing history window.
//!
//! Anti-repetition, not determinism, is the primary property: a per-session
//! set of recently emitted responses filters each candidate pool, and an
//! exhausted pool resets rather than deadlocking.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use coaching_agent_analysis::{ConfidenceLevel, Readiness, UserContext, UserIntent};
use coaching_agent_config::EngineParams;
use coaching_agent_core::{CoachingStage, Message, MessageRole};

use crate::questions::QuestionBank;

/// A fallback reply: always a non-empty message plus follow-up questions
#[derive(Debug, Clone)]
pub struct FallbackReply {
    pub message: String,
    pub questions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Content rule keywords
// ---------------------------------------------------------------------------

const PROCRASTINATION_KEYWORDS: &[&str] = &[
    "procrastination",
    "procrastinate",
    "putting off",
    "delay",
    "avoiding",
    "struggle",
];

/// Words counted when measuring how often procrastination came up earlier
const PROCRASTINATION_MENTION_WORDS: &[&str] = &["procrastination", "procrastinate"];

const FEAR_KEYWORDS: &[&str] = &["fear", "scared", "afraid", "failure", "fail", "worried"];

const FEAR_MENTION_WORDS: &[&str] = &["fear", "scared", "afraid", "worried"];

const PHYSICAL_KEYWORDS: &[&str] = &[
    "body", "shiver", "sweat", "profusely", "physical", "symptoms", "jittery", "run away",
];

const GOAL_KEYWORDS: &[&str] = &[
    "want to",
    "complete tasks",
    "on time",
    "without procrastination",
    "reputation",
    "opportunities",
];

/// Phrases that mark the user sharing insight rather than stating a problem
const INSIGHT_SHARING_PHRASES: &[&str] = &[
    "when i started",
    "i learned",
    "i realized",
    "eventually i",
    "i was able to",
    "has stayed with me",
    "i got better",
    "i discovered",
    "i found that",
    "looking back",
    "now i see",
];

// ---------------------------------------------------------------------------
// Tiered response pools
//
// Tier 0 acknowledges and explores, tier 1 probes the pattern, tier 2 pivots
// to concrete action. The tests assert tier membership, so each tier's texts
// stay distinct from the other tiers'.
// ---------------------------------------------------------------------------

pub(crate) const PROCRASTINATION_TIERS: [&[&str]; 3] = [
    &[
        "I hear that procrastination is showing up as a significant challenge for you. That \
         takes courage to name directly. What do you notice about when procrastination tends \
         to happen most for you?",
        "I hear that procrastination is creating real challenges for you. Can you help me \
         understand what procrastination looks like in your day-to-day work?",
        "Procrastination can feel overwhelming when it becomes a pattern. What types of tasks \
         do you find yourself putting off most often?",
    ],
    &[
        "You've mentioned procrastination again, which tells me it's really central to what \
         you're experiencing. Let's explore the pattern more deeply. What happens right before \
         you start to procrastinate?",
        "I can hear that procrastination feels like a major barrier for you. What happens in \
         the moments just before you decide to postpone a task?",
    ],
    &[
        "I'm noticing procrastination keeps coming up in our conversation. This suggests we're \
         touching on something really important. What would be one small step you could take \
         today to break this pattern?",
        "Procrastination has been a steady thread in what you're sharing. What's the smallest \
         possible action you could take on a challenging task right now?",
    ],
];

const PROCRASTINATION_TIER_QUESTIONS: [&[&str]; 3] = [
    &[
        "What tasks do you find yourself putting off most often?",
        "What might be underneath the procrastination - fear, perfectionism, or something else?",
    ],
    &[
        "What thoughts or feelings show up just before you avoid a task?",
        "If procrastination wasn't an option, what would you do instead?",
    ],
    &[
        "What's the smallest possible action you could take on a challenging task right now?",
        "What would success look like if you completed just one difficult task this week?",
    ],
];

pub(crate) const FEAR_TIERS: [&[&str]; 3] = [
    &[
        "I can hear that fear is playing a significant role in your experience. Fear of \
         failure is incredibly common, and it takes real courage to name it. What do you \
         think this fear is trying to protect you from?",
        "Fear of failure shows up for so many capable people. It takes honesty to name it \
         directly. What do you imagine this fear is protecting you from?",
    ],
    &[
        "Fear seems to be a central theme in what you're experiencing. I'm curious - when did \
         you first learn to be afraid of failing? What message did you receive about making \
         mistakes?",
        "You've touched on fear again, which tells me it sits close to the center of this. \
         When did you first notice this fear of failing taking hold?",
    ],
    &[
        "I'm hearing how deeply this fear has influenced your relationship with challenging \
         tasks. Given everything you've shared about where this fear comes from, what feels \
         most important to address right now?",
        "I can hear your readiness to move beyond this fear pattern. That's a powerful shift \
         from feeling stuck to wanting action. What would taking just one small step look \
         like for you?",
    ],
];

const FEAR_TIER_QUESTIONS: [&[&str]; 3] = [
    &[
        "When you imagine completing the task successfully, what comes up for you?",
        "What would it mean about you if you did fail at this task?",
    ],
    &[
        "What would you tell a good friend who was experiencing this same fear?",
        "What evidence do you have that contradicts this fear?",
    ],
    &[
        "What would be different if you could approach complex tasks with curiosity instead of fear?",
        "What's one way you could start building evidence that you can handle challenging work?",
    ],
];

const PHYSICAL_RESPONSES: &[&str] = &[
    "I can hear how intensely your body is responding to these challenging situations. Your \
     body is giving you important information about your stress response. It sounds like your \
     nervous system is trying to protect you. What helps you feel most grounded when you \
     notice these physical reactions?",
    "Those physical reactions sound intense. Your body is telling you something important \
     about how much pressure these situations carry for you. What helps you feel steady when \
     those sensations show up?",
];

const PHYSICAL_QUESTIONS: &[&str] = &[
    "What would it be like to approach a challenging task when your body feels calm and ready?",
    "What strategies have helped you manage anxiety in other areas of your life?",
];

const GOAL_EARLY_RESPONSES: &[&str] = &[
    "That's a powerful goal - completing tasks on time without procrastination. I can hear \
     how much this matters to you, especially when you mention reputation and missed \
     opportunities. What would change in your life if you achieved this?",
    "That's a meaningful aspiration - finishing what you start, on time, without the \
     last-minute scramble. What would change in your life if you achieved this?",
];

const GOAL_EARLY_QUESTIONS: &[&str] = &[
    "What would be different about how you feel about yourself?",
    "What opportunities might open up for you?",
];

const GOAL_LATE_RESPONSES: &[&str] = &[
    "I hear how important this is to you - completing tasks on time and protecting your \
     reputation. Given everything we've discussed about fear and procrastination, what would \
     be one specific strategy you could try this week?",
    "Completing work on time clearly matters to you, and so does how your work is seen. \
     Based on what we've explored, what's one concrete strategy you could test this week?",
];

const GOAL_LATE_QUESTIONS: &[&str] = &[
    "What would completing tasks on time give you that you don't have now?",
    "What's one task you've been putting off that you could commit to finishing this week?",
];

// ---------------------------------------------------------------------------
// Stage pools: action planning and follow-up route on their own keywords
// before the generic rules apply.
// ---------------------------------------------------------------------------

const ACTION_READY_RESPONSES: &[&str] = &[
    "That's wonderful to hear your readiness! What specific action feels most important to \
     focus on first?",
    "I can sense your commitment to moving forward. What would be the most meaningful first \
     step you could take?",
    "Your willingness to take action is inspiring. What concrete step could you commit to \
     this week?",
    "I appreciate your readiness to create change. What action would have the biggest impact \
     on your situation?",
];

const ACTION_BREAKDOWN_RESPONSES: &[&str] = &[
    "Breaking things down into smaller steps is such a powerful strategy! How might you \
     structure these smaller tasks?",
    "That approach of breaking complex tasks down shows real insight. What would be your \
     first small step?",
    "I love how you're thinking about manageable pieces. What's the smallest step you could \
     take to get started?",
    "Your plan to break things down is excellent. How will you organize these smaller tasks \
     to maintain momentum?",
];

const ACTION_FEAR_RESPONSES: &[&str] = &[
    "Moving through fear takes real courage. What support would help you take that first \
     brave step?",
    "I hear your determination to overcome these challenges. What would make the first \
     action feel more manageable?",
    "Your awareness of fear is the first step to moving through it. What would help you feel \
     more prepared?",
    "It takes strength to face fears head-on. What resources could you tap into to support \
     this change?",
];

const ACTION_STRETCH_RESPONSES: &[&str] = &[
    "A stretch project sounds like a perfect way to put your new approach into practice! \
     What type of project are you considering?",
    "I love that you want to challenge yourself with something new. What would make this \
     stretch project feel both challenging and achievable?",
    "Taking on a stretch project shows real growth mindset. How will you approach this \
     differently than you might have before?",
    "What an excellent way to practice your new skills! What support would help you succeed \
     with this stretch project?",
];

const ACTION_GENERAL_RESPONSES: &[&str] = &[
    "Let's focus on turning your insights into action. What specific change would make the \
     biggest difference?",
    "I can see you're ready to move forward. What concrete step feels most important to \
     commit to?",
    "Your self-awareness gives you a strong foundation for action. What would you like to \
     focus on implementing?",
    "What action could you take that would start to shift the patterns we've been discussing?",
    "How can we translate your insights into specific, actionable steps?",
    "What would be the most meaningful action you could commit to right now?",
];

const FOLLOW_UP_PROGRESS_RESPONSES: &[&str] = &[
    "That's fantastic progress! What has been the most surprising part of your journey so far?",
    "I'm thrilled to hear about your success! What's been the key to making this progress?",
    "Your progress is inspiring! What difference are you noticing in how you approach \
     challenges now?",
    "It's wonderful to see your hard work paying off. What would you like to build on next?",
];

const FOLLOW_UP_STRUGGLE_RESPONSES: &[&str] = &[
    "Thank you for being honest about the challenges. What support would be most helpful \
     right now?",
    "I appreciate you sharing what's been difficult. What adjustments might help you move \
     forward?",
    "It takes courage to acknowledge when things are tough. What have you learned about \
     yourself through these challenges?",
    "Struggles are part of the growth process. What strengths can you draw on to navigate \
     this?",
];

const FOLLOW_UP_MOMENTUM_RESPONSES: &[&str] = &[
    "Maintaining momentum is so important! What systems are helping you stay consistent?",
    "I love your focus on sustainability. What's working best to keep you motivated?",
    "Your commitment to continuous progress is admirable. How are you celebrating your wins \
     along the way?",
    "Consistency is key to lasting change. What habits are you building to support your \
     growth?",
];

const FOLLOW_UP_GENERAL_RESPONSES: &[&str] = &[
    "It's great to reconnect and hear about your journey. What's been most significant for \
     you since we last talked?",
    "I'm curious to learn about your experience. What insights have emerged as you've been \
     implementing changes?",
    "Thank you for sharing your progress. What feels most important to focus on as you \
     continue growing?",
    "I appreciate you taking time to reflect on your growth. What would be most helpful to \
     explore today?",
    "Your continued commitment to growth is inspiring. What's calling for your attention \
     right now?",
];

const EARLY_DEFAULT_RESPONSES: &[&str] = &[
    "Thank you for sharing that with me. I can sense there's a lot beneath the surface of \
     what you're describing. What feels most important for us to explore together right now?",
    "I appreciate you opening up about this. What's the most important thing you'd like me \
     to understand about your experience?",
    "That gives me a good sense of what you're dealing with. What feels like the biggest \
     challenge in this situation?",
];

const EARLY_DEFAULT_QUESTIONS: &[&str] = &[
    "What would you most like to understand about this situation?",
    "If you could change one thing about how you handle challenging tasks, what would it be?",
];

const LATE_DEFAULT_QUESTIONS: &[&str] = &[
    "What patterns are becoming clearer to you?",
    "What would you like to take away from our conversation today?",
];

// ---------------------------------------------------------------------------

/// Bounded memory of recently emitted responses
#[derive(Debug)]
struct RecentResponses {
    entries: VecDeque<String>,
    bound: usize,
}

impl RecentResponses {
    fn new(bound: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(bound),
            bound,
        }
    }

    fn contains(&self, message: &str) -> bool {
        self.entries.iter().any(|e| e == message)
    }

    fn last(&self) -> Option<&String> {
        self.entries.back()
    }

    fn record(&mut self, message: String) {
        self.entries.push_back(message);
        while self.entries.len() > self.bound {
            self.entries.pop_front();
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Per-session fallback response engine
pub struct FallbackResponder {
    rng: StdRng,
    recent: RecentResponses,
    bank: QuestionBank,
    mention_window: usize,
    questions_per_reply: usize,
}

impl FallbackResponder {
    /// Create a responder seeded from entropy
    pub fn new(params: &EngineParams) -> Self {
        Self::from_rng(params, StdRng::from_entropy())
    }

    /// Create a responder with a fixed seed (tests)
    pub fn with_seed(params: &EngineParams, seed: u64) -> Self {
        Self::from_rng(params, StdRng::seed_from_u64(seed))
    }

    fn from_rng(params: &EngineParams, rng: StdRng) -> Self {
        Self {
            rng,
            recent: RecentResponses::new(params.recent_response_memory),
            bank: QuestionBank::new(),
            mention_window: params.mention_window,
            questions_per_reply: params.questions_per_reply,
        }
    }

    /// Produce a canned reply for the current turn.
    ///
    /// `history` is the full conversation including the current user message
    /// as its last entry; mention counting looks only at the messages before
    /// it. `depth` counts user messages including the current one.
    pub fn respond(
        &mut self,
        context: &UserContext,
        history: &[Message],
        depth: usize,
        stage: CoachingStage,
    ) -> FallbackReply {
        let lower = context.corrected_text.to_lowercase();
        let prior = &history[..history.len().saturating_sub(1)];

        let (pool, primary) = self.build_pool(context, &lower, prior, depth, stage);

        let message = self.pick(&pool);
        let questions = self
            .bank
            .select(&mut self.rng, &primary, &lower, depth, self.questions_per_reply);

        FallbackReply { message, questions }
    }

    /// Resolve the decision table into a candidate pool plus rule-specific
    /// follow-up question candidates.
    fn build_pool(
        &mut self,
        context: &UserContext,
        lower: &str,
        prior: &[Message],
        depth: usize,
        stage: CoachingStage,
    ) -> (Vec<String>, Vec<String>) {
        // Stage pools first: once the session is designing actions or
        // following up, replies stay in that register.
        if stage == CoachingStage::ActionPlanning {
            return (self.action_planning_pool(lower), Vec::new());
        }
        if stage == CoachingStage::FollowUp {
            return (self.follow_up_pool(lower), Vec::new());
        }

        // Content rules in priority order.
        if contains_any(lower, PROCRASTINATION_KEYWORDS) {
            let tier = self.mention_tier(prior, PROCRASTINATION_MENTION_WORDS);
            return (
                to_pool(PROCRASTINATION_TIERS[tier]),
                to_pool(PROCRASTINATION_TIER_QUESTIONS[tier]),
            );
        }

        if contains_any(lower, FEAR_KEYWORDS) {
            let tier = self.mention_tier(prior, FEAR_MENTION_WORDS);
            return (to_pool(FEAR_TIERS[tier]), to_pool(FEAR_TIER_QUESTIONS[tier]));
        }

        if contains_any(lower, PHYSICAL_KEYWORDS) {
            return (to_pool(PHYSICAL_RESPONSES), to_pool(PHYSICAL_QUESTIONS));
        }

        if contains_any(lower, GOAL_KEYWORDS) {
            return if depth >= 4 {
                (to_pool(GOAL_LATE_RESPONSES), to_pool(GOAL_LATE_QUESTIONS))
            } else {
                (to_pool(GOAL_EARLY_RESPONSES), to_pool(GOAL_EARLY_QUESTIONS))
            };
        }

        self.default_pool(context, lower, depth)
    }

    /// How many of the trailing user messages already raised this theme,
    /// capped at the deepest tier.
    fn mention_tier(&self, prior: &[Message], mention_words: &[&str]) -> usize {
        prior
            .iter()
            .rev()
            .take(self.mention_window)
            .filter(|m| m.role == MessageRole::User)
            .filter(|m| {
                let content = m.content.to_lowercase();
                mention_words.iter().any(|w| content.contains(w))
            })
            .count()
            .min(2)
    }

    fn action_planning_pool(&self, lower: &str) -> Vec<String> {
        if contains_any(lower, &["ready", "action plan", "want to", "commit", "yes"]) {
            to_pool(ACTION_READY_RESPONSES)
        } else if contains_any(lower, &["break down", "smaller", "steps", "plan"]) {
            to_pool(ACTION_BREAKDOWN_RESPONSES)
        } else if contains_any(lower, &["fear", "scared", "overcome", "challenge"]) {
            to_pool(ACTION_FEAR_RESPONSES)
        } else if contains_any(lower, &["stretch", "project", "try", "hands on"]) {
            to_pool(ACTION_STRETCH_RESPONSES)
        } else {
            to_pool(ACTION_GENERAL_RESPONSES)
        }
    }

    fn follow_up_pool(&self, lower: &str) -> Vec<String> {
        if contains_any(lower, &["progress", "better", "working", "success"]) {
            to_pool(FOLLOW_UP_PROGRESS_RESPONSES)
        } else if contains_any(lower, &["struggle", "difficult", "challenge", "hard"]) {
            to_pool(FOLLOW_UP_STRUGGLE_RESPONSES)
        } else if contains_any(lower, &["maintain", "continue", "momentum", "keep going"]) {
            to_pool(FOLLOW_UP_MOMENTUM_RESPONSES)
        } else {
            to_pool(FOLLOW_UP_GENERAL_RESPONSES)
        }
    }

    /// Default rule: context-interpolated replies keyed on intent, readiness
    /// and sentiment, with depth-keyed generic pools underneath.
    fn default_pool(
        &self,
        context: &UserContext,
        lower: &str,
        depth: usize,
    ) -> (Vec<String>, Vec<String>) {
        let challenges = join_or(&context.challenges_mentioned, "this pattern");
        let emotions = join_or(&context.primary_emotions, "uncertainty");
        let themes = join_or(&context.key_themes, "what you're experiencing");
        let has_theme = |tag: &str| context.key_themes.iter().any(|t| t == tag);

        let primary = if depth <= 2 {
            to_pool(EARLY_DEFAULT_QUESTIONS)
        } else {
            to_pool(LATE_DEFAULT_QUESTIONS)
        };

        if context.intent == UserIntent::SeekingUnderstanding && has_theme("fear_based_avoidance") {
            let pool = vec![
                format!(
                    "I can hear your genuine desire to understand what's driving this pattern. \
                     You've shared about {challenges} and I sense the {emotions} that comes with \
                     it. Often when we avoid things, our mind is trying to protect us from \
                     something. What do you think your mind might be trying to shield you from?"
                ),
                format!(
                    "You're asking an important question about what sits underneath this \
                     pattern. With {challenges} in the picture and {emotions} alongside it, \
                     avoidance often has a protective job. What might yours be protecting you \
                     from?"
                ),
            ];
            return (pool, primary);
        }

        if context.intent == UserIntent::SharingInformation
            && context.confidence_level == ConfidenceLevel::Low
            && context.challenges_mentioned.iter().any(|c| c == "new_tasks")
        {
            let first_emotion = context.primary_emotion();
            let pool = vec![
                format!(
                    "Thank you for sharing that with me. I can hear how {challenges} trigger \
                     {emotions} for you. It takes courage to acknowledge these feelings. When \
                     you're facing something new and that {first_emotion} kicks in, what \
                     thoughts tend to go through your mind?"
                ),
                format!(
                    "I appreciate you describing this so openly. New and unfamiliar work seems \
                     to stir up {emotions} for you. When that {first_emotion} arrives, what \
                     does it tell you about yourself?"
                ),
            ];
            return (pool, primary);
        }

        if context.readiness_for_action == Readiness::Ready
            && !context.challenges_mentioned.is_empty()
        {
            let pool = vec![
                format!(
                    "I can sense your readiness to work on this. You've identified {challenges} \
                     as areas for growth, and that self-awareness is powerful. Given what \
                     you've shared, what feels like the most important first step you could \
                     take?"
                ),
                format!(
                    "There's real readiness in how you're talking about {challenges}. That \
                     awareness is a strong starting point. What first step would matter most?"
                ),
            ];
            return (pool, primary);
        }

        if depth >= 3 && contains_any(lower, INSIGHT_SHARING_PHRASES) {
            let pool = vec![
                "I can hear the self-reflection and awareness in what you're sharing. You're \
                 making connections between past experiences and current patterns. What \
                 insights are becoming clearer for you through our conversation?"
                    .to_string(),
                "You're doing real reflective work here, connecting what happened before to \
                 what's happening now. What feels like the clearest insight so far?"
                    .to_string(),
            ];
            return (pool, primary);
        }

        if depth <= 2 {
            return (to_pool(EARLY_DEFAULT_RESPONSES), primary);
        }

        if context.sentiment_score < -0.2 {
            let pool = vec![
                format!(
                    "I can hear the difficulty in what you're experiencing. The {themes} \
                     you're describing are real challenges that many people face. What feels \
                     most important for you to understand about this situation right now?"
                ),
                format!(
                    "There's real weight in what you're describing. The {themes} you're naming \
                     deserve attention. What part of this feels heaviest right now?"
                ),
            ];
            return (pool, primary);
        }

        if context.sentiment_score > 0.2 {
            let pool = vec![
                format!(
                    "There's something hopeful in what you're sharing. Even as you describe \
                     {challenges}, I sense your readiness to engage with this. What \
                     possibilities do you see ahead?"
                ),
                format!(
                    "I can hear energy in how you're talking about this. Even with \
                     {challenges} in the picture, you sound ready to engage. What would you \
                     like to build on first?"
                ),
            ];
            return (pool, primary);
        }

        let pool = vec![
            format!(
                "I'm listening carefully to what you're sharing about {themes}. What stands \
                 out most to you as we explore this together?"
            ),
            "I can hear the depth of what you're sharing. What insight or awareness is \
             emerging for you as we talk about this?"
                .to_string(),
            "I'm noticing some patterns in what you've shared. What do you make of what's \
             emerging?"
                .to_string(),
        ];
        (pool, primary)
    }

    /// Select from a pool, honoring the recently-used filter.
    ///
    /// An exhausted pool resets the filter and excludes only the immediately
    /// previous reply, so selection never deadlocks and never repeats
    /// back-to-back while the pool holds an alternative.
    fn pick(&mut self, pool: &[String]) -> String {
        debug_assert!(!pool.is_empty(), "response pools are never empty");

        let available: Vec<&String> = pool.iter().filter(|m| !self.recent.contains(m)).collect();

        let chosen = if available.is_empty() {
            let last = self.recent.last().cloned();
            self.recent.clear();
            let refreshed: Vec<&String> = pool
                .iter()
                .filter(|m| Some(*m) != last.as_ref())
                .collect();
            let refreshed = if refreshed.is_empty() {
                pool.iter().collect::<Vec<_>>()
            } else {
                refreshed
            };
            refreshed[self.rng.gen_range(0..refreshed.len())].clone()
        } else {
            available[self.rng.gen_range(0..available.len())].clone()
        };

        self.recent.record(chosen.clone());
        chosen
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn to_pool(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| (*t).to_string()).collect()
}

fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}
