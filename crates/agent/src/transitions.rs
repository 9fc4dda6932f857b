//! Stage transition rules
//!
//! Evaluated after each reply is generated. A transition fires when the
//! user's language signals progress (insight, readiness, commitment) or when
//! the conversation depth crosses the configured threshold for the current
//! stage, whichever comes first.

use coaching_agent_config::EngineParams;
use coaching_agent_core::CoachingStage;

/// Self-insight language that moves Exploration -> Reflection
const INSIGHT_INDICATORS: &[&str] = &[
    "i notice",
    "i realize",
    "i see that",
    "i understand",
    "it's because",
    "the pattern",
    "what drives this",
    "i think it's",
    "maybe it's",
    "i'm starting to see",
    "now i understand",
    "it seems like",
];

/// Readiness language that moves Reflection -> ActionPlanning
const ACTION_INDICATORS: &[&str] = &[
    "i want to",
    "i need to",
    "i should",
    "what should i do",
    "how do i",
    "what's the next step",
    "i'm ready",
    "i want to change",
    "help me",
    "what can i do",
    "i'd like to try",
    "how can i",
    "let's do it",
    "ready for action",
    "action plan",
    "move forward",
    "take action",
];

/// Commitment language that moves ActionPlanning -> FollowUp
const COMMITMENT_INDICATORS: &[&str] = &[
    "i will",
    "i'll try",
    "i commit",
    "i'm going to",
    "my goal is",
    "i'll start",
    "i'll work on",
    "i'll practice",
    "i'll focus on",
    "as a first step",
    "my plan is",
    "i'll implement",
    "i'll begin",
    "starting this week",
    "i plan to",
    "i intend to",
];

/// Decide whether the session should advance after this turn.
///
/// `user_text` is the current message lower-cased; `depth` counts user
/// messages including it.
pub fn decide_next_stage(
    current: CoachingStage,
    user_text: &str,
    depth: usize,
    params: &EngineParams,
) -> Option<CoachingStage> {
    let matches = |indicators: &[&str]| indicators.iter().any(|i| user_text.contains(i));

    match current {
        // Intake advances through topic selection, handled by the engine
        CoachingStage::Intake => None,
        CoachingStage::Exploration => {
            (matches(INSIGHT_INDICATORS) || depth >= params.reflection_depth)
                .then_some(CoachingStage::Reflection)
        }
        CoachingStage::Reflection => {
            (matches(ACTION_INDICATORS) || depth >= params.action_planning_depth)
                .then_some(CoachingStage::ActionPlanning)
        }
        CoachingStage::ActionPlanning => {
            (matches(COMMITMENT_INDICATORS) || depth >= params.follow_up_depth)
                .then_some(CoachingStage::FollowUp)
        }
        // FollowUp recurs
        CoachingStage::FollowUp => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EngineParams {
        EngineParams::default()
    }

    #[test]
    fn test_insight_language_triggers_reflection() {
        let next = decide_next_stage(
            CoachingStage::Exploration,
            "i notice this happens when deadlines stack up",
            2,
            &params(),
        );
        assert_eq!(next, Some(CoachingStage::Reflection));
    }

    #[test]
    fn test_depth_thresholds_trigger_without_content() {
        let p = params();
        assert_eq!(
            decide_next_stage(CoachingStage::Exploration, "okay", 5, &p),
            Some(CoachingStage::Reflection)
        );
        assert_eq!(
            decide_next_stage(CoachingStage::Reflection, "okay", 7, &p),
            Some(CoachingStage::ActionPlanning)
        );
        assert_eq!(
            decide_next_stage(CoachingStage::ActionPlanning, "okay", 9, &p),
            Some(CoachingStage::FollowUp)
        );
    }

    #[test]
    fn test_generic_messages_below_threshold_stay_put() {
        let p = params();
        assert_eq!(
            decide_next_stage(CoachingStage::Exploration, "okay", 4, &p),
            None
        );
        assert_eq!(
            decide_next_stage(CoachingStage::Reflection, "hmm", 6, &p),
            None
        );
    }

    #[test]
    fn test_commitment_language_triggers_follow_up() {
        let next = decide_next_stage(
            CoachingStage::ActionPlanning,
            "i'll start with one small task tomorrow",
            3,
            &params(),
        );
        assert_eq!(next, Some(CoachingStage::FollowUp));
    }

    #[test]
    fn test_follow_up_recurs() {
        assert_eq!(
            decide_next_stage(CoachingStage::FollowUp, "i will keep going", 20, &params()),
            None
        );
    }

    #[test]
    fn test_custom_thresholds_are_respected() {
        let mut p = params();
        p.reflection_depth = 2;
        assert_eq!(
            decide_next_stage(CoachingStage::Exploration, "okay", 2, &p),
            Some(CoachingStage::Reflection)
        );
    }
}
