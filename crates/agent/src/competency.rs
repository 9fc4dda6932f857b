//! ICF competency framework
//!
//! Six fixed coaching technique labels. Each response envelope carries the
//! competency that produced it, for display and analytics only; the labels
//! never feed back into control flow.

use coaching_agent_core::CoachingStage;

/// ICF coaching competency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Competency {
    EstablishingTrust,
    ActiveListening,
    PowerfulQuestioning,
    CreatingAwareness,
    DesigningActions,
    ManagingProgress,
}

/// Static profile attached to a competency
#[derive(Debug, Clone, Copy)]
pub struct CompetencyProfile {
    /// Template sentence usable inside a coach reply
    pub response_template: &'static str,
    /// Canonical follow-up questions for this competency
    pub follow_up_questions: &'static [&'static str],
    /// Indicator tags, descriptive only
    pub indicators: &'static [&'static str],
    /// Guidance injected into the model system prompt
    pub guidance: &'static str,
}

impl Competency {
    /// Wire name used in response envelopes
    pub fn as_str(&self) -> &'static str {
        match self {
            Competency::EstablishingTrust => "establishing_trust_and_intimacy",
            Competency::ActiveListening => "active_listening",
            Competency::PowerfulQuestioning => "powerful_questioning",
            Competency::CreatingAwareness => "creating_awareness",
            Competency::DesigningActions => "designing_actions",
            Competency::ManagingProgress => "managing_progress_and_accountability",
        }
    }

    /// Competency applied at a given stage and conversation depth.
    ///
    /// Early exploration listens; deeper exploration questions.
    pub fn for_stage(stage: CoachingStage, depth: usize) -> Competency {
        match stage {
            CoachingStage::Intake => Competency::EstablishingTrust,
            CoachingStage::Exploration => {
                if depth <= 2 {
                    Competency::ActiveListening
                } else {
                    Competency::PowerfulQuestioning
                }
            }
            CoachingStage::Reflection => Competency::CreatingAwareness,
            CoachingStage::ActionPlanning => Competency::DesigningActions,
            CoachingStage::FollowUp => Competency::ManagingProgress,
        }
    }

    /// Static profile for this competency
    pub fn profile(&self) -> CompetencyProfile {
        match self {
            Competency::EstablishingTrust => CompetencyProfile {
                response_template:
                    "I appreciate you sharing this with me. This feels like a safe space where \
                     we can explore this together.",
                follow_up_questions: &[
                    "What feels most important to you about this situation?",
                    "How comfortable do you feel discussing this openly?",
                    "What would make this conversation most valuable for you?",
                ],
                indicators: &["trust", "safety", "openness", "vulnerability"],
                guidance:
                    "Create a safe, supportive, and confidential coaching environment. Show \
                     genuine care and concern.",
            },
            Competency::ActiveListening => CompetencyProfile {
                response_template: "What I'm hearing is... Is that accurate?",
                follow_up_questions: &[
                    "Can you tell me more about that?",
                    "What else is important here?",
                    "Help me understand what you mean by...",
                ],
                indicators: &[
                    "clarification",
                    "paraphrasing",
                    "reflection",
                    "deeper_understanding",
                ],
                guidance:
                    "Focus completely on what the client is saying. Listen for meaning, \
                     emotion, and what's not being said.",
            },
            Competency::PowerfulQuestioning => CompetencyProfile {
                response_template: "I'm curious about...",
                follow_up_questions: &[
                    "What would happen if...?",
                    "How does this connect to your broader goals?",
                    "What assumptions might you be making here?",
                    "What would success look like?",
                    "What's the real challenge behind this challenge?",
                ],
                indicators: &[
                    "curiosity",
                    "assumptions",
                    "possibilities",
                    "different_perspectives",
                ],
                guidance:
                    "Ask questions that reveal underlying assumptions, create greater \
                     clarity, and move the client forward.",
            },
            Competency::CreatingAwareness => CompetencyProfile {
                response_template: "I notice... What do you make of that?",
                follow_up_questions: &[
                    "What patterns do you see here?",
                    "What's working well that you might build on?",
                    "What blind spots might exist?",
                    "How does this align with your values?",
                ],
                indicators: &["patterns", "insights", "blind_spots", "values_alignment"],
                guidance:
                    "Help the client identify patterns, gain insights, and see new \
                     perspectives.",
            },
            Competency::DesigningActions => CompetencyProfile {
                response_template:
                    "Based on what we've explored, what feels like the right next step?",
                follow_up_questions: &[
                    "What specific action will you take?",
                    "By when will you do this?",
                    "What support do you need?",
                    "How will you know you've succeeded?",
                    "What might get in the way?",
                ],
                indicators: &["specific_actions", "timeline", "commitment", "obstacles"],
                guidance:
                    "Partner with the client to create specific, measurable actions that \
                     move them toward their goals.",
            },
            Competency::ManagingProgress => CompetencyProfile {
                response_template: "Let's check in on your progress since our last conversation.",
                follow_up_questions: &[
                    "What progress have you made?",
                    "What worked well?",
                    "What challenges did you encounter?",
                    "What adjustments do we need to make?",
                    "What have you learned about yourself?",
                ],
                indicators: &["progress_review", "adjustments", "learning", "accountability"],
                guidance: "Hold the client accountable and celebrate their progress.",
            },
        }
    }

    /// Stage-specific coaching focus for the model system prompt
    pub fn stage_guidance(stage: CoachingStage) -> &'static str {
        match stage {
            CoachingStage::Intake => {
                "Focus on understanding what the client wants to work on. Create safety and \
                 establish the coaching relationship."
            }
            CoachingStage::Exploration => {
                "Help the client explore the situation deeply. Listen for patterns, emotions, \
                 and underlying beliefs."
            }
            CoachingStage::Reflection => {
                "Help the client gain insights and awareness. Point out patterns and help them \
                 see new perspectives."
            }
            CoachingStage::ActionPlanning => {
                "Partner with the client to create specific, actionable steps. Focus on \
                 commitment and accountability."
            }
            CoachingStage::FollowUp => {
                "Review progress, celebrate successes, and adjust plans as needed."
            }
        }
    }
}
