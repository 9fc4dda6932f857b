//! Fixed coaching topic catalog
//!
//! Four topics, selected at most once per session. Selecting a topic moves
//! the conversation from intake to exploration and returns the topic's fixed
//! intro envelope.

use serde::{Deserialize, Serialize};

/// The four coaching topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicKey {
    PerformanceImprovement,
    CareerDevelopment,
    WorkLifeBalance,
    LeadershipGrowth,
}

impl TopicKey {
    /// Wire name used in API payloads and persisted rows
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicKey::PerformanceImprovement => "performance_improvement",
            TopicKey::CareerDevelopment => "career_development",
            TopicKey::WorkLifeBalance => "work_life_balance",
            TopicKey::LeadershipGrowth => "leadership_growth",
        }
    }

    /// Parse a wire name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "performance_improvement" => Some(TopicKey::PerformanceImprovement),
            "career_development" => Some(TopicKey::CareerDevelopment),
            "work_life_balance" => Some(TopicKey::WorkLifeBalance),
            "leadership_growth" => Some(TopicKey::LeadershipGrowth),
            _ => None,
        }
    }

    /// All topic keys, in catalog order
    pub fn all() -> &'static [TopicKey] {
        &[
            TopicKey::PerformanceImprovement,
            TopicKey::CareerDevelopment,
            TopicKey::WorkLifeBalance,
            TopicKey::LeadershipGrowth,
        ]
    }

    /// Detect a topic from free text during intake.
    ///
    /// First keyword hit in catalog order wins.
    pub fn detect(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        TopicKey::all()
            .iter()
            .find(|key| key.topic().keywords.iter().any(|k| lower.contains(k)))
            .copied()
    }

    /// Static topic definition
    pub fn topic(&self) -> &'static Topic {
        match self {
            TopicKey::PerformanceImprovement => &PERFORMANCE_IMPROVEMENT,
            TopicKey::CareerDevelopment => &CAREER_DEVELOPMENT,
            TopicKey::WorkLifeBalance => &WORK_LIFE_BALANCE,
            TopicKey::LeadershipGrowth => &LEADERSHIP_GROWTH,
        }
    }
}

impl std::fmt::Display for TopicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A coaching topic definition
#[derive(Debug)]
pub struct Topic {
    /// Display name
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Fixed intro message sent when the topic is selected
    pub intro_message: &'static str,
    /// Opening questions; the intro envelope carries the first two
    pub initial_questions: &'static [&'static str],
    /// Exploration area tags, descriptive only
    pub exploration_areas: &'static [&'static str],
    /// Keywords for free-text topic detection during intake
    pub keywords: &'static [&'static str],
}

impl Topic {
    /// The two questions attached to the topic intro envelope
    pub fn intro_questions(&self) -> Vec<String> {
        self.initial_questions
            .iter()
            .take(2)
            .map(|q| (*q).to_string())
            .collect()
    }
}

static PERFORMANCE_IMPROVEMENT: Topic = Topic {
    name: "Performance Improvement",
    description: "Enhancing work performance and productivity",
    intro_message:
        "Great! Let's explore Performance Improvement together. I understand you want to \
         enhance your work performance and productivity. What specific aspects of your \
         performance feel most important to address right now?",
    initial_questions: &[
        "What specific aspect of your performance would you like to improve?",
        "What's currently working well in your performance?",
        "What challenges are you facing that impact your performance?",
    ],
    exploration_areas: &["skills", "motivation", "resources", "feedback", "goals"],
    keywords: &["performance", "productiv", "effectiveness"],
};

static CAREER_DEVELOPMENT: Topic = Topic {
    name: "Career Development",
    description: "Planning and advancing career growth",
    intro_message:
        "Excellent! Career Development is such an important area. I'm excited to explore \
         your career aspirations and help you identify the next steps.",
    initial_questions: &[
        "Where do you see yourself in your career journey?",
        "What career aspirations are most important to you?",
        "What's holding you back from your next career step?",
    ],
    exploration_areas: &[
        "aspirations",
        "skills_gap",
        "networking",
        "opportunities",
        "barriers",
    ],
    keywords: &["career", "promotion", "job change"],
};

static WORK_LIFE_BALANCE: Topic = Topic {
    name: "Work-Life Balance",
    description: "Achieving harmony between professional and personal life",
    intro_message:
        "Thank you for choosing Work-Life Balance. Finding harmony between different \
         aspects of life is crucial for well-being.",
    initial_questions: &[
        "How would you describe your current work-life balance?",
        "What areas of your life feel out of balance?",
        "What would ideal balance look like for you?",
    ],
    exploration_areas: &[
        "boundaries",
        "priorities",
        "time_management",
        "energy",
        "values",
    ],
    keywords: &["balance", "work-life", "work life", "burnout"],
};

static LEADERSHIP_GROWTH: Topic = Topic {
    name: "Leadership Growth",
    description: "Developing leadership skills and effectiveness",
    intro_message:
        "Wonderful! Leadership Growth is a powerful area for development. I'm here to \
         support you in discovering your authentic leadership style.",
    initial_questions: &[
        "What kind of leader do you want to be?",
        "What leadership challenges are you currently facing?",
        "How do you currently influence and inspire others?",
    ],
    exploration_areas: &[
        "leadership_style",
        "influence",
        "team_dynamics",
        "decision_making",
        "vision",
    ],
    keywords: &["leader", "leadership", "my team"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for key in TopicKey::all() {
            assert_eq!(TopicKey::parse(key.as_str()), Some(*key));
        }
        assert_eq!(TopicKey::parse("astrology"), None);
    }

    #[test]
    fn test_intro_questions_are_first_two() {
        let topic = TopicKey::PerformanceImprovement.topic();
        let questions = topic.intro_questions();
        assert_eq!(
            questions,
            vec![
                "What specific aspect of your performance would you like to improve?",
                "What's currently working well in your performance?",
            ]
        );
    }

    #[test]
    fn test_detection_from_free_text() {
        assert_eq!(
            TopicKey::detect("I want to improve my performance at work"),
            Some(TopicKey::PerformanceImprovement)
        );
        assert_eq!(
            TopicKey::detect("thinking about my career lately"),
            Some(TopicKey::CareerDevelopment)
        );
        assert_eq!(
            TopicKey::detect("struggling with work life balance"),
            Some(TopicKey::WorkLifeBalance)
        );
        assert_eq!(TopicKey::detect("good morning"), None);
    }

    #[test]
    fn test_catalog_is_complete() {
        assert_eq!(TopicKey::all().len(), 4);
        for key in TopicKey::all() {
            let topic = key.topic();
            assert_eq!(topic.initial_questions.len(), 3);
            assert!(!topic.exploration_areas.is_empty());
            assert!(!topic.intro_message.is_empty());
        }
    }
}
