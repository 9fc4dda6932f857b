//! Fixed keyword tables driving the analyzer
//!
//! All matching is lower-cased substring containment, so short entries
//! deliberately catch inflected forms ("procrastin" covers procrastinate,
//! procrastinating, procrastination).

/// Emotion taxonomy in declaration order; extraction truncates to the
/// first three matches in this order.
pub(crate) const EMOTION_PATTERNS: &[(&str, &[&str])] = &[
    (
        "anxiety",
        &[
            "scared",
            "afraid",
            "anxious",
            "worried",
            "nervous",
            "jittery",
            "fearful",
            "stressed",
            "terrified",
        ],
    ),
    (
        "doubt",
        &[
            "doubt",
            "uncertain",
            "unsure",
            "questioning",
            "hesitant",
            "skeptical",
            "confused",
        ],
    ),
    (
        "frustration",
        &[
            "frustrated",
            "annoyed",
            "irritated",
            "stuck",
            "blocked",
            "angry",
            "upset",
        ],
    ),
    (
        "confidence",
        &[
            "confident",
            "sure",
            "certain",
            "capable",
            "skilled",
            "competent",
            "able",
        ],
    ),
    (
        "motivation",
        &[
            "motivated",
            "driven",
            "determined",
            "committed",
            "ready",
            "eager",
            "excited",
        ],
    ),
];

/// Struggle words that imply the derived `difficulty` emotion
pub(crate) const DIFFICULTY_CLUES: &[&str] =
    &["can't", "unable", "difficult", "hard", "struggle", "challenging"];

/// Obligation phrases that imply the derived `motivation` emotion
pub(crate) const MOTIVATION_CLUES: &[&str] =
    &["want to", "need to", "have to", "should", "ready to"];

/// Challenge tags and their trigger keywords
pub(crate) const CHALLENGE_PATTERNS: &[(&str, &[&str])] = &[
    (
        "procrastination",
        &["procrastin", "delay", "postpone", "avoid", "put off", "stall", "defer"],
    ),
    (
        "confidence_issues",
        &[
            "self-doubt",
            "imposter",
            "not good enough",
            "inadequate",
            "insecure",
            "doubt myself",
        ],
    ),
    (
        "new_tasks",
        &[
            "new task",
            "unfamiliar",
            "unknown",
            "never done",
            "first time",
            "learning",
            "new to",
        ],
    ),
    (
        "overwhelm",
        &["overwhelm", "too much", "overload", "stress", "burden", "pressure", "swamped"],
    ),
    (
        "perfectionism",
        &["perfect", "flawless", "exactly right", "mistake", "failure", "wrong", "error"],
    ),
];

/// Strength tags and their trigger keywords
pub(crate) const STRENGTH_PATTERNS: &[(&str, &[&str])] = &[
    (
        "execution",
        &[
            "execution",
            "deliver",
            "complete",
            "finish",
            "accomplish",
            "achieve",
            "get things done",
        ],
    ),
    (
        "analytical",
        &[
            "analyze",
            "think",
            "logical",
            "systematic",
            "methodical",
            "structured",
            "organized",
        ],
    ),
    (
        "leadership",
        &["lead", "guide", "manage", "influence", "inspire", "motivate", "direct"],
    ),
    (
        "creativity",
        &["creative", "innovative", "imaginative", "original", "artistic", "inventive"],
    ),
    (
        "communication",
        &[
            "communicate",
            "explain",
            "present",
            "articulate",
            "express",
            "speak",
            "write",
        ],
    ),
];

/// Positive self-references that imply the derived `self_awareness` strength
pub(crate) const SELF_AWARENESS_CLUES: &[&str] =
    &["good at", "excel at", "strength", "capable of", "skilled in"];

/// Word lists for the simple sentiment score
pub(crate) const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "confident",
    "capable",
    "ready",
    "excited",
    "motivated",
    "strong",
    "successful",
];

pub(crate) const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "scared",
    "worried",
    "anxious",
    "frustrated",
    "stuck",
    "failed",
    "overwhelmed",
];

/// Intent phrase groups in priority order; first group with a match wins
pub(crate) const UNDERSTANDING_PHRASES: &[&str] =
    &["understand", "why", "reason", "cause", "behind", "what drives", "what makes"];

pub(crate) const SOLUTION_PHRASES: &[&str] =
    &["how", "what can i do", "help me", "solution", "fix", "resolve", "overcome"];

pub(crate) const ACTION_PHRASES: &[&str] =
    &["want to change", "ready to", "commit", "action", "will do", "plan to"];

pub(crate) const SHARING_PHRASES: &[&str] =
    &["explain", "describe", "tell you", "share", "let me tell you"];

pub(crate) const FEELING_PHRASES: &[&str] = &["feel", "think", "believe", "sense", "experience"];

/// Confidence assessment word lists
pub(crate) const HIGH_CONFIDENCE_WORDS: &[&str] =
    &["confident", "sure", "capable", "skilled", "good at", "excel", "strong"];

pub(crate) const LOW_CONFIDENCE_WORDS: &[&str] =
    &["doubt", "unsure", "scared", "anxious", "worried", "uncertain", "insecure"];

/// Readiness assessment word lists
pub(crate) const READY_WORDS: &[&str] =
    &["ready", "want to", "will", "commit", "action", "do", "change", "start", "begin"];

pub(crate) const RESISTANT_WORDS: &[&str] =
    &["but", "however", "difficult", "can't", "unable", "not sure", "maybe"];
