//! Spelling correction for common coaching-vocabulary misspellings
//!
//! Whole-word, case-insensitive replacement against a fixed dictionary.
//! Corrected words are never themselves dictionary keys, which makes the
//! operation idempotent.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Known misspelling -> correction pairs
const CORRECTIONS: &[(&str, &str)] = &[
    ("procastination", "procrastination"),
    ("procastinate", "procrastinate"),
    ("procastinating", "procrastinating"),
    ("sucessfully", "successfully"),
    ("sucessful", "successful"),
    ("chalenge", "challenge"),
    ("chalenges", "challenges"),
    ("bigest", "biggest"),
    ("strenghts", "strengths"),
    ("strenght", "strength"),
    ("confidance", "confidence"),
    ("overwheled", "overwhelmed"),
    ("perfomance", "performance"),
    ("experiance", "experience"),
    ("responsability", "responsibility"),
];

static CORRECTION_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| CORRECTIONS.iter().copied().collect());

/// One alternation over every misspelling, longest first so inflected forms
/// win over their stems.
static MISSPELLING_RE: Lazy<Regex> = Lazy::new(|| {
    let mut words: Vec<&str> = CORRECTIONS.iter().map(|(wrong, _)| *wrong).collect();
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));
    let pattern = format!(r"(?i)\b(?:{})\b", words.join("|"));
    Regex::new(&pattern).expect("misspelling alternation must compile")
});

/// Replace known misspellings with their corrections
pub fn correct_spelling(text: &str) -> String {
    MISSPELLING_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let matched = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            CORRECTION_MAP
                .get(matched.to_lowercase().as_str())
                .copied()
                .unwrap_or(matched)
                .to_string()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrects_known_misspellings() {
        assert_eq!(
            correct_spelling("my bigest chalenge is procastination"),
            "my biggest challenge is procrastination"
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(correct_spelling("Procastination"), "procrastination");
        assert_eq!(correct_spelling("CONFIDANCE"), "confidence");
    }

    #[test]
    fn test_whole_words_only() {
        // No substring replacement inside longer words
        assert_eq!(correct_spelling("bigestness"), "bigestness");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "procastination and strenghts and perfomance",
            "already correct text about procrastination",
            "",
            "chalenges chalenge sucessful sucessfully",
        ];
        for input in inputs {
            let once = correct_spelling(input);
            let twice = correct_spelling(&once);
            assert_eq!(once, twice, "correction must be idempotent for {input:?}");
        }
    }

    #[test]
    fn test_longest_form_wins() {
        // "procastinating" must not be corrected as stem + suffix
        assert_eq!(correct_spelling("procastinating"), "procrastinating");
    }
}
