//! Keyword extraction and complexity scoring for free text.

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::round2;

/// ASCII word tokens of any length.
static WORD_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9_]+").expect("valid word token pattern"));

/// Alphabetic tokens of at least four letters.
static TERM_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-z]{4,}\b").expect("valid term token pattern"));

/// Domain terms that raise the length+bonus complexity score.
pub const ADVANCED_TERMS: [&str; 6] = [
    "integration",
    "compliance",
    "real-time",
    "encryption",
    "scalability",
    "distributed",
];

/// Bonus contributed by each advanced term present in the text.
const ADVANCED_TERM_BONUS: f64 = 1.5;

/// Upper bound for every complexity score.
pub const MAX_COMPLEXITY: f64 = 10.0;

/// Unique lowercase word tokens, sorted.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    WORD_TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lowercase alphabetic terms of length >= 4 in order of appearance.
///
/// Repeated terms are kept; callers that need a set should use
/// [`extract_keywords`] instead.
pub fn extract_terms(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TERM_TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Formula used to turn text into a complexity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityStrategy {
    /// `round(unique / (total + 1) * 10, 2)` over whitespace-separated words.
    Diversity,
    /// `min(10, words / 8 + 1.5 * advanced_terms_present)`.
    LengthBonus,
}

impl ComplexityStrategy {
    /// Score `text` with this strategy. Always within `[0, 10]`.
    pub fn score(self, text: &str) -> f64 {
        match self {
            ComplexityStrategy::Diversity => diversity_complexity(text),
            ComplexityStrategy::LengthBonus => length_bonus_complexity(text),
        }
    }
}

/// Lexical diversity relative to length. Empty text scores 0.
pub fn diversity_complexity(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    let unique: HashSet<&str> = words.iter().copied().collect();
    let ratio = unique.len() as f64 / (words.len() as f64 + 1.0);
    round2((ratio * 10.0).clamp(0.0, MAX_COMPLEXITY))
}

/// Length plus a bonus per distinct advanced term, capped at 10.
pub fn length_bonus_complexity(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let length_score = text.split_whitespace().count() as f64 / 8.0;
    let bonus = ADVANCED_TERMS
        .iter()
        .filter(|term| lowered.contains(*term))
        .count() as f64
        * ADVANCED_TERM_BONUS;
    (length_score + bonus).min(MAX_COMPLEXITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keywords_lowercases_and_dedups() {
        let keywords = extract_keywords("Token token TOKEN refresh_token v2");
        let expected: BTreeSet<String> = ["token", "refresh_token", "v2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(keywords, expected);
    }

    #[test]
    fn test_extract_keywords_splits_on_punctuation() {
        let keywords = extract_keywords("real-time, fraud/audit!");
        assert!(keywords.contains("real"));
        assert!(keywords.contains("time"));
        assert!(keywords.contains("fraud"));
        assert!(keywords.contains("audit"));
        assert_eq!(keywords.len(), 4);
    }

    #[test]
    fn test_extract_keywords_empty() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("  ... !!").is_empty());
    }

    #[test]
    fn test_extract_terms_keeps_order_and_duplicates() {
        let terms = extract_terms("How is data secured? Data at rest, data in transit.");
        assert_eq!(
            terms,
            vec!["data", "secured", "data", "rest", "data", "transit"]
        );
    }

    #[test]
    fn test_extract_terms_skips_short_and_numeric_words() {
        assert!(extract_terms("a an the api v2 42 ok").is_empty());
    }

    #[test]
    fn test_diversity_empty_is_zero() {
        assert_eq!(diversity_complexity(""), 0.0);
        assert_eq!(diversity_complexity("   "), 0.0);
    }

    #[test]
    fn test_diversity_rounds_to_two_decimals() {
        // 3 unique / (3 + 1) * 10 = 7.5
        assert_eq!(diversity_complexity("alpha beta gamma"), 7.5);
        // 2 unique / (4 + 1) * 10 = 4.0
        assert_eq!(diversity_complexity("go go stop stop"), 4.0);
        // 2 unique / (2 + 1) * 10 = 6.666.. -> 6.67
        assert_eq!(diversity_complexity("one two"), 6.67);
    }

    #[test]
    fn test_diversity_tie_rounds_to_even() {
        // 1 unique / (15 + 1) * 10 = 0.625
        assert_eq!(diversity_complexity(&"a ".repeat(15)), 0.62);
    }

    #[test]
    fn test_diversity_is_case_sensitive() {
        // "Data" and "data" count as distinct words
        assert_eq!(diversity_complexity("Data data"), 6.67);
    }

    #[test]
    fn test_length_bonus_counts_each_term_once() {
        let once = length_bonus_complexity("compliance");
        let repeated = length_bonus_complexity("compliance compliance compliance");
        assert_eq!(once, 1.0 / 8.0 + 1.5);
        assert_eq!(repeated, 3.0 / 8.0 + 1.5);
    }

    #[test]
    fn test_length_bonus_substring_and_case_insensitive() {
        // "Integrations" contains "integration"; "REAL-TIME" matches "real-time"
        let score = length_bonus_complexity("Integrations with REAL-TIME feeds");
        assert_eq!(score, 4.0 / 8.0 + 3.0);
    }

    #[test]
    fn test_length_bonus_capped_at_ten() {
        let text = ADVANCED_TERMS.join(" ") + &" word".repeat(40);
        assert_eq!(length_bonus_complexity(&text), 10.0);
    }

    #[test]
    fn test_strategy_bounds_for_varied_inputs() {
        let long = "lorem ipsum dolor sit amet ".repeat(50);
        let inputs: [&str; 5] = [
            "",
            "x",
            "the the the the the the",
            "distributed compliance integration encryption scalability real-time",
            long.as_str(),
        ];
        for input in inputs {
            for strategy in [ComplexityStrategy::Diversity, ComplexityStrategy::LengthBonus] {
                let score = strategy.score(input);
                assert!(
                    (0.0..=MAX_COMPLEXITY).contains(&score),
                    "{:?} scored {} for {:?}",
                    strategy,
                    score,
                    input
                );
            }
        }
    }
}
