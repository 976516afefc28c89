//! Deterministic text analysis shared by every scoring path.
//!
//! This module provides:
//! - Keyword extraction and two complexity strategies ([`lexical`])
//! - Risk weight tables, amplification and severity thresholds ([`risk`])
//! - Advisory rule table and intent classifiers ([`advice`])

pub mod advice;
pub mod lexical;
pub mod risk;

pub use advice::{recommend, Intent, IntentClassifier, FALLBACK_ADVICE};
pub use lexical::{extract_keywords, extract_terms, ComplexityStrategy};
pub use risk::{RiskAssessment, RiskClassifier, RiskTable, Severity, ThresholdPolicy};

/// Round to two decimal places. Exact binary halves go to the even neighbour.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
