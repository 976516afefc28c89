use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::{extract_keywords, recommend, Intent, IntentClassifier};

/// Input parameters for Q&A advisory generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QnaParams {
    pub industry: String,
    pub question: String,
    /// `hard` (any case) selects advanced reasoning; anything else is basic
    pub difficulty: String,
}

/// Depth of reasoning applied to a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasoningDepth {
    Basic,
    Advanced,
}

impl ReasoningDepth {
    pub fn from_difficulty(difficulty: &str) -> Self {
        if difficulty.to_lowercase() == "hard" {
            ReasoningDepth::Advanced
        } else {
            ReasoningDepth::Basic
        }
    }
}

/// Q&A advisory report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QnaReport {
    pub analysis: QnaAnalysis,
    pub assistant_response: QnaAdvice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QnaAnalysis {
    pub industry: String,
    pub intent_detected: Intent,
    pub reasoning_depth: ReasoningDepth,
    pub keywords_detected: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QnaAdvice {
    pub summary: String,
    pub core_answer: String,
    /// Advisory sentences joined with single spaces
    pub strategic_advice: String,
    pub confidence_score: u32,
}

/// Composed Q&A advisory engine.
#[derive(Debug, Clone, Copy)]
pub struct QnaEngine {
    intent: IntentClassifier,
}

impl Default for QnaEngine {
    fn default() -> Self {
        Self {
            intent: IntentClassifier::Narrow,
        }
    }
}

impl QnaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer a domain question with intent, depth and advisory text.
    pub fn generate(&self, params: &QnaParams) -> QnaReport {
        let keywords = extract_keywords(&params.question);
        let intent = self.intent.classify(&params.question);
        let depth = ReasoningDepth::from_difficulty(&params.difficulty);
        let advice = recommend(&params.question);

        debug!(
            industry = %params.industry,
            intent = %intent,
            advice_count = advice.len(),
            "Classified question"
        );

        QnaReport {
            analysis: QnaAnalysis {
                industry: params.industry.clone(),
                intent_detected: intent,
                reasoning_depth: depth,
                keywords_detected: keywords,
            },
            assistant_response: QnaAdvice {
                summary: format!("Analysis for {} domain question.", params.industry),
                core_answer: format!(
                    "This question focuses on {} considerations within the {} sector.",
                    intent, params.industry
                ),
                strategic_advice: advice.join(" "),
                confidence_score: match depth {
                    ReasoningDepth::Advanced => 80,
                    ReasoningDepth::Basic => 70,
                },
            },
        }
    }
}
