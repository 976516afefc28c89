use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::advice::Rule;
use crate::analysis::{extract_keywords, round2, ComplexityStrategy, RiskClassifier, Severity};

/// Input parameters for test strategy generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseParams {
    pub industry: String,
    /// Name of the feature under test
    pub feature: String,
    pub description: String,
    /// Categorical risk level (`low`, `medium`, `high`); anything else weighs 5
    pub risk_level: String,
}

/// Test strategy report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseReport {
    pub analysis: TestCaseAnalysis,
    pub assistant_response: TestCaseAdvice,
}

/// Numeric findings for a feature description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseAnalysis {
    pub industry: String,
    pub complexity_score: f64,
    pub risk_score: u32,
    /// Title-case bucket (`Low`, `Medium`, `High`)
    pub risk_category: String,
    pub estimated_test_coverage_percent: i64,
    /// Not clamped; may drop below zero for out-of-range complexity
    pub automation_feasibility_percent: i64,
    pub keywords_detected: BTreeSet<String>,
    pub test_plan: TestPlan,
}

/// Suggested test cases grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestPlan {
    pub functional_tests: Vec<String>,
    pub edge_cases: Vec<String>,
    pub negative_cases: Vec<String>,
}

/// Narrative part of the test strategy report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseAdvice {
    pub summary: String,
    pub reasoning: String,
    pub risks_identified: Vec<String>,
    pub recommendations: Vec<String>,
    pub confidence_score: u32,
}

const FUNCTIONAL_RULES: [Rule<&str>; 3] = [
    Rule {
        triggers: &["fraud"],
        effect: "Validate fraud detection logic under abnormal transactions.",
    },
    Rule {
        triggers: &["authentication", "token"],
        effect: "Verify token validation and expiration handling.",
    },
    Rule {
        triggers: &["audit", "logs"],
        effect: "Validate audit logging integrity and tamper resistance.",
    },
];

const RISK_RULES: [Rule<&str>; 3] = [
    Rule {
        triggers: &["fraud"],
        effect: "Fraud exploitation risk detected.",
    },
    Rule {
        triggers: &["audit"],
        effect: "Audit logging integrity risk.",
    },
    Rule {
        triggers: &["authentication"],
        effect: "Authentication bypass vulnerability risk.",
    },
];

const GENERAL_RISK: &str = "General operational risk.";

const EDGE_CASES: [&str; 2] = ["Test boundary conditions.", "Simulate peak load handling."];

const NEGATIVE_CASES: [&str; 2] = [
    "Test unauthorized access attempts.",
    "Simulate data manipulation attacks.",
];

const STRATEGY_RECOMMENDATIONS: [&str; 3] = [
    "Increase negative test scenarios.",
    "Perform structured regression validation.",
    "Integrate automated security testing early.",
];

/// Edge cases are suggested above this complexity.
const EDGE_CASE_COMPLEXITY: f64 = 6.0;

/// Negative cases are suggested above this risk score.
const NEGATIVE_CASE_RISK: u32 = 6;

/// Composed test strategy engine.
#[derive(Debug, Clone, Copy)]
pub struct TestCaseEngine {
    complexity: ComplexityStrategy,
    risk: RiskClassifier,
}

impl Default for TestCaseEngine {
    fn default() -> Self {
        Self {
            complexity: ComplexityStrategy::LengthBonus,
            risk: RiskClassifier::composed(),
        }
    }
}

impl TestCaseEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a test strategy for a feature description.
    pub fn generate(&self, params: &TestCaseParams) -> TestCaseReport {
        let text = params.description.to_lowercase();
        let keywords = extract_keywords(&params.description);
        let complexity = self.complexity.score(&params.description);
        let risk = self.risk.assess(&params.risk_level, &params.description);

        debug!(
            feature = %params.feature,
            complexity,
            risk_score = risk.score,
            severity = %risk.severity,
            "Scored feature description"
        );

        let mut functional_tests = vec![
            format!("Validate {} executes successfully.", params.feature),
            "Verify role-based access control.".to_string(),
        ];
        functional_tests.extend(
            FUNCTIONAL_RULES
                .iter()
                .filter(|rule| rule.matches(&text))
                .map(|rule| rule.effect.to_string()),
        );

        let edge_cases = if complexity > EDGE_CASE_COMPLEXITY {
            EDGE_CASES.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };

        let negative_cases = if risk.score > NEGATIVE_CASE_RISK {
            NEGATIVE_CASES.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };

        let mut risks_identified: Vec<String> = RISK_RULES
            .iter()
            .filter(|rule| rule.matches(&text))
            .map(|rule| rule.effect.to_string())
            .collect();
        if risks_identified.is_empty() {
            risks_identified.push(GENERAL_RISK.to_string());
        }

        let category = risk.severity.title();

        TestCaseReport {
            analysis: TestCaseAnalysis {
                industry: params.industry.clone(),
                complexity_score: round2(complexity),
                risk_score: risk.score,
                risk_category: category.to_string(),
                estimated_test_coverage_percent: (60.0 + complexity * 5.0) as i64,
                automation_feasibility_percent: (80.0 - complexity * 3.0) as i64,
                keywords_detected: keywords,
                test_plan: TestPlan {
                    functional_tests,
                    edge_cases,
                    negative_cases,
                },
            },
            assistant_response: TestCaseAdvice {
                summary: format!(
                    "Test strategy generated for {} in {}.",
                    params.feature, params.industry
                ),
                reasoning: format!("Operational risk level is {}.", category),
                risks_identified,
                recommendations: STRATEGY_RECOMMENDATIONS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                confidence_score: if risk.severity == Severity::High { 85 } else { 75 },
            },
        }
    }
}
