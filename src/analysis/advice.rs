//! Keyword-triggered advisory sentences and intent labels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One row of a trigger table: fires when any trigger occurs in lowercased text.
#[derive(Debug, Clone, Copy)]
pub struct Rule<T> {
    pub triggers: &'static [&'static str],
    pub effect: T,
}

impl<T> Rule<T> {
    pub fn matches(&self, lowered: &str) -> bool {
        self.triggers.iter().any(|t| lowered.contains(t))
    }
}

/// Emitted when no advisory rule fires.
pub const FALLBACK_ADVICE: &str =
    "Perform structured risk analysis and cross-functional evaluation.";

/// Advisory rules in evaluation order.
pub const ADVISORY_RULES: [Rule<&str>; 6] = [
    Rule {
        triggers: &["token"],
        effect: "Implement token expiration policies and rotation mechanisms.",
    },
    Rule {
        triggers: &["authentication"],
        effect: "Introduce multi-factor authentication (MFA) for sensitive operations.",
    },
    Rule {
        triggers: &["audit", "logs"],
        effect: "Enable tamper-proof audit logging and real-time monitoring.",
    },
    Rule {
        triggers: &["fraud"],
        effect: "Deploy anomaly detection models for transaction monitoring.",
    },
    Rule {
        triggers: &["encryption"],
        effect: "Ensure end-to-end encryption for sensitive financial data.",
    },
    Rule {
        triggers: &["compliance"],
        effect: "Conduct regular compliance audits aligned with regulatory frameworks.",
    },
];

/// Advisory sentences for `text`, in rule order. Never empty.
pub fn recommend(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    let advice: Vec<&'static str> = ADVISORY_RULES
        .iter()
        .filter(|rule| rule.matches(&lowered))
        .map(|rule| rule.effect)
        .collect();

    if advice.is_empty() {
        vec![FALLBACK_ADVICE]
    } else {
        advice
    }
}

/// Topic a question or description is mainly about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Security,
    Compliance,
    Performance,
    Strategy,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Security => "Security",
            Intent::Compliance => "Compliance",
            Intent::Performance => "Performance",
            Intent::Strategy => "Strategy",
            Intent::General => "General",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four-way intent rules used by the session-tracked QA path.
const BROAD_INTENT_RULES: [Rule<Intent>; 3] = [
    Rule {
        triggers: &["security", "authentication", "token", "fraud"],
        effect: Intent::Security,
    },
    Rule {
        triggers: &["audit", "compliance", "regulation"],
        effect: Intent::Compliance,
    },
    Rule {
        triggers: &["performance", "load", "scale", "latency"],
        effect: Intent::Performance,
    },
];

/// Three-way intent rules used by the composed QnA engine.
const NARROW_INTENT_RULES: [Rule<Intent>; 2] = [
    Rule {
        triggers: &["security"],
        effect: Intent::Security,
    },
    Rule {
        triggers: &["compliance"],
        effect: Intent::Compliance,
    },
];

/// Intent classifier selected per call site. First matching rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentClassifier {
    /// Security / Compliance / Performance, else Strategy.
    Broad,
    /// Security / Compliance, else General.
    Narrow,
}

impl IntentClassifier {
    pub fn classify(self, text: &str) -> Intent {
        let lowered = text.to_lowercase();
        let (rules, fallback): (&[Rule<Intent>], Intent) = match self {
            IntentClassifier::Broad => (&BROAD_INTENT_RULES, Intent::Strategy),
            IntentClassifier::Narrow => (&NARROW_INTENT_RULES, Intent::General),
        };

        rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.effect)
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommend_fallback_only_when_nothing_matches() {
        assert_eq!(recommend("How do we plan the sprint?"), vec![FALLBACK_ADVICE]);
        assert_eq!(recommend(""), vec![FALLBACK_ADVICE]);

        let advice = recommend("token refresh");
        assert!(!advice.contains(&FALLBACK_ADVICE));
    }

    #[test]
    fn test_recommend_each_rule_individually() {
        let cases = [
            ("token", 0),
            ("authentication", 1),
            ("audit", 2),
            ("logs", 2),
            ("fraud", 3),
            ("encryption", 4),
            ("compliance", 5),
        ];
        for (text, rule) in cases {
            assert_eq!(recommend(text), vec![ADVISORY_RULES[rule].effect], "{}", text);
        }
    }

    #[test]
    fn test_recommend_preserves_rule_order() {
        // Input order is the reverse of rule order
        let advice = recommend("Compliance, encryption, fraud, logs, authentication, token");
        let expected: Vec<&str> = ADVISORY_RULES.iter().map(|r| r.effect).collect();
        assert_eq!(advice, expected);
    }

    #[test]
    fn test_recommend_audit_and_logs_fire_once() {
        let advice = recommend("audit logs");
        assert_eq!(advice.len(), 1);
    }

    #[test]
    fn test_broad_intent_first_match_wins() {
        let c = IntentClassifier::Broad;
        assert_eq!(c.classify("token and compliance"), Intent::Security);
        assert_eq!(c.classify("audit under load"), Intent::Compliance);
        assert_eq!(c.classify("Latency targets"), Intent::Performance);
        assert_eq!(c.classify("roadmap"), Intent::Strategy);
    }

    #[test]
    fn test_narrow_intent() {
        let c = IntentClassifier::Narrow;
        assert_eq!(c.classify("Security and compliance"), Intent::Security);
        assert_eq!(c.classify("HIPAA compliance"), Intent::Compliance);
        // Broader triggers do not apply to the narrow classifier
        assert_eq!(c.classify("token fraud latency"), Intent::General);
    }

    #[test]
    fn test_intent_display() {
        assert_eq!(Intent::Performance.to_string(), "Performance");
        assert_eq!(
            serde_json::to_string(&Intent::General).unwrap(),
            "\"General\""
        );
    }
}
