//! Risk weighting, context amplification and severity bucketing.
//!
//! Two weight tables and two threshold policies are in use by different
//! callers. They are kept as separate named policies; see [`RiskClassifier`]
//! for the combinations each path uses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Highest risk score any classifier reports.
pub const MAX_RISK: u32 = 10;

/// Weight reported for risk levels outside `low`/`medium`/`high`.
pub const DEFAULT_RISK_WEIGHT: u32 = 5;

/// Three-level severity bucket shared by risk scores, defects and visual diffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Upper-case label (`LOW`, `MEDIUM`, `HIGH`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }

    /// Title-case label (`Low`, `Medium`, `High`).
    pub fn title(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// Lookup from a categorical risk level to a base weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTable {
    /// `low: 3, medium: 5, high: 8`. Used by the session-tracked test-case path.
    Tracked,
    /// `low: 2, medium: 5, high: 8`. Used by the composed test-case engine.
    Composed,
}

impl RiskTable {
    /// Base weight for `level` (case-insensitive). Unknown levels weigh 5.
    pub fn weight(self, level: &str) -> u32 {
        let low = match self {
            RiskTable::Tracked => 3,
            RiskTable::Composed => 2,
        };
        match level.trim().to_lowercase().as_str() {
            "low" => low,
            "medium" => 5,
            "high" => 8,
            _ => DEFAULT_RISK_WEIGHT,
        }
    }
}

/// A text signal that raises the risk score by one when any trigger is present.
#[derive(Debug, Clone, Copy)]
pub struct RiskSignal {
    pub name: &'static str,
    pub triggers: &'static [&'static str],
}

impl RiskSignal {
    /// Whether any trigger occurs in already-lowercased text.
    pub fn matches(&self, lowered: &str) -> bool {
        self.triggers.iter().any(|t| lowered.contains(t))
    }
}

/// Ordered amplification signals. Each contributes +1 independently.
pub const RISK_SIGNALS: [RiskSignal; 3] = [
    RiskSignal {
        name: "fraud",
        triggers: &["fraud"],
    },
    RiskSignal {
        name: "authentication",
        triggers: &["authentication", "token"],
    },
    RiskSignal {
        name: "compliance",
        triggers: &["compliance"],
    },
];

/// Add +1 per matching signal to `base` and cap at [`MAX_RISK`].
///
/// Returns the amplified score and the names of the signals that fired.
pub fn amplify(base: u32, text: &str) -> (u32, Vec<&'static str>) {
    let lowered = text.to_lowercase();
    let fired: Vec<&'static str> = RISK_SIGNALS
        .iter()
        .filter(|signal| signal.matches(&lowered))
        .map(|signal| signal.name)
        .collect();
    let score = (base + fired.len() as u32).min(MAX_RISK);
    (score, fired)
}

/// Score thresholds that map a numeric risk onto a [`Severity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdPolicy {
    /// `> 7` High, `> 4` Medium.
    Exclusive,
    /// `>= 7` High, `>= 5` Medium.
    Inclusive,
}

impl ThresholdPolicy {
    pub fn bucket(self, score: u32) -> Severity {
        let (high, medium) = match self {
            ThresholdPolicy::Exclusive => (score > 7, score > 4),
            ThresholdPolicy::Inclusive => (score >= 7, score >= 5),
        };
        if high {
            Severity::High
        } else if medium {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Outcome of classifying a risk level against a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskAssessment {
    pub base: u32,
    pub score: u32,
    pub severity: Severity,
    pub signals: Vec<&'static str>,
}

/// A weight table, an optional amplification step and a threshold policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskClassifier {
    pub table: RiskTable,
    pub amplify: bool,
    pub thresholds: ThresholdPolicy,
}

impl RiskClassifier {
    /// Composed test-case engine: 2/5/8 table, amplification, exclusive thresholds.
    pub const fn composed() -> Self {
        Self {
            table: RiskTable::Composed,
            amplify: true,
            thresholds: ThresholdPolicy::Exclusive,
        }
    }

    /// Session-tracked test-case path: 3/5/8 table, no amplification,
    /// inclusive thresholds.
    pub const fn tracked() -> Self {
        Self {
            table: RiskTable::Tracked,
            amplify: false,
            thresholds: ThresholdPolicy::Inclusive,
        }
    }

    pub fn assess(&self, risk_level: &str, description: &str) -> RiskAssessment {
        let base = self.table.weight(risk_level);
        let (score, signals) = if self.amplify {
            amplify(base, description)
        } else {
            (base.min(MAX_RISK), Vec::new())
        };

        RiskAssessment {
            base,
            score,
            severity: self.thresholds.bucket(score),
            signals,
        }
    }
}
