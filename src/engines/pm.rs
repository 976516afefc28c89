use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::advice::Rule;
use crate::analysis::{round2, ComplexityStrategy};

/// Input parameters for project feasibility analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmParams {
    pub industry: String,
    pub description: String,
    pub timeline_weeks: i64,
    pub team_size: i64,
}

/// Delivery probability never drops below this floor.
pub const DELIVERY_FLOOR: f64 = 50.0;

/// Flat workload bumps applied by the timeline-aware strategy.
const PRESSURE_BUMPS: [Rule<f64>; 3] = [
    Rule {
        triggers: &["fraud"],
        effect: 2.0,
    },
    Rule {
        triggers: &["compliance"],
        effect: 2.0,
    },
    Rule {
        triggers: &["encryption"],
        effect: 1.0,
    },
];

/// Formula used to estimate delivery probability.
///
/// Both are live: the composed engine is timeline-aware while the
/// session-tracked path only considers team size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PmStrategy {
    /// `complexity * weeks / max(team, 1)` plus keyword bumps,
    /// delivery `max(50, 95 - pressure)`. Length+bonus complexity.
    TimelineAware,
    /// `complexity * team`, delivery `max(50, 100 - index)`.
    /// Diversity complexity, no timeline factor, no bumps.
    TeamSizeOnly,
}

/// Unrounded output of a [`PmStrategy`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryForecast {
    pub complexity: f64,
    pub workload: f64,
    pub delivery_probability: f64,
}

impl PmStrategy {
    pub fn forecast(self, description: &str, timeline_weeks: i64, team_size: i64) -> DeliveryForecast {
        match self {
            PmStrategy::TimelineAware => {
                let complexity = ComplexityStrategy::LengthBonus.score(description);
                let lowered = description.to_lowercase();
                let bumps: f64 = PRESSURE_BUMPS
                    .iter()
                    .filter(|rule| rule.matches(&lowered))
                    .map(|rule| rule.effect)
                    .sum();
                let workload = complexity * timeline_weeks as f64 / team_size.max(1) as f64 + bumps;
                DeliveryForecast {
                    complexity,
                    workload,
                    delivery_probability: (95.0 - workload).max(DELIVERY_FLOOR),
                }
            }
            PmStrategy::TeamSizeOnly => {
                let complexity = ComplexityStrategy::Diversity.score(description);
                let workload = complexity * team_size as f64;
                DeliveryForecast {
                    complexity,
                    workload,
                    delivery_probability: (100.0 - workload).max(DELIVERY_FLOOR),
                }
            }
        }
    }
}

/// Project feasibility report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmReport {
    pub analysis: PmAnalysis,
    pub assistant_response: PmAdvice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmAnalysis {
    pub industry: String,
    pub complexity_score: f64,
    pub workload_pressure_index: f64,
    pub delivery_probability_percent: f64,
    pub recommended_sprints: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmAdvice {
    pub summary: String,
    /// Present only when delivery probability is below 70%
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_warning: Option<String>,
    pub recommendation: String,
    pub confidence_score: u32,
}

const RISK_WARNING_BELOW: f64 = 70.0;
const HIGH_CONFIDENCE_ABOVE: f64 = 75.0;

/// Composed project feasibility engine (timeline-aware strategy).
#[derive(Debug, Clone, Copy, Default)]
pub struct PmEngine;

impl PmEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, params: &PmParams) -> PmReport {
        let forecast = PmStrategy::TimelineAware.forecast(
            &params.description,
            params.timeline_weeks,
            params.team_size,
        );
        let recommended_sprints = (params.timeline_weeks / 2).max(2);

        debug!(
            industry = %params.industry,
            workload = forecast.workload,
            delivery = forecast.delivery_probability,
            "Forecast project delivery"
        );

        let risk_warning = (forecast.delivery_probability < RISK_WARNING_BELOW).then(|| {
            "High delivery risk due to workload and compliance pressure.".to_string()
        });

        PmReport {
            analysis: PmAnalysis {
                industry: params.industry.clone(),
                complexity_score: round2(forecast.complexity),
                workload_pressure_index: round2(forecast.workload),
                delivery_probability_percent: round2(forecast.delivery_probability),
                recommended_sprints,
            },
            assistant_response: PmAdvice {
                summary: format!("Project feasibility analysis for {}.", params.industry),
                risk_warning,
                recommendation:
                    "Adopt agile execution with milestone checkpoints and early QA integration."
                        .to_string(),
                confidence_score: if forecast.delivery_probability > HIGH_CONFIDENCE_ABOVE {
                    85
                } else {
                    70
                },
            },
        }
    }
}
