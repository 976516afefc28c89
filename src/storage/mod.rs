//! Storage layer for session history and defect analytics.
//!
//! This module provides SQLite-based storage for per-session scoring
//! history, the append-only defect log and project snapshots, plus the
//! aggregate queries behind the defect dashboard and industry baselines.

mod sqlite;


pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::Severity;
use crate::error::StorageResult;

/// Running history for one session key.
///
/// Missing sessions read back as an empty state; nothing is ever deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Opaque session key supplied by the caller.
    pub id: String,
    /// Risk scores in request order.
    pub risk_history: Vec<f64>,
    /// Complexity scores in request order.
    pub complexity_history: Vec<f64>,
    /// Space-joined text of every QA question asked in the session.
    pub context: String,
    /// Number of QA turns recorded.
    pub conversation_count: i64,
    /// Intent label of the latest QA turn (empty before the first).
    pub last_intent: String,
}

impl SessionState {
    /// Create an empty session state
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Append exactly one risk and one complexity value.
    pub fn record_scores(&mut self, risk: f64, complexity: f64) {
        self.risk_history.push(risk);
        self.complexity_history.push(complexity);
    }

    /// Append a QA turn to the accumulated context.
    pub fn record_question(&mut self, question: &str, intent: &str) {
        self.context.push(' ');
        self.context.push_str(question);
        self.conversation_count += 1;
        self.last_intent = intent.to_string();
    }
}

/// A logged defect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defect {
    /// Unique defect identifier.
    pub id: String,
    pub session_id: String,
    pub industry: String,
    /// Module or screen the defect was found in.
    pub module_name: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

impl Defect {
    /// Create a new defect record stamped with the current time
    pub fn new(
        session_id: impl Into<String>,
        industry: impl Into<String>,
        module_name: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            industry: industry.into(),
            module_name: module_name.into(),
            severity,
            created_at: Utc::now(),
        }
    }
}

/// Point-in-time project metrics used for industry baselines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Unique snapshot identifier.
    pub id: String,
    pub session_id: String,
    pub industry: String,
    pub avg_complexity: f64,
    pub avg_risk: f64,
    pub delay_probability: f64,
    pub created_at: DateTime<Utc>,
}

impl ProjectSnapshot {
    /// Create a new snapshot stamped with the current time
    pub fn new(
        session_id: impl Into<String>,
        industry: impl Into<String>,
        avg_complexity: f64,
        avg_risk: f64,
        delay_probability: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            industry: industry.into(),
            avg_complexity,
            avg_risk,
            delay_probability,
            created_at: Utc::now(),
        }
    }
}

/// Mean complexity and risk across every snapshot of an industry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndustryBaseline {
    pub avg_complexity: f64,
    pub avg_risk: f64,
}

/// Release gate derived from the readiness score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseStatus {
    #[serde(rename = "READY")]
    Ready,
    #[serde(rename = "NOT READY")]
    NotReady,
}

/// Readiness reported when a session has no defects.
pub const DEFECT_FREE_READINESS: i64 = 90;

/// Readiness never drops below this floor.
pub const READINESS_FLOOR: i64 = 50;

/// Scores below this are not ready for release.
pub const READY_THRESHOLD: i64 = 75;

/// `90` with no defects, else `max(50, 100 - 8 * high - 2 * total)`.
pub fn readiness_score(total_defects: i64, high_severity: i64) -> i64 {
    if total_defects == 0 {
        DEFECT_FREE_READINESS
    } else {
        (100 - high_severity * 8 - total_defects * 2).max(READINESS_FLOOR)
    }
}

impl ReleaseStatus {
    pub fn from_score(score: i64) -> Self {
        if score < READY_THRESHOLD {
            ReleaseStatus::NotReady
        } else {
            ReleaseStatus::Ready
        }
    }
}

/// Defect summary for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectDashboard {
    #[serde(rename = "total_bugs_detected")]
    pub total_defects: i64,
    #[serde(rename = "high_severity_bugs")]
    pub high_severity_count: i64,
    /// Module with the most defects; ties go to the alphabetically first name.
    #[serde(rename = "most_affected_module")]
    pub hotspot_module: Option<String>,
    #[serde(rename = "release_readiness_score")]
    pub readiness_score: i64,
    pub release_status: ReleaseStatus,
}

impl DefectDashboard {
    /// Derive readiness and release status from raw counts.
    pub fn from_counts(total_defects: i64, high_severity_count: i64, hotspot_module: Option<String>) -> Self {
        let readiness_score = readiness_score(total_defects, high_severity_count);
        Self {
            total_defects,
            high_severity_count,
            hotspot_module,
            readiness_score,
            release_status: ReleaseStatus::from_score(readiness_score),
        }
    }
}

/// Storage trait for session state and defect analytics.
///
/// `save_session` overwrites the whole record; concurrent read-modify-write
/// cycles on one session can lose an update (last write wins).
#[async_trait]
pub trait Storage: Send + Sync {
    // Session operations

    /// Get a session, or an empty state if it has never been saved.
    async fn get_session(&self, id: &str) -> StorageResult<SessionState>;
    /// Insert or fully replace a session.
    async fn save_session(&self, session: &SessionState) -> StorageResult<()>;

    // Defect operations

    /// Append a defect record.
    async fn insert_defect(&self, defect: &Defect) -> StorageResult<()>;
    /// Get all defects in a session, oldest first.
    async fn get_session_defects(&self, session_id: &str) -> StorageResult<Vec<Defect>>;
    /// Aggregate the defect log for a session.
    async fn defect_dashboard(&self, session_id: &str) -> StorageResult<DefectDashboard>;

    // Project snapshot operations

    /// Append a project snapshot.
    async fn insert_project_snapshot(&self, snapshot: &ProjectSnapshot) -> StorageResult<()>;
    /// Mean complexity and risk for an industry, or `None` without snapshots.
    async fn industry_baseline(&self, industry: &str) -> StorageResult<Option<IndustryBaseline>>;
}
