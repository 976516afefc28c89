use std::str::FromStr;

use axum::extract::{Multipart, Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use super::SharedState;
use crate::advisor::{SessionRequest, TrackedPmReport, TrackedQaReport, TrackedTestCaseReport};
use crate::analysis::Severity;
use crate::documents::{extract_document, ExtractedText};
use crate::engines::{PmParams, PmReport, QnaParams, QnaReport, TestCaseParams, TestCaseReport};
use crate::error::{ApiError, ApiResult, ExtractError};
use crate::storage::{Defect, DefectDashboard, IndustryBaseline, ProjectSnapshot};
use crate::vision::ComparisonContext;

// ============================================================================
// Request/response bodies
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DefectRequest {
    pub session_id: String,
    pub industry: String,
    pub module_name: String,
    /// `LOW`, `MEDIUM` or `HIGH`, any case
    pub severity: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DefectLogged {
    pub status: String,
    pub defect_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotRequest {
    pub session_id: String,
    pub industry: String,
    pub avg_complexity: f64,
    pub avg_risk: f64,
    pub delay_probability: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotRecorded {
    pub status: String,
    pub snapshot_id: String,
}

/// Comparison metadata accepted as query parameters on `/compare-ui`.
///
/// Multipart text fields with the same names take precedence.
#[derive(Debug, Default, Deserialize)]
pub struct CompareUiQuery {
    pub session_id: Option<String>,
    pub industry: Option<String>,
    pub module_name: Option<String>,
}

// ============================================================================
// Health
// ============================================================================

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "QA Advisor running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Session-tracked paths
// ============================================================================

pub async fn generate_testcases_handler(
    State(state): State<SharedState>,
    Json(request): Json<SessionRequest<TestCaseParams>>,
) -> ApiResult<Json<TrackedTestCaseReport>> {
    let report = state.advisor.generate_testcases(&request).await?;
    Ok(Json(report))
}

pub async fn generate_qa_handler(
    State(state): State<SharedState>,
    Json(request): Json<SessionRequest<QnaParams>>,
) -> ApiResult<Json<TrackedQaReport>> {
    let report = state.advisor.generate_qa(&request).await?;
    Ok(Json(report))
}

pub async fn generate_pm_handler(
    State(state): State<SharedState>,
    Json(request): Json<SessionRequest<PmParams>>,
) -> Json<TrackedPmReport> {
    Json(state.advisor.generate_pm(&request))
}

// ============================================================================
// Composed engines
// ============================================================================

pub async fn engine_testcases_handler(
    State(state): State<SharedState>,
    Json(params): Json<TestCaseParams>,
) -> Json<TestCaseReport> {
    Json(state.testcase_engine.generate(&params))
}

pub async fn engine_qa_handler(
    State(state): State<SharedState>,
    Json(params): Json<QnaParams>,
) -> Json<QnaReport> {
    Json(state.qna_engine.generate(&params))
}

pub async fn engine_pm_handler(
    State(state): State<SharedState>,
    Json(params): Json<PmParams>,
) -> Json<PmReport> {
    Json(state.pm_engine.generate(&params))
}

// ============================================================================
// Defect management
// ============================================================================

pub async fn log_defect_handler(
    State(state): State<SharedState>,
    Json(request): Json<DefectRequest>,
) -> ApiResult<Json<DefectLogged>> {
    let severity = Severity::from_str(&request.severity)
        .map_err(|reason| ApiError::validation("severity", reason))?;

    let defect = Defect::new(
        request.session_id,
        request.industry,
        request.module_name,
        severity,
    );
    state.storage.insert_defect(&defect).await?;

    Ok(Json(DefectLogged {
        status: "Defect logged successfully".to_string(),
        defect_id: defect.id,
    }))
}

pub async fn defect_dashboard_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<DefectDashboard>> {
    let dashboard = state.storage.defect_dashboard(&session_id).await?;
    Ok(Json(dashboard))
}

/// Compare a baseline and current screenshot.
///
/// Decode and comparison failures come back as `{"error": message}` with a
/// success status. Only a malformed or incomplete upload is rejected.
pub async fn compare_ui_handler(
    State(state): State<SharedState>,
    Query(query): Query<CompareUiQuery>,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let CompareUiQuery {
        mut session_id,
        mut industry,
        mut module_name,
    } = query;
    let mut baseline = None;
    let mut current = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "baseline" => baseline = Some(field.bytes().await?.to_vec()),
            "current" => current = Some(field.bytes().await?.to_vec()),
            "session_id" => session_id = Some(field.text().await?),
            "industry" => industry = Some(field.text().await?),
            "module_name" => module_name = Some(field.text().await?),
            _ => {}
        }
    }

    let context = ComparisonContext {
        session_id: session_id.ok_or_else(|| ApiError::validation("session_id", "required"))?,
        industry: industry.ok_or_else(|| ApiError::validation("industry", "required"))?,
        module_name: module_name
            .ok_or_else(|| ApiError::validation("module_name", "required"))?,
    };
    let baseline = baseline.ok_or_else(|| ApiError::validation("baseline", "file required"))?;
    let current = current.ok_or_else(|| ApiError::validation("current", "file required"))?;

    match state.detector.detect(&context, baseline, current).await {
        Ok(report) => Ok(Json(report).into_response()),
        Err(e) => {
            warn!(session_id = %context.session_id, error = %e, "Screenshot comparison failed");
            Ok(Json(json!({ "error": e.to_string() })).into_response())
        }
    }
}

// ============================================================================
// Project baselines
// ============================================================================

pub async fn project_snapshot_handler(
    State(state): State<SharedState>,
    Json(request): Json<SnapshotRequest>,
) -> ApiResult<Json<SnapshotRecorded>> {
    let snapshot = ProjectSnapshot::new(
        request.session_id,
        request.industry,
        request.avg_complexity,
        request.avg_risk,
        request.delay_probability,
    );
    state.storage.insert_project_snapshot(&snapshot).await?;

    info!(industry = %snapshot.industry, "Project snapshot recorded");

    Ok(Json(SnapshotRecorded {
        status: "Snapshot recorded".to_string(),
        snapshot_id: snapshot.id,
    }))
}

/// Baseline for an industry, or `null` when it has no snapshots.
pub async fn industry_baseline_handler(
    State(state): State<SharedState>,
    Path(industry): Path<String>,
) -> ApiResult<Json<Option<IndustryBaseline>>> {
    let baseline = state.storage.industry_baseline(&industry).await?;
    Ok(Json(baseline))
}

// ============================================================================
// Documents
// ============================================================================

pub async fn extract_text_handler(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ExtractedText>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        let limit = state.config.limits.context_char_limit;
        let extracted =
            tokio::task::spawn_blocking(move || extract_document(&file_name, &bytes, limit))
                .await
                .map_err(|e| ExtractError::Task {
                    message: e.to_string(),
                })??;
        return Ok(Json(extracted));
    }

    Err(ApiError::validation("file", "file required"))
}
