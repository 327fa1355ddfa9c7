//! Handlers for audit reports, manual audits and platform results.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use napwatch_core::error::CoreError;
use napwatch_core::report::AuditReport;
use napwatch_core::trend::TrendDirection;
use napwatch_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

/// Compact listing entry for one historical report.
#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub id: Uuid,
    pub generated_at: Timestamp,
    pub overall_score: u8,
    pub total_platforms: u32,
    pub consistent_platforms: u32,
    pub failed_platforms: u32,
    pub critical_issues: u32,
    pub direction: TrendDirection,
    pub score_change: i32,
}

impl From<&AuditReport> for ReportSummary {
    fn from(r: &AuditReport) -> Self {
        Self {
            id: r.id,
            generated_at: r.generated_at,
            overall_score: r.overall_score,
            total_platforms: r.total_platforms,
            consistent_platforms: r.consistent_platforms,
            failed_platforms: r.failed_platforms,
            critical_issues: r.critical_issues,
            direction: r.trend.direction,
            score_change: r.trend.score_change,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuditRunResponse {
    /// True when another audit was in flight and no new report was produced.
    pub already_running: bool,
    pub report: Option<Arc<AuditReport>>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn no_report() -> CoreError {
    CoreError::NotFound {
        entity: "audit_report",
        id: "latest".to_string(),
    }
}

/// GET /api/v1/reports/latest
pub async fn latest_report(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let report = state.engine.latest_report().await.ok_or_else(no_report)?;
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/reports?limit=N -- newest first.
pub async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<impl IntoResponse> {
    let history = state.engine.history().await;
    let limit = params.limit.unwrap_or(history.len());
    let summaries: Vec<ReportSummary> = history
        .iter()
        .take(limit)
        .map(|r| ReportSummary::from(r.as_ref()))
        .collect();
    Ok(Json(DataResponse { data: summaries }))
}

/// GET /api/v1/reports/latest/export -- the raw report JSON as a download.
pub async fn export_latest(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let report = state.engine.latest_report().await.ok_or_else(no_report)?;
    let body = state.engine.store().export_json(&report)?;
    let disposition = format!("attachment; filename=\"audit-report-{}.json\"", report.id);
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// POST /api/v1/audits -- run a full audit now.
pub async fn run_audit(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let outcome = state.engine.run_full_audit().await;
    Ok(Json(DataResponse {
        data: AuditRunResponse {
            already_running: outcome.already_running(),
            report: outcome.report().cloned(),
        },
    }))
}

/// GET /api/v1/platforms/{name} -- one platform's result from the latest report.
pub async fn platform_snapshot(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state.engine.platform_snapshot(&name).await?;
    Ok(Json(DataResponse { data: snapshot }))
}
