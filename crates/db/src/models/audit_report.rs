//! Audit report rows.
//!
//! Maps to the `audit_reports` table. The full report lives in `body`; the
//! summary columns exist for listing and filtering.

use napwatch_core::report::AuditReport;
use napwatch_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `audit_reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditReportRow {
    pub id: Uuid,
    pub generated_at: Timestamp,
    pub overall_score: i16,
    pub total_platforms: i32,
    pub consistent_platforms: i32,
    pub inconsistent_platforms: i32,
    pub failed_platforms: i32,
    pub critical_issues: i32,
    pub trend_direction: String,
    pub body: serde_json::Value,
    pub created_at: Timestamp,
}

impl AuditReportRow {
    /// Decode the stored report body.
    pub fn into_report(self) -> Result<AuditReport, serde_json::Error> {
        serde_json::from_value(self.body)
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// DTO for inserting a report.
#[derive(Debug)]
pub struct CreateAuditReport {
    pub id: Uuid,
    pub generated_at: Timestamp,
    pub overall_score: i16,
    pub total_platforms: i32,
    pub consistent_platforms: i32,
    pub inconsistent_platforms: i32,
    pub failed_platforms: i32,
    pub critical_issues: i32,
    pub trend_direction: String,
    pub body: serde_json::Value,
}

impl CreateAuditReport {
    pub fn from_report(report: &AuditReport) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: report.id,
            generated_at: report.generated_at,
            overall_score: i16::from(report.overall_score),
            total_platforms: to_i32(report.total_platforms),
            consistent_platforms: to_i32(report.consistent_platforms),
            inconsistent_platforms: to_i32(report.inconsistent_platforms),
            failed_platforms: to_i32(report.failed_platforms),
            critical_issues: to_i32(report.critical_issues),
            trend_direction: report.trend.direction.as_str().to_string(),
            body: serde_json::to_value(report)?,
        })
    }
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
