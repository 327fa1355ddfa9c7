//! Threshold alerts raised after an audit or during an alert sweep.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::audit_config::AlertThresholds;
use crate::report::AuditReport;
use crate::types::Timestamp;

/// Which threshold was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// The overall score fell by at least the configured amount.
    ScoreDrop,
    /// The report holds at least the configured number of critical issues.
    CriticalIssues,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScoreDrop => "score_drop",
            Self::CriticalIssues => "critical_issues",
        }
    }
}

/// A single alert handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub payload: serde_json::Value,
    pub timestamp: Timestamp,
}

impl AlertEvent {
    pub fn new(kind: AlertKind, payload: serde_json::Value) -> Self {
        Self {
            kind,
            payload,
            timestamp: Utc::now(),
        }
    }
}

/// Evaluate both thresholds for `report`.
///
/// Emits at most one alert per condition:
/// - `score_drop` when a previous report exists and the score fell by at
///   least `thresholds.score_drop` points;
/// - `critical_issues` when the report has at least
///   `thresholds.critical_issues` critical discrepancies.
///
/// Validated thresholds are at least 1.
pub fn evaluate_alerts(
    report: &AuditReport,
    previous: Option<&AuditReport>,
    thresholds: &AlertThresholds,
) -> Vec<AlertEvent> {
    let mut alerts = Vec::new();

    if let Some(prev) = previous {
        let drop = i32::from(prev.overall_score) - i32::from(report.overall_score);
        if drop >= thresholds.score_drop {
            alerts.push(AlertEvent::new(
                AlertKind::ScoreDrop,
                json!({
                    "report_id": report.id,
                    "previous_score": prev.overall_score,
                    "current_score": report.overall_score,
                    "drop": drop,
                    "threshold": thresholds.score_drop,
                }),
            ));
        }
    }

    if i64::from(report.critical_issues) >= i64::from(thresholds.critical_issues) {
        alerts.push(AlertEvent::new(
            AlertKind::CriticalIssues,
            json!({
                "report_id": report.id,
                "critical_issues": report.critical_issues,
                "threshold": thresholds.critical_issues,
                "platforms": report.platforms_with_critical_issues(),
            }),
        ));
    }

    alerts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
