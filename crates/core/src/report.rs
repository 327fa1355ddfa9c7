//! Aggregate audit report assembly.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::discrepancy::Severity;
use crate::platform::{PlatformSnapshot, SnapshotStatus};
use crate::recommendation::{self, Recommendation};
use crate::scoring::overall_score;
use crate::trend::{compute_trend, TrendSummary};
use crate::types::Timestamp;

/// Immutable result of one full audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub id: Uuid,
    pub generated_at: Timestamp,
    pub overall_score: u8,
    pub total_platforms: u32,
    pub consistent_platforms: u32,
    pub inconsistent_platforms: u32,
    /// Platforms whose fetch failed (`missing` or `error`).
    pub failed_platforms: u32,
    pub critical_issues: u32,
    pub platforms: Vec<PlatformSnapshot>,
    pub recommendations: Vec<Recommendation>,
    pub trend: TrendSummary,
}

impl AuditReport {
    /// Assemble a report from every platform's result.
    ///
    /// `previous` is the most recent report in history, if any.
    pub fn assemble(
        platforms: Vec<PlatformSnapshot>,
        previous: Option<&AuditReport>,
        auto_fix_enabled: bool,
    ) -> Self {
        let scores: Vec<u8> = platforms.iter().map(|p| p.score).collect();
        let overall = overall_score(&scores);

        let count_status = |status: SnapshotStatus| {
            platforms.iter().filter(|p| p.status == status).count() as u32
        };
        let consistent = count_status(SnapshotStatus::Consistent);
        let inconsistent = count_status(SnapshotStatus::Inconsistent);
        let failed = platforms.iter().filter(|p| p.is_failed()).count() as u32;

        let critical_issues = platforms
            .iter()
            .flat_map(|p| p.discrepancies.iter())
            .filter(|d| d.severity == Severity::Critical)
            .count() as u32;

        let recommendations = recommendation::generate(&platforms, auto_fix_enabled);
        let trend = compute_trend(overall, critical_issues, previous);

        Self {
            id: Uuid::now_v7(),
            generated_at: Utc::now(),
            overall_score: overall,
            total_platforms: platforms.len() as u32,
            consistent_platforms: consistent,
            inconsistent_platforms: inconsistent,
            failed_platforms: failed,
            critical_issues,
            platforms,
            recommendations,
            trend,
        }
    }

    /// Look up one platform's result by name.
    pub fn platform(&self, name: &str) -> Option<&PlatformSnapshot> {
        self.platforms.iter().find(|p| p.platform == name)
    }

    /// Names of platforms carrying at least one critical discrepancy.
    pub fn platforms_with_critical_issues(&self) -> Vec<String> {
        self.platforms
            .iter()
            .filter(|p| p.discrepancies.iter().any(|d| d.severity == Severity::Critical))
            .map(|p| p.platform.clone())
            .collect()
    }

    /// Minimal report with a given score and critical count.
    #[cfg(test)]
    pub(crate) fn test_fixture(overall_score: u8, critical_issues: u32) -> Self {
        Self {
            id: Uuid::now_v7(),
            generated_at: Utc::now(),
            overall_score,
            total_platforms: 0,
            consistent_platforms: 0,
            inconsistent_platforms: 0,
            failed_platforms: 0,
            critical_issues,
            platforms: Vec::new(),
            recommendations: Vec::new(),
            trend: TrendSummary::baseline(),
        }
    }
}
