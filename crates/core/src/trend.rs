//! Score trend between consecutive audit reports.

use serde::{Deserialize, Serialize};

use crate::report::AuditReport;

/// Score movement (in points) beyond which a trend is no longer `stable`.
pub const TREND_THRESHOLD: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

impl TrendDirection {
    /// `improving` above +5, `declining` below -5, otherwise `stable`.
    pub fn classify(score_change: i32) -> Self {
        if score_change > TREND_THRESHOLD {
            Self::Improving
        } else if score_change < -TREND_THRESHOLD {
            Self::Declining
        } else {
            Self::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Stable => "stable",
            Self::Declining => "declining",
        }
    }
}

/// Comparison of a report against its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub previous_score: Option<u8>,
    pub score_change: i32,
    pub direction: TrendDirection,
    pub critical_issues_change: i32,
}

impl TrendSummary {
    /// Trend for a first report with nothing to compare against.
    pub fn baseline() -> Self {
        Self {
            previous_score: None,
            score_change: 0,
            direction: TrendDirection::Stable,
            critical_issues_change: 0,
        }
    }
}

/// Compute the trend of a new result against the most recent prior report.
pub fn compute_trend(
    overall_score: u8,
    critical_issues: u32,
    previous: Option<&AuditReport>,
) -> TrendSummary {
    let Some(prev) = previous else {
        return TrendSummary::baseline();
    };
    let score_change = i32::from(overall_score) - i32::from(prev.overall_score);
    let critical_issues_change = critical_issues as i32 - prev.critical_issues as i32;
    TrendSummary {
        previous_score: Some(prev.overall_score),
        score_change,
        direction: TrendDirection::classify(score_change),
        critical_issues_change,
    }
}
