//! Consistency scoring and status classification.
//!
//! A platform starts at 100 and loses a fixed number of points per
//! discrepancy (critical 25, major 15, minor 5), floored at 0. The overall
//! report score is the rounded mean of all platform scores.

use crate::discrepancy::Discrepancy;
use crate::platform::SnapshotStatus;

/// Perfect consistency.
pub const MAX_SCORE: u8 = 100;

/// Score a platform from its discrepancy list.
pub fn score(discrepancies: &[Discrepancy]) -> u8 {
    let penalty: u32 = discrepancies
        .iter()
        .map(|d| u32::from(d.severity.penalty()))
        .sum();
    u32::from(MAX_SCORE).saturating_sub(penalty) as u8
}

/// Classify an analyzed platform. Failed fetches never reach this function.
pub fn status(discrepancies: &[Discrepancy]) -> SnapshotStatus {
    if discrepancies.is_empty() {
        SnapshotStatus::Consistent
    } else {
        SnapshotStatus::Inconsistent
    }
}

/// Rounded mean of platform scores, clamped to `[0, 100]`.
///
/// Halves round away from zero, so `{100, 75}` yields 88. An empty slice
/// yields 0.
pub fn overall_score(scores: &[u8]) -> u8 {
    if scores.is_empty() {
        return 0;
    }
    let sum: f64 = scores.iter().map(|&s| f64::from(s)).sum();
    let mean = (sum / scores.len() as f64).round();
    clamp_score(mean)
}

/// Clamp a computed score into range, logging any out-of-range value.
pub fn clamp_score(value: f64) -> u8 {
    if !(0.0..=f64::from(MAX_SCORE)).contains(&value) || value.is_nan() {
        tracing::warn!(value, "Score outside [0, 100]; clamping");
    }
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, f64::from(MAX_SCORE)) as u8
}
