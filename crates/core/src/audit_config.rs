//! Audit configuration, its patch DTO, and validation.
//!
//! Updates are merged into a copy and the whole result is validated before
//! it replaces the active configuration, so a rejected update never leaves
//! a half-applied state behind.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::discrepancy::Field;
use crate::error::CoreError;
use crate::platform::PlatformTarget;
use crate::policy::ComparisonPolicy;

/// Full audit once a day.
pub const DEFAULT_FREQUENCY_HOURS: u32 = 24;
/// Lightweight consistency re-check.
pub const DEFAULT_RECHECK_INTERVAL_HOURS: u32 = 6;
/// Alert threshold sweep.
pub const DEFAULT_ALERT_SWEEP_INTERVAL_HOURS: u32 = 2;
/// In-flight platform fetches per audit.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;
/// Reports retained in history.
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Points the overall score must fall by to raise `score_drop`.
    pub score_drop: i32,
    /// Critical discrepancies needed to raise `critical_issues`.
    pub critical_issues: i32,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            score_drop: 10,
            critical_issues: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfiguration {
    pub enabled: bool,
    pub frequency_hours: u32,
    pub platforms: Vec<PlatformTarget>,
    pub critical_fields: Vec<Field>,
    pub monitoring_enabled: bool,
    pub alert_thresholds: AlertThresholds,
    /// Reserved: only marks recommendations as eligible, never executes.
    pub auto_fix_enabled: bool,
    #[serde(default = "default_recheck_interval")]
    pub recheck_interval_hours: u32,
    #[serde(default = "default_alert_sweep_interval")]
    pub alert_sweep_interval_hours: u32,
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default)]
    pub policy: ComparisonPolicy,
}

fn default_recheck_interval() -> u32 {
    DEFAULT_RECHECK_INTERVAL_HOURS
}

fn default_alert_sweep_interval() -> u32 {
    DEFAULT_ALERT_SWEEP_INTERVAL_HOURS
}

fn default_max_concurrent_fetches() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl AuditConfiguration {
    /// Defaults for the given platform list.
    pub fn with_platforms(platforms: Vec<PlatformTarget>) -> Self {
        Self {
            enabled: true,
            frequency_hours: DEFAULT_FREQUENCY_HOURS,
            platforms,
            critical_fields: vec![Field::Name, Field::Phone, Field::Address],
            monitoring_enabled: true,
            alert_thresholds: AlertThresholds::default(),
            auto_fix_enabled: false,
            recheck_interval_hours: DEFAULT_RECHECK_INTERVAL_HOURS,
            alert_sweep_interval_hours: DEFAULT_ALERT_SWEEP_INTERVAL_HOURS,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            history_limit: DEFAULT_HISTORY_LIMIT,
            policy: ComparisonPolicy::default(),
        }
    }

    pub fn audit_interval(&self) -> Duration {
        hours(self.frequency_hours)
    }

    pub fn recheck_interval(&self) -> Duration {
        hours(self.recheck_interval_hours)
    }

    pub fn alert_sweep_interval(&self) -> Duration {
        hours(self.alert_sweep_interval_hours)
    }

    /// Check every invariant of a configuration.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_positive(self.frequency_hours, "frequency_hours")?;
        validate_positive(self.recheck_interval_hours, "recheck_interval_hours")?;
        validate_positive(self.alert_sweep_interval_hours, "alert_sweep_interval_hours")?;
        validate_platforms(&self.platforms)?;
        validate_threshold(self.alert_thresholds.score_drop, "alert_thresholds.score_drop")?;
        validate_threshold(
            self.alert_thresholds.critical_issues,
            "alert_thresholds.critical_issues",
        )?;
        if self.max_concurrent_fetches == 0 {
            return Err(CoreError::Validation(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        if self.history_limit == 0 {
            return Err(CoreError::Validation(
                "history_limit must be at least 1".to_string(),
            ));
        }
        self.policy.validate()
    }

    /// Merge `patch` into a copy of `self` and validate the result.
    pub fn apply_patch(&self, patch: AuditConfigurationPatch) -> Result<Self, CoreError> {
        let mut next = self.clone();
        if let Some(v) = patch.enabled {
            next.enabled = v;
        }
        if let Some(v) = patch.frequency_hours {
            next.frequency_hours = v;
        }
        if let Some(v) = patch.platforms {
            next.platforms = v;
        }
        if let Some(v) = patch.critical_fields {
            next.critical_fields = v;
        }
        if let Some(v) = patch.monitoring_enabled {
            next.monitoring_enabled = v;
        }
        if let Some(v) = patch.alert_thresholds {
            next.alert_thresholds = v;
        }
        if let Some(v) = patch.auto_fix_enabled {
            next.auto_fix_enabled = v;
        }
        if let Some(v) = patch.recheck_interval_hours {
            next.recheck_interval_hours = v;
        }
        if let Some(v) = patch.alert_sweep_interval_hours {
            next.alert_sweep_interval_hours = v;
        }
        if let Some(v) = patch.max_concurrent_fetches {
            next.max_concurrent_fetches = v;
        }
        if let Some(v) = patch.history_limit {
            next.history_limit = v;
        }
        if let Some(v) = patch.policy {
            next.policy = v;
        }
        next.validate()?;
        Ok(next)
    }
}

/// Partial configuration update. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfigurationPatch {
    pub enabled: Option<bool>,
    pub frequency_hours: Option<u32>,
    pub platforms: Option<Vec<PlatformTarget>>,
    pub critical_fields: Option<Vec<Field>>,
    pub monitoring_enabled: Option<bool>,
    pub alert_thresholds: Option<AlertThresholds>,
    pub auto_fix_enabled: Option<bool>,
    pub recheck_interval_hours: Option<u32>,
    pub alert_sweep_interval_hours: Option<u32>,
    pub max_concurrent_fetches: Option<usize>,
    pub history_limit: Option<usize>,
    pub policy: Option<ComparisonPolicy>,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn hours(h: u32) -> Duration {
    Duration::from_secs(u64::from(h) * 3600)
}

fn validate_positive(value: u32, name: &str) -> Result<(), CoreError> {
    if value == 0 {
        return Err(CoreError::Validation(format!("{name} must be greater than 0")));
    }
    Ok(())
}

fn validate_threshold(value: i32, name: &str) -> Result<(), CoreError> {
    if value < 1 {
        return Err(CoreError::Validation(format!(
            "{name} must be at least 1, got {value}"
        )));
    }
    Ok(())
}

/// Platform list must be non-empty with unique, non-blank names.
pub fn validate_platforms(platforms: &[PlatformTarget]) -> Result<(), CoreError> {
    if platforms.is_empty() {
        return Err(CoreError::Validation(
            "platforms must contain at least one target".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for p in platforms {
        if p.name.trim().is_empty() {
            return Err(CoreError::Validation("platform name must not be empty".to_string()));
        }
        if !seen.insert(p.name.as_str()) {
            return Err(CoreError::Validation(format!(
                "duplicate platform '{}'",
                p.name
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
