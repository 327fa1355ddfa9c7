//! The audit engine.
//!
//! Owns the master record, the active configuration, and the report
//! history, and runs the three audit operations against them:
//!
//! - [`AuditEngine::run_full_audit`]: fetch and analyze every configured
//!   platform, assemble a report, raise alerts, append to history, persist.
//! - [`AuditEngine::recheck`]: re-fetch only drifting platforms and compare
//!   the critical fields. Never touches history.
//! - [`AuditEngine::alert_sweep`]: re-evaluate thresholds on the latest
//!   report. Never fetches.
//!
//! Full audits are serialized by a single lock. A second request while one
//! is in flight returns immediately with the latest report.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use napwatch_core::alert::{evaluate_alerts, AlertEvent};
use napwatch_core::analyzer;
use napwatch_core::audit_config::{AuditConfiguration, AuditConfigurationPatch};
use napwatch_core::discrepancy::{Discrepancy, Field};
use napwatch_core::error::CoreError;
use napwatch_core::history::ReportHistory;
use napwatch_core::identity::{MasterIdentityPatch, MasterIdentityRecord};
use napwatch_core::platform::{FetchFailure, PlatformSnapshot, PlatformTarget, SnapshotStatus};
use napwatch_core::policy::ComparisonPolicy;
use napwatch_core::report::AuditReport;
use napwatch_core::scoring;
use napwatch_core::store::ReportStore;
use napwatch_core::types::Timestamp;
use napwatch_events::NotificationSink;
use napwatch_providers::PlatformProvider;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::master::MasterIdentityStore;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Idle,
    Auditing,
}

/// Result of a full-audit request.
#[derive(Debug, Clone)]
pub enum AuditOutcome {
    /// A new report was produced and appended to history.
    Completed(Arc<AuditReport>),
    /// Another audit holds the lock; carries the latest report, if any.
    AlreadyRunning(Option<Arc<AuditReport>>),
}

impl AuditOutcome {
    pub fn report(&self) -> Option<&Arc<AuditReport>> {
        match self {
            Self::Completed(report) => Some(report),
            Self::AlreadyRunning(report) => report.as_ref(),
        }
    }

    pub fn already_running(&self) -> bool {
        matches!(self, Self::AlreadyRunning(_))
    }
}

/// Per-platform result of a consistency re-check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecheckOutcome {
    /// Critical fields still differ from the master record.
    StillDrifting { discrepancies: Vec<Discrepancy> },
    /// Critical fields now match.
    Resolved,
    Failed { failure: FetchFailure },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecheckResult {
    pub platform: String,
    #[serde(flatten)]
    pub outcome: RecheckOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecheckSummary {
    /// Report whose drifting platforms were re-checked.
    pub report_id: Option<Uuid>,
    pub checked_at: Timestamp,
    pub results: Vec<RecheckResult>,
}

impl RecheckSummary {
    pub fn count(&self, pred: impl Fn(&RecheckOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct AuditEngine {
    master: MasterIdentityStore,
    config: RwLock<AuditConfiguration>,
    history: RwLock<ReportHistory>,
    audit_lock: Mutex<()>,
    auditing: AtomicBool,
    provider: Arc<dyn PlatformProvider>,
    sink: Arc<dyn NotificationSink>,
    store: Arc<dyn ReportStore>,
}

/// Flips the engine into `auditing` for its lifetime.
struct AuditingGuard<'a>(&'a AtomicBool);

impl<'a> AuditingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for AuditingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl AuditEngine {
    /// Build an engine. Rejects an invalid initial configuration or master
    /// record.
    pub fn new(
        master: MasterIdentityRecord,
        config: AuditConfiguration,
        provider: Arc<dyn PlatformProvider>,
        sink: Arc<dyn NotificationSink>,
        store: Arc<dyn ReportStore>,
    ) -> Result<Arc<Self>, CoreError> {
        config.validate()?;
        master.ensure_valid()?;
        Ok(Arc::new(Self {
            master: MasterIdentityStore::new(master),
            history: RwLock::new(ReportHistory::new(config.history_limit)),
            config: RwLock::new(config),
            audit_lock: Mutex::new(()),
            auditing: AtomicBool::new(false),
            provider,
            sink,
            store,
        }))
    }

    pub fn state(&self) -> EngineState {
        if self.auditing.load(Ordering::SeqCst) {
            EngineState::Auditing
        } else {
            EngineState::Idle
        }
    }

    // -- Full audit ---------------------------------------------------------

    pub async fn run_full_audit(&self) -> AuditOutcome {
        let Ok(_lock) = self.audit_lock.try_lock() else {
            tracing::info!("Audit already running, returning latest report");
            return AuditOutcome::AlreadyRunning(self.latest_report().await);
        };
        let _auditing = AuditingGuard::enter(&self.auditing);

        let config = self.config.read().await.clone();
        let master = self.master.get().await;
        tracing::info!(platforms = config.platforms.len(), "Full audit started");

        let platforms = self
            .check_platforms(
                &config.platforms,
                &master,
                &config.policy,
                &Field::ALL,
                config.max_concurrent_fetches,
            )
            .await;

        let (report, previous) = {
            let mut history = self.history.write().await;
            let previous = history.latest();
            let report = Arc::new(AuditReport::assemble(
                platforms,
                previous.as_deref(),
                config.auto_fix_enabled,
            ));
            let evicted = history.push(Arc::clone(&report));
            if !evicted.is_empty() {
                tracing::debug!(evicted = evicted.len(), "Evicted reports from history");
            }
            (report, previous)
        };

        tracing::info!(
            report_id = %report.id,
            overall_score = report.overall_score,
            critical_issues = report.critical_issues,
            direction = report.trend.direction.as_str(),
            "Full audit completed",
        );

        if config.monitoring_enabled {
            let alerts = evaluate_alerts(&report, previous.as_deref(), &config.alert_thresholds);
            self.emit_all(alerts).await;
        }

        if let Err(e) = self.store.persist(&report).await {
            tracing::error!(report_id = %report.id, error = %e, "Failed to persist audit report");
        }

        AuditOutcome::Completed(report)
    }

    /// Fetch and analyze `targets` with bounded concurrency. Results come
    /// back in `targets` order.
    async fn check_platforms(
        &self,
        targets: &[PlatformTarget],
        master: &MasterIdentityRecord,
        policy: &ComparisonPolicy,
        fields: &[Field],
        concurrency: usize,
    ) -> Vec<PlatformSnapshot> {
        let futures: Vec<_> = targets
            .iter()
            .enumerate()
            .map(|(idx, target)| async move {
                (idx, self.check_platform(target, master, policy, fields).await)
            })
            .collect();
        let mut results: Vec<(usize, PlatformSnapshot)> = stream::iter(futures)
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;
        results.sort_by_key(|(idx, _)| *idx);
        results.into_iter().map(|(_, snapshot)| snapshot).collect()
    }

    async fn check_platform(
        &self,
        target: &PlatformTarget,
        master: &MasterIdentityRecord,
        policy: &ComparisonPolicy,
        fields: &[Field],
    ) -> PlatformSnapshot {
        match self.provider.fetch_snapshot(target).await {
            Ok(raw) => {
                let discrepancies =
                    analyzer::compare_fields(&target.name, &raw, master, policy, fields);
                let score = scoring::score(&discrepancies);
                let status = scoring::status(&discrepancies);
                tracing::debug!(
                    platform = %target.name,
                    score,
                    discrepancies = discrepancies.len(),
                    "Platform analyzed",
                );
                PlatformSnapshot::analyzed(target.name.clone(), raw, discrepancies, status, score)
            }
            Err(failure) => {
                tracing::warn!(platform = %target.name, error = %failure, "Platform fetch failed");
                PlatformSnapshot::failed(target.name.clone(), failure)
            }
        }
    }

    // -- Re-check -----------------------------------------------------------

    /// Re-fetch every platform that was not `consistent` in the latest report
    /// and compare only the configured critical fields.
    pub async fn recheck(&self) -> RecheckSummary {
        let Some(latest) = self.latest_report().await else {
            tracing::debug!("No report yet, skipping consistency re-check");
            return RecheckSummary {
                report_id: None,
                checked_at: Utc::now(),
                results: Vec::new(),
            };
        };

        let config = self.config.read().await.clone();
        let master = self.master.get().await;

        let targets: Vec<PlatformTarget> = latest
            .platforms
            .iter()
            .filter(|p| p.status != SnapshotStatus::Consistent)
            .filter_map(|p| config.platforms.iter().find(|t| t.name == p.platform))
            .cloned()
            .collect();

        let snapshots = self
            .check_platforms(
                &targets,
                &master,
                &config.policy,
                &config.critical_fields,
                config.max_concurrent_fetches,
            )
            .await;

        let results: Vec<RecheckResult> = snapshots
            .into_iter()
            .map(|snapshot| {
                let outcome = match (snapshot.failure, snapshot.status) {
                    (Some(failure), _) => RecheckOutcome::Failed { failure },
                    (None, SnapshotStatus::Consistent) => RecheckOutcome::Resolved,
                    (None, _) => RecheckOutcome::StillDrifting {
                        discrepancies: snapshot.discrepancies,
                    },
                };
                RecheckResult {
                    platform: snapshot.platform,
                    outcome,
                }
            })
            .collect();

        let summary = RecheckSummary {
            report_id: Some(latest.id),
            checked_at: Utc::now(),
            results,
        };
        tracing::info!(
            report_id = %latest.id,
            checked = summary.results.len(),
            resolved = summary.count(|o| matches!(o, RecheckOutcome::Resolved)),
            drifting = summary.count(|o| matches!(o, RecheckOutcome::StillDrifting { .. })),
            "Consistency re-check completed",
        );
        summary
    }

    // -- Alert sweep --------------------------------------------------------

    /// Re-evaluate alert thresholds on the latest report against its
    /// predecessor. Emitted alerts carry `"sweep": true` in their payload.
    pub async fn alert_sweep(&self) -> Vec<AlertEvent> {
        let config = self.config.read().await.clone();
        if !config.monitoring_enabled {
            return Vec::new();
        }
        let (latest, previous) = self.history.read().await.latest_pair();
        let Some(latest) = latest else {
            return Vec::new();
        };

        let mut alerts = evaluate_alerts(&latest, previous.as_deref(), &config.alert_thresholds);
        for alert in &mut alerts {
            if let Some(payload) = alert.payload.as_object_mut() {
                payload.insert("sweep".into(), serde_json::Value::Bool(true));
            }
        }
        tracing::debug!(report_id = %latest.id, alerts = alerts.len(), "Alert sweep completed");
        self.emit_all(alerts.clone()).await;
        alerts
    }

    async fn emit_all(&self, alerts: Vec<AlertEvent>) {
        for alert in alerts {
            let kind = alert.kind.as_str();
            if let Err(e) = self.sink.emit(alert).await {
                tracing::error!(kind, error = %e, "Failed to deliver alert");
            }
        }
    }

    /// Seed history with previously persisted reports, oldest first. The
    /// next audit computes its trend against the newest of them.
    pub async fn restore_history(&self, reports: Vec<AuditReport>) {
        let mut history = self.history.write().await;
        let restored = reports.len();
        for report in reports {
            history.push(Arc::new(report));
        }
        tracing::info!(restored, retained = history.len(), "Report history restored");
    }

    // -- Queries ------------------------------------------------------------

    pub async fn latest_report(&self) -> Option<Arc<AuditReport>> {
        self.history.read().await.latest()
    }

    /// Retained reports, newest first.
    pub async fn history(&self) -> Vec<Arc<AuditReport>> {
        self.history.read().await.newest_first()
    }

    /// One platform's result from the latest report.
    pub async fn platform_snapshot(&self, name: &str) -> Result<PlatformSnapshot, CoreError> {
        let latest = self.latest_report().await.ok_or_else(|| CoreError::NotFound {
            entity: "audit_report",
            id: "latest".to_string(),
        })?;
        latest.platform(name).cloned().ok_or_else(|| CoreError::NotFound {
            entity: "platform",
            id: name.to_string(),
        })
    }

    pub async fn master_record(&self) -> MasterIdentityRecord {
        self.master.get().await
    }

    /// Update the master record. Does not trigger an audit.
    pub async fn update_master_record(
        &self,
        patch: MasterIdentityPatch,
    ) -> Result<MasterIdentityRecord, CoreError> {
        self.master.update(patch).await
    }

    // -- Configuration ------------------------------------------------------

    pub async fn get_config(&self) -> AuditConfiguration {
        self.config.read().await.clone()
    }

    /// Merge and validate `patch`. A rejected patch changes nothing. The new
    /// configuration applies from the next audit; a lowered history limit
    /// evicts immediately.
    pub async fn update_config(
        &self,
        patch: AuditConfigurationPatch,
    ) -> Result<AuditConfiguration, CoreError> {
        let mut config = self.config.write().await;
        let next = config.apply_patch(patch)?;
        if next.history_limit != config.history_limit {
            self.history.write().await.set_limit(next.history_limit);
        }
        *config = next.clone();
        tracing::info!(
            enabled = next.enabled,
            platforms = next.platforms.len(),
            frequency_hours = next.frequency_hours,
            "Audit configuration updated",
        );
        Ok(next)
    }

    pub fn store(&self) -> &Arc<dyn ReportStore> {
        &self.store
    }
}
