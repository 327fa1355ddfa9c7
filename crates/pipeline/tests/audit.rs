mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use napwatch_core::alert::AlertKind;
use napwatch_core::audit_config::{AlertThresholds, AuditConfigurationPatch};
use napwatch_core::discrepancy::{Field, Severity};
use napwatch_core::error::CoreError;
use napwatch_core::identity::{AddressPatch, MasterIdentityPatch};
use napwatch_core::platform::{FailureReason, FetchFailure, SnapshotStatus};
use napwatch_core::policy::ComparisonPolicy;
use napwatch_core::trend::TrendDirection;
use napwatch_pipeline::{AuditOutcome, EngineState, RecheckOutcome};

use common::*;

fn completed(outcome: AuditOutcome) -> std::sync::Arc<napwatch_core::report::AuditReport> {
    match outcome {
        AuditOutcome::Completed(report) => report,
        AuditOutcome::AlreadyRunning(_) => panic!("expected a completed audit"),
    }
}

// ---------------------------------------------------------------------------
// Full audit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn city_suffix_costs_one_major() {
    let h = harness(config(&[MAPS, DIRECTORY]));
    h.provider.set_snapshot(MAPS, matching_snapshot()).await;
    h.provider
        .set_snapshot(DIRECTORY, snapshot_with_city("Berlin-Mitte"))
        .await;

    let report = completed(h.engine.run_full_audit().await);

    assert_eq!(report.overall_score, 93);
    assert_eq!(report.total_platforms, 2);
    assert_eq!(report.consistent_platforms, 1);
    assert_eq!(report.inconsistent_platforms, 1);
    assert_eq!(report.critical_issues, 0);

    let names: Vec<_> = report.platforms.iter().map(|p| p.platform.as_str()).collect();
    assert_eq!(names, [MAPS, DIRECTORY]);

    let directory = report.platform(DIRECTORY).unwrap();
    assert_eq!(directory.score, 85);
    assert_eq!(directory.discrepancies.len(), 1);
    assert_eq!(directory.discrepancies[0].severity, Severity::Major);
    assert_eq!(report.recommendations.len(), 1);
    assert_eq!(report.trend.direction, TrendDirection::Stable);
    assert_eq!(report.trend.previous_score, None);
}

#[tokio::test]
async fn normalized_phone_formats_are_equal() {
    let h = harness(config(&[MAPS]));
    h.provider.set_snapshot(MAPS, matching_snapshot()).await;

    let report = completed(h.engine.run_full_audit().await);
    assert_eq!(report.overall_score, 100);
    assert_eq!(report.platforms[0].status, SnapshotStatus::Consistent);
}

#[tokio::test]
async fn phone_formats_differ_without_normalization() {
    let mut cfg = config(&[MAPS]);
    cfg.policy = ComparisonPolicy {
        normalize_phone: false,
        ..Default::default()
    };
    let h = harness(cfg);
    h.provider.set_snapshot(MAPS, matching_snapshot()).await;

    let report = completed(h.engine.run_full_audit().await);
    let maps = &report.platforms[0];
    assert_eq!(maps.status, SnapshotStatus::Inconsistent);
    assert_eq!(maps.discrepancies[0].field, Field::Phone);
    assert_eq!(maps.discrepancies[0].severity, Severity::Critical);
    assert_eq!(report.critical_issues, 1);
}

#[tokio::test]
async fn fetch_failures_become_missing_and_error() {
    let h = harness(config(&[MAPS, DIRECTORY, "reviews"]));
    h.provider.set_snapshot(MAPS, matching_snapshot()).await;
    h.provider
        .set_failure(DIRECTORY, FetchFailure::new(FailureReason::NotFound, "no listing"))
        .await;
    h.provider
        .set_failure("reviews", FetchFailure::new(FailureReason::Timeout, "slow"))
        .await;

    let report = completed(h.engine.run_full_audit().await);

    let directory = report.platform(DIRECTORY).unwrap();
    assert_eq!(directory.status, SnapshotStatus::Missing);
    assert_eq!(directory.score, 0);
    assert!(directory.discrepancies.is_empty());
    assert!(directory.name.is_none());

    let reviews = report.platform("reviews").unwrap();
    assert_eq!(reviews.status, SnapshotStatus::Error);
    assert_eq!(
        reviews.failure.as_ref().map(|f| f.reason),
        Some(FailureReason::Timeout)
    );

    assert_eq!(report.failed_platforms, 2);
    assert_eq!(report.overall_score, 33);
}

#[tokio::test]
async fn report_is_persisted() {
    let h = harness(config(&[MAPS]));
    h.provider.set_snapshot(MAPS, matching_snapshot()).await;

    let report = completed(h.engine.run_full_audit().await);
    let exported = h.store.exported().await;
    assert_eq!(exported.len(), 1);
    assert!(exported[0].contains(&report.id.to_string()));
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[tokio::test]
async fn history_keeps_the_thirty_most_recent() {
    let h = harness(config(&[MAPS]));
    h.provider.set_snapshot(MAPS, matching_snapshot()).await;

    let first = completed(h.engine.run_full_audit().await);
    for _ in 0..30 {
        h.engine.run_full_audit().await;
    }

    let history = h.engine.history().await;
    assert_eq!(history.len(), 30);
    assert!(history.iter().all(|r| r.id != first.id));
    assert_eq!(
        history[0].id,
        h.engine.latest_report().await.unwrap().id
    );
}

#[tokio::test]
async fn trend_tracks_previous_report() {
    let h = harness(config(&[MAPS]));
    h.provider.set_snapshot(MAPS, matching_snapshot()).await;
    h.engine.run_full_audit().await;

    h.provider
        .set_snapshot(MAPS, snapshot_with_phone("+49 30 99999999"))
        .await;
    let report = completed(h.engine.run_full_audit().await);

    assert_eq!(report.trend.previous_score, Some(100));
    assert_eq!(report.trend.score_change, -25);
    assert_eq!(report.trend.direction, TrendDirection::Declining);
    assert_eq!(report.trend.critical_issues_change, 1);
}

#[tokio::test]
async fn restored_history_feeds_the_next_trend() {
    let h = harness(config(&[MAPS]));
    h.provider.set_snapshot(MAPS, matching_snapshot()).await;
    let earlier = completed(h.engine.run_full_audit().await);

    let restarted = harness(config(&[MAPS]));
    restarted
        .provider
        .set_snapshot(MAPS, snapshot_with_city("Berlin-Mitte"))
        .await;
    restarted
        .engine
        .restore_history(vec![earlier.as_ref().clone()])
        .await;

    let report = completed(restarted.engine.run_full_audit().await);
    assert_eq!(report.trend.previous_score, Some(100));
    assert_eq!(report.trend.score_change, -15);
    assert_eq!(restarted.engine.history().await.len(), 2);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_audit_returns_existing_report_without_fetching() {
    let h = slow_harness(config(&[MAPS, DIRECTORY]), Duration::from_millis(100));
    h.provider.set_snapshot(MAPS, matching_snapshot()).await;
    h.provider.set_snapshot(DIRECTORY, matching_snapshot()).await;

    let first = completed(h.engine.run_full_audit().await);
    assert_eq!(h.provider.fetch_count(), 2);

    let engine = h.engine.clone();
    let running = tokio::spawn(async move { engine.run_full_audit().await });
    while h.engine.state() != EngineState::Auditing {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let outcome = h.engine.run_full_audit().await;
    assert!(outcome.already_running());
    assert_eq!(outcome.report().map(|r| r.id), Some(first.id));

    let second = completed(running.await.unwrap());
    assert_ne!(second.id, first.id);
    assert_eq!(h.provider.fetch_count(), 4);
    assert_eq!(h.engine.state(), EngineState::Idle);
    assert_eq!(h.engine.history().await.len(), 2);
}

#[tokio::test]
async fn fetches_respect_concurrency_limit_and_keep_configured_order() {
    let names: Vec<String> = (0..10).map(|i| format!("platform-{i}")).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut cfg = config(&name_refs);
    cfg.max_concurrent_fetches = 3;

    // Earlier platforms answer last so completion order is reversed.
    let provider = names
        .iter()
        .enumerate()
        .fold(InFlightProvider::default(), |p, (i, name)| {
            p.with_delay(name, Duration::from_millis(5 * (10 - i as u64)))
        });
    let provider = std::sync::Arc::new(provider);
    let engine = napwatch_pipeline::AuditEngine::new(
        master_record(),
        cfg,
        provider.clone(),
        std::sync::Arc::new(RecordingSink::default()),
        std::sync::Arc::new(napwatch_core::store::MemoryReportStore::new()),
    )
    .unwrap();

    let report = completed(engine.run_full_audit().await);
    assert!(provider.peak() <= 3, "peak in-flight fetches was {}", provider.peak());
    assert!(provider.peak() >= 2);
    let order: Vec<&str> = report.platforms.iter().map(|p| p.platform.as_str()).collect();
    assert_eq!(order, name_refs);
    assert_eq!(report.consistent_platforms, 10);
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn score_drop_and_critical_issues_raise_alerts() {
    let h = harness(config(&[MAPS, DIRECTORY]));
    h.provider.set_snapshot(MAPS, matching_snapshot()).await;
    h.provider.set_snapshot(DIRECTORY, matching_snapshot()).await;
    h.engine.run_full_audit().await;
    assert!(h.sink.alerts().is_empty());

    h.provider
        .set_snapshot(DIRECTORY, snapshot_with_phone("+49 30 99999999"))
        .await;
    let report = completed(h.engine.run_full_audit().await);
    assert_eq!(report.overall_score, 88);

    let kinds: Vec<_> = h.sink.alerts().iter().map(|a| a.kind).collect();
    assert_eq!(kinds, [AlertKind::ScoreDrop, AlertKind::CriticalIssues]);
    let drop = &h.sink.alerts()[0];
    assert_eq!(drop.payload["drop"], 12);
    assert_eq!(drop.payload["report_id"], report.id.to_string());
}

#[tokio::test]
async fn no_alerts_when_monitoring_disabled() {
    let mut cfg = config(&[MAPS]);
    cfg.monitoring_enabled = false;
    let h = harness(cfg);
    h.provider
        .set_snapshot(MAPS, snapshot_with_phone("+49 30 99999999"))
        .await;

    let report = completed(h.engine.run_full_audit().await);
    assert_eq!(report.critical_issues, 1);
    assert!(h.sink.alerts().is_empty());
    assert!(h.engine.alert_sweep().await.is_empty());
}

#[tokio::test]
async fn sink_failure_does_not_fail_the_audit() {
    let provider = std::sync::Arc::new(napwatch_providers::FixtureProvider::new());
    provider
        .set_snapshot(MAPS, snapshot_with_phone("+49 30 99999999"))
        .await;
    let engine = napwatch_pipeline::AuditEngine::new(
        master_record(),
        config(&[MAPS]),
        provider,
        std::sync::Arc::new(FailingSink),
        std::sync::Arc::new(napwatch_core::store::MemoryReportStore::new()),
    )
    .unwrap();

    let report = completed(engine.run_full_audit().await);
    assert_eq!(report.critical_issues, 1);
    assert!(engine.latest_report().await.is_some());
}

#[tokio::test]
async fn alert_sweep_re_evaluates_latest_report() {
    let mut cfg = config(&[MAPS]);
    cfg.alert_thresholds = AlertThresholds {
        score_drop: 50,
        critical_issues: 1,
    };
    let h = harness(cfg);
    h.provider
        .set_snapshot(MAPS, snapshot_with_phone("+49 30 99999999"))
        .await;
    h.engine.run_full_audit().await;
    let after_audit = h.sink.alerts().len();
    assert_eq!(after_audit, 1);

    let swept = h.engine.alert_sweep().await;
    assert_eq!(swept.len(), 1);
    assert_eq!(swept[0].kind, AlertKind::CriticalIssues);
    assert_eq!(swept[0].payload["sweep"], true);
    assert_eq!(h.sink.alerts().len(), after_audit + 1);
    assert_eq!(h.engine.history().await.len(), 1);
}

// ---------------------------------------------------------------------------
// Re-check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn recheck_refetches_only_drifting_platforms() {
    let h = harness(config(&[MAPS, DIRECTORY, "reviews"]));
    h.provider.set_snapshot(MAPS, matching_snapshot()).await;
    h.provider
        .set_snapshot(DIRECTORY, snapshot_with_phone("+49 30 99999999"))
        .await;
    h.provider
        .set_snapshot("reviews", snapshot_with_city("Berlin-Mitte"))
        .await;
    let report = completed(h.engine.run_full_audit().await);
    let fetched = h.provider.fetch_count();

    h.provider.set_snapshot(DIRECTORY, matching_snapshot()).await;
    let summary = h.engine.recheck().await;

    assert_eq!(summary.report_id, Some(report.id));
    assert_eq!(h.provider.fetch_count(), fetched + 2);
    let platforms: Vec<_> = summary.results.iter().map(|r| r.platform.as_str()).collect();
    assert_eq!(platforms, [DIRECTORY, "reviews"]);
    assert_eq!(summary.results[0].outcome, RecheckOutcome::Resolved);
    assert_matches!(
        &summary.results[1].outcome,
        RecheckOutcome::StillDrifting { discrepancies } if discrepancies.len() == 1
    );
    assert_eq!(h.engine.history().await.len(), 1);
}

#[tokio::test]
async fn recheck_ignores_non_critical_fields() {
    let mut cfg = config(&[MAPS]);
    cfg.critical_fields = vec![Field::Phone];
    let h = harness(cfg);
    h.provider
        .set_snapshot(MAPS, snapshot_with_city("Berlin-Mitte"))
        .await;
    h.engine.run_full_audit().await;

    let summary = h.engine.recheck().await;
    assert_eq!(summary.results.len(), 1);
    assert_eq!(summary.results[0].outcome, RecheckOutcome::Resolved);
}

#[tokio::test]
async fn recheck_without_report_is_empty() {
    let h = harness(config(&[MAPS]));
    let summary = h.engine.recheck().await;
    assert!(summary.report_id.is_none());
    assert!(summary.results.is_empty());
    assert_eq!(h.provider.fetch_count(), 0);
}

// ---------------------------------------------------------------------------
// Queries and updates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn platform_snapshot_lookup() {
    let h = harness(config(&[MAPS]));
    assert_matches!(
        h.engine.platform_snapshot(MAPS).await,
        Err(CoreError::NotFound { .. })
    );

    h.provider.set_snapshot(MAPS, matching_snapshot()).await;
    h.engine.run_full_audit().await;

    assert_eq!(h.engine.platform_snapshot(MAPS).await.unwrap().score, 100);
    assert_matches!(
        h.engine.platform_snapshot("unknown").await,
        Err(CoreError::NotFound { entity: "platform", .. })
    );
}

#[tokio::test]
async fn master_update_applies_to_next_audit_only() {
    let h = harness(config(&[MAPS]));
    h.provider.set_snapshot(MAPS, matching_snapshot()).await;
    h.engine.run_full_audit().await;

    h.engine
        .update_master_record(MasterIdentityPatch {
            address: Some(AddressPatch {
                city: Some("Potsdam".into()),
                ..Default::default()
            }),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(h.engine.history().await.len(), 1);
    assert_eq!(h.provider.fetch_count(), 1);

    let report = completed(h.engine.run_full_audit().await);
    assert_eq!(report.platforms[0].score, 85);
}

#[tokio::test]
async fn rejected_config_update_changes_nothing() {
    let h = harness(config(&[MAPS]));
    let before = h.engine.get_config().await;

    let result = h
        .engine
        .update_config(AuditConfigurationPatch {
            frequency_hours: Some(0),
            ..Default::default()
        })
        .await;

    assert_matches!(result, Err(CoreError::Validation(_)));
    assert_eq!(h.engine.get_config().await, before);
}

#[tokio::test]
async fn lowered_history_limit_evicts_immediately() {
    let h = harness(config(&[MAPS]));
    h.provider.set_snapshot(MAPS, matching_snapshot()).await;
    for _ in 0..5 {
        h.engine.run_full_audit().await;
    }

    h.engine
        .update_config(AuditConfigurationPatch {
            history_limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(h.engine.history().await.len(), 2);
}

#[test]
fn engine_rejects_invalid_master_record() {
    let mut master = master_record();
    master.email = Some("not-an-email".into());

    let err = napwatch_pipeline::AuditEngine::new(
        master,
        config(&[MAPS]),
        std::sync::Arc::new(napwatch_providers::FixtureProvider::new()),
        std::sync::Arc::new(RecordingSink::default()),
        std::sync::Arc::new(napwatch_core::store::MemoryReportStore::new()),
    )
    .err();
    assert_matches!(err, Some(CoreError::Validation(_)));
}
