//! Shared helpers for pipeline integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use napwatch_core::alert::AlertEvent;
use napwatch_core::audit_config::AuditConfiguration;
use napwatch_core::identity::{Address, MasterIdentityRecord};
use napwatch_core::platform::{FetchFailure, PlatformTarget, RawSnapshot};
use napwatch_core::store::MemoryReportStore;
use napwatch_events::{NotificationSink, SinkError};
use napwatch_pipeline::AuditEngine;
use napwatch_providers::{FixtureProvider, PlatformProvider};

pub const MAPS: &str = "maps";
pub const DIRECTORY: &str = "directory";

pub fn master_record() -> MasterIdentityRecord {
    MasterIdentityRecord {
        name: "Kiez Dental Praxis".into(),
        address: Address {
            street: "Torstrasse 1".into(),
            city: "Berlin".into(),
            region: "Berlin".into(),
            postal_code: "10119".into(),
            country: "DE".into(),
        },
        phone: "+49 30 12345678".into(),
        email: Some("info@kiez-dental.de".into()),
        website: "https://kiez-dental.de".into(),
        coordinates: None,
        updated_at: chrono::Utc::now(),
    }
}

/// A snapshot that matches [`master_record`] on every compared field.
pub fn matching_snapshot() -> RawSnapshot {
    let master = master_record();
    RawSnapshot {
        name: master.name,
        address: master.address,
        phone: "030 12345678".into(),
        email: master.email,
        website: Some("kiez-dental.de/".into()),
        verified: true,
        last_updated: None,
    }
}

pub fn snapshot_with_city(city: &str) -> RawSnapshot {
    let mut snapshot = matching_snapshot();
    snapshot.address.city = city.into();
    snapshot
}

pub fn snapshot_with_phone(phone: &str) -> RawSnapshot {
    let mut snapshot = matching_snapshot();
    snapshot.phone = phone.into();
    snapshot
}

pub fn config(names: &[&str]) -> AuditConfiguration {
    AuditConfiguration::with_platforms(
        names
            .iter()
            .map(|n| PlatformTarget::new(*n, format!("fixture://{n}")))
            .collect(),
    )
}

/// Answers every fetch with [`matching_snapshot`] after a per-target delay,
/// recording the highest number of fetches in flight at once.
#[derive(Default)]
pub struct InFlightProvider {
    delays: Mutex<std::collections::HashMap<String, Duration>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightProvider {
    pub fn with_delay(self, platform: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(platform.to_string(), delay);
        self
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformProvider for InFlightProvider {
    async fn fetch_snapshot(&self, target: &PlatformTarget) -> Result<RawSnapshot, FetchFailure> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .lock()
            .unwrap()
            .get(&target.name)
            .copied()
            .unwrap_or_default();
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(matching_snapshot())
    }
}

/// Collects every emitted alert.
#[derive(Default)]
pub struct RecordingSink {
    alerts: Mutex<Vec<AlertEvent>>,
}

impl RecordingSink {
    pub fn alerts(&self) -> Vec<AlertEvent> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn emit(&self, alert: AlertEvent) -> Result<(), SinkError> {
        self.alerts.lock().unwrap().push(alert);
        Ok(())
    }
}

/// Always fails; alerts must not break an audit.
pub struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    async fn emit(&self, _: AlertEvent) -> Result<(), SinkError> {
        Err(SinkError::Delivery("sink offline".into()))
    }
}

pub struct Harness {
    pub engine: Arc<AuditEngine>,
    pub provider: Arc<FixtureProvider>,
    pub sink: Arc<RecordingSink>,
    pub store: Arc<MemoryReportStore>,
}

pub fn harness(config: AuditConfiguration) -> Harness {
    harness_with_provider(config, FixtureProvider::new())
}

pub fn slow_harness(config: AuditConfiguration, delay: Duration) -> Harness {
    harness_with_provider(config, FixtureProvider::new().with_delay(delay))
}

fn harness_with_provider(config: AuditConfiguration, provider: FixtureProvider) -> Harness {
    let provider = Arc::new(provider);
    let sink = Arc::new(RecordingSink::default());
    let store = Arc::new(MemoryReportStore::new());
    let engine = AuditEngine::new(
        master_record(),
        config,
        provider.clone(),
        sink.clone(),
        store.clone(),
    )
    .expect("valid configuration");
    Harness {
        engine,
        provider,
        sink,
        store,
    }
}
