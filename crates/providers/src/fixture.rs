//! In-memory provider serving canned snapshots.
//!
//! Used by tests and for local runs against a JSON fixture file of the form
//!
//! ```json
//! {
//!   "maps": { "snapshot": { "name": "...", "address": {...}, "phone": "..." } },
//!   "yelp": { "failure": { "reason": "not_found", "message": "no listing" } }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use napwatch_core::platform::{FailureReason, FetchFailure, PlatformTarget, RawSnapshot};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::provider::PlatformProvider;

/// One canned outcome.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureEntry {
    Snapshot(RawSnapshot),
    Failure(FetchFailure),
}

#[derive(Default)]
pub struct FixtureProvider {
    entries: RwLock<HashMap<String, FixtureEntry>>,
    delay: Option<Duration>,
    fetches: AtomicUsize,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before answering each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Load entries keyed by platform name from a JSON file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        let entries: HashMap<String, FixtureEntry> = serde_json::from_slice(&bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(Self {
            entries: RwLock::new(entries),
            ..Default::default()
        })
    }

    pub async fn set_snapshot(&self, platform: impl Into<String>, snapshot: RawSnapshot) {
        self.entries
            .write()
            .await
            .insert(platform.into(), FixtureEntry::Snapshot(snapshot));
    }

    pub async fn set_failure(&self, platform: impl Into<String>, failure: FetchFailure) {
        self.entries
            .write()
            .await
            .insert(platform.into(), FixtureEntry::Failure(failure));
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformProvider for FixtureProvider {
    async fn fetch_snapshot(&self, target: &PlatformTarget) -> Result<RawSnapshot, FetchFailure> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.entries.read().await.get(&target.name) {
            Some(FixtureEntry::Snapshot(snapshot)) => Ok(snapshot.clone()),
            Some(FixtureEntry::Failure(failure)) => Err(failure.clone()),
            None => Err(FetchFailure::new(
                FailureReason::NotFound,
                format!("no fixture for platform '{}'", target.name),
            )),
        }
    }
}
