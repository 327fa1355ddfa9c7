//! Report store seam.
//!
//! The engine hands every finished [`AuditReport`] to a [`ReportStore`].
//! Persistence failures are logged by the caller and never fail an audit.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::audit_config::DEFAULT_HISTORY_LIMIT;
use crate::report::AuditReport;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend failed: {0}")]
    Backend(String),
}

/// Serialize a report with its stable snake_case field names.
pub fn export_report_json(report: &AuditReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn persist(&self, report: &AuditReport) -> Result<(), StoreError>;

    fn export_json(&self, report: &AuditReport) -> Result<String, StoreError> {
        Ok(export_report_json(report)?)
    }
}

/// Keeps the most recent exported reports in memory. Used when no database
/// is configured.
pub struct MemoryReportStore {
    exported: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl Default for MemoryReportStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_LIMIT)
    }
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retain at most `capacity` exports (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            exported: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Retained reports, as JSON, oldest first.
    pub async fn exported(&self) -> Vec<String> {
        self.exported.lock().await.iter().cloned().collect()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn persist(&self, report: &AuditReport) -> Result<(), StoreError> {
        let json = self.export_json(report)?;
        let mut exported = self.exported.lock().await;
        exported.push_back(json);
        while exported.len() > self.capacity {
            exported.pop_front();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_keeps_exports() {
        let store = MemoryReportStore::new();
        let report = AuditReport::test_fixture(77, 1);
        store.persist(&report).await.unwrap();

        let exported = store.exported().await;
        assert_eq!(exported.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&exported[0]).unwrap();
        assert_eq!(value["overall_score"], 77);
        assert_eq!(value["critical_issues"], 1);
    }

    #[tokio::test]
    async fn memory_store_drops_oldest_past_capacity() {
        let store = MemoryReportStore::with_capacity(3);
        for score in 0..5u8 {
            store
                .persist(&AuditReport::test_fixture(score, 0))
                .await
                .unwrap();
        }

        let scores: Vec<u64> = store
            .exported()
            .await
            .iter()
            .map(|json| {
                let value: serde_json::Value = serde_json::from_str(json).unwrap();
                value["overall_score"].as_u64().unwrap()
            })
            .collect();
        assert_eq!(scores, [2, 3, 4]);
    }

    #[tokio::test]
    async fn default_capacity_matches_history_limit() {
        let store = MemoryReportStore::new();
        for _ in 0..DEFAULT_HISTORY_LIMIT + 15 {
            store
                .persist(&AuditReport::test_fixture(90, 0))
                .await
                .unwrap();
        }
        assert_eq!(store.exported().await.len(), DEFAULT_HISTORY_LIMIT);
    }
}
