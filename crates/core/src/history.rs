//! Bounded FIFO history of audit reports.
//!
//! The engine wraps a [`ReportHistory`] in a lock; this type only enforces
//! the cap and ordering. Reports are stored as `Arc` so readers can hold
//! them without copying.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::audit_config::DEFAULT_HISTORY_LIMIT;
use crate::report::AuditReport;

#[derive(Debug, Clone)]
pub struct ReportHistory {
    reports: VecDeque<Arc<AuditReport>>,
    limit: usize,
}

impl ReportHistory {
    /// A zero limit is treated as 1.
    pub fn new(limit: usize) -> Self {
        Self {
            reports: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Append a report, evicting the oldest ones past the cap.
    ///
    /// Returns the evicted reports, oldest first.
    pub fn push(&mut self, report: Arc<AuditReport>) -> Vec<Arc<AuditReport>> {
        self.reports.push_back(report);
        self.evict()
    }

    /// Change the cap, evicting immediately if it shrank.
    pub fn set_limit(&mut self, limit: usize) -> Vec<Arc<AuditReport>> {
        self.limit = limit.max(1);
        self.evict()
    }

    fn evict(&mut self) -> Vec<Arc<AuditReport>> {
        let mut evicted = Vec::new();
        while self.reports.len() > self.limit {
            if let Some(old) = self.reports.pop_front() {
                evicted.push(old);
            }
        }
        evicted
    }

    pub fn latest(&self) -> Option<Arc<AuditReport>> {
        self.reports.back().cloned()
    }

    /// The latest report together with the one before it.
    pub fn latest_pair(&self) -> (Option<Arc<AuditReport>>, Option<Arc<AuditReport>>) {
        let mut iter = self.reports.iter().rev();
        let latest = iter.next().cloned();
        let previous = iter.next().cloned();
        (latest, previous)
    }

    /// All retained reports, newest first.
    pub fn newest_first(&self) -> Vec<Arc<AuditReport>> {
        self.reports.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for ReportHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
