//! Postgres-backed [`ReportStore`].

use async_trait::async_trait;
use napwatch_core::report::AuditReport;
use napwatch_core::store::{ReportStore, StoreError};

use crate::models::audit_report::CreateAuditReport;
use crate::repositories::AuditReportRepo;
use crate::DbPool;

pub struct PgReportStore {
    pool: DbPool,
}

impl PgReportStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Up to `limit` most recent reports, oldest first.
    ///
    /// Rows whose body no longer decodes are skipped with a warning.
    pub async fn load_recent(&self, limit: usize) -> Result<Vec<AuditReport>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = AuditReportRepo::list_recent(&self.pool, limit)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut reports: Vec<AuditReport> = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                row.into_report()
                    .inspect_err(|e| {
                        tracing::warn!(report_id = %id, error = %e, "Skipping undecodable report")
                    })
                    .ok()
            })
            .collect();
        reports.reverse();
        Ok(reports)
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn persist(&self, report: &AuditReport) -> Result<(), StoreError> {
        let row = CreateAuditReport::from_report(report)?;
        AuditReportRepo::insert(&self.pool, &row)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tracing::debug!(report_id = %report.id, "Audit report persisted");
        Ok(())
    }
}
