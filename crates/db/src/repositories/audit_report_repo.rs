//! Repository for the `audit_reports` table.

use sqlx::PgPool;

use crate::models::audit_report::{AuditReportRow, CreateAuditReport};

/// Column list shared across queries.
const COLUMNS: &str = "id, generated_at, overall_score, total_platforms, \
    consistent_platforms, inconsistent_platforms, failed_platforms, \
    critical_issues, trend_direction, body, created_at";

pub struct AuditReportRepo;

impl AuditReportRepo {
    /// Insert a report. Re-inserting the same id is a no-op.
    pub async fn insert(pool: &PgPool, body: &CreateAuditReport) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO audit_reports (id, generated_at, overall_score, total_platforms,
                 consistent_platforms, inconsistent_platforms, failed_platforms,
                 critical_issues, trend_direction, body)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(body.id)
        .bind(body.generated_at)
        .bind(body.overall_score)
        .bind(body.total_platforms)
        .bind(body.consistent_platforms)
        .bind(body.inconsistent_platforms)
        .bind(body.failed_platforms)
        .bind(body.critical_issues)
        .bind(&body.trend_direction)
        .bind(&body.body)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Most recent reports first.
    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<AuditReportRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_reports
             ORDER BY generated_at DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, AuditReportRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
