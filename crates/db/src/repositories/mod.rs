pub mod audit_report_repo;

pub use audit_report_repo::AuditReportRepo;
