pub mod audit_report;
