//! Domain model and pure audit logic for napwatch.
//!
//! Everything in this crate is free of I/O: the analyzer, scoring,
//! recommendation ranking, trend and alert evaluation all operate on plain
//! values so they can be exercised directly in unit tests. The only async
//! surface is the [`store::ReportStore`] seam.

pub mod alert;
pub mod analyzer;
pub mod audit_config;
pub mod discrepancy;
pub mod error;
pub mod history;
pub mod identity;
pub mod normalize;
pub mod platform;
pub mod policy;
pub mod recommendation;
pub mod report;
pub mod scoring;
pub mod store;
pub mod trend;
pub mod types;
