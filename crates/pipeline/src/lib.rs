//! Audit orchestration: the master identity store, the audit engine, and
//! the scheduler driving it.

pub mod engine;
pub mod master;
pub mod scheduler;

pub use engine::{AuditEngine, AuditOutcome, EngineState, RecheckOutcome, RecheckSummary};
pub use master::MasterIdentityStore;
pub use scheduler::{Scheduler, SchedulerStatus};
