//! Master identity store.
//!
//! Holds the single canonical record behind an async `RwLock`. Updates
//! validate and merge into a copy which then replaces the record in one
//! write, so readers always observe a complete version.

use napwatch_core::error::CoreError;
use napwatch_core::identity::{MasterIdentityPatch, MasterIdentityRecord};
use tokio::sync::RwLock;

pub struct MasterIdentityStore {
    record: RwLock<MasterIdentityRecord>,
}

impl MasterIdentityStore {
    pub fn new(record: MasterIdentityRecord) -> Self {
        Self {
            record: RwLock::new(record),
        }
    }

    /// A copy of the current record.
    pub async fn get(&self) -> MasterIdentityRecord {
        self.record.read().await.clone()
    }

    /// Merge `patch` into the record and return the new version.
    ///
    /// A rejected patch leaves the stored record untouched. Never triggers
    /// an audit.
    pub async fn update(&self, patch: MasterIdentityPatch) -> Result<MasterIdentityRecord, CoreError> {
        let mut record = self.record.write().await;
        let next = record.apply_patch(patch)?;
        *record = next.clone();
        tracing::info!(name = %next.name, "Master identity record updated");
        Ok(next)
    }
}
