//! Startup seed: the initial master record and audit configuration.
//!
//! ```json
//! {
//!   "master": { "name": "...", "address": {...}, "phone": "...", "website": "..." },
//!   "config": { "enabled": true, "frequency_hours": 24, "platforms": [...], ... }
//! }
//! ```

use std::path::Path;

use napwatch_core::audit_config::AuditConfiguration;
use napwatch_core::error::CoreError;
use napwatch_core::identity::MasterIdentityRecord;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid seed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] CoreError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Seed {
    pub master: MasterIdentityRecord,
    pub config: AuditConfiguration,
}

impl Seed {
    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        let seed: Seed = serde_json::from_str(raw)?;
        seed.config.validate()?;
        seed.master.ensure_valid()?;
        Ok(seed)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SeedError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_json(&raw)
    }
}
