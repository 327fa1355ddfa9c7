use std::sync::Arc;

use napwatch_pipeline::{AuditEngine, Scheduler};

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AuditEngine>,
    pub scheduler: Arc<Scheduler>,
    /// Present only when `DATABASE_URL` is configured.
    pub pool: Option<napwatch_db::DbPool>,
    pub config: Arc<ServerConfig>,
}
