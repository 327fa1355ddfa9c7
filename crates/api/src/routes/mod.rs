//! Route definitions.
//!
//! ```text
//! /health                          service health (root level)
//!
//! /api/v1/reports                  history, newest first (GET)
//! /api/v1/reports/latest           latest report (GET)
//! /api/v1/reports/latest/export    latest report as a JSON download (GET)
//! /api/v1/audits                   run a full audit (POST)
//! /api/v1/platforms/{name}         latest result for one platform (GET)
//! /api/v1/master                   master record (GET, PUT)
//! /api/v1/config                   audit configuration (GET, PUT)
//! /api/v1/scheduler                scheduler and engine state (GET)
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{reports, settings};
use crate::state::AppState;

pub mod health;

/// All `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(reports::list_reports))
        .route("/reports/latest", get(reports::latest_report))
        .route("/reports/latest/export", get(reports::export_latest))
        .route("/audits", post(reports::run_audit))
        .route("/platforms/{name}", get(reports::platform_snapshot))
        .route("/master", get(settings::get_master).put(settings::update_master))
        .route("/config", get(settings::get_config).put(settings::update_config))
        .route("/scheduler", get(settings::scheduler_status))
}
