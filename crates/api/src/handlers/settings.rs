//! Handlers for the master record, audit configuration and scheduler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use napwatch_core::audit_config::AuditConfigurationPatch;
use napwatch_core::identity::MasterIdentityPatch;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/master
pub async fn get_master(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: state.engine.master_record().await,
    }))
}

/// PUT /api/v1/master -- merge a partial update. Does not start an audit.
pub async fn update_master(
    State(state): State<AppState>,
    Json(patch): Json<MasterIdentityPatch>,
) -> AppResult<impl IntoResponse> {
    let record = state.engine.update_master_record(patch).await?;
    Ok(Json(DataResponse { data: record }))
}

/// GET /api/v1/config
pub async fn get_config(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: state.engine.get_config().await,
    }))
}

/// PUT /api/v1/config -- validate, apply, and restart the scheduler.
pub async fn update_config(
    State(state): State<AppState>,
    Json(patch): Json<AuditConfigurationPatch>,
) -> AppResult<impl IntoResponse> {
    let config = state.engine.update_config(patch).await?;
    state.scheduler.restart().await;
    Ok(Json(DataResponse { data: config }))
}

/// GET /api/v1/scheduler
pub async fn scheduler_status(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: state.scheduler.status().await,
    }))
}
