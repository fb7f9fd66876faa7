use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use quotebook_core::errors::Error as CoreError;
use quotebook_core::sync::{SyncReport, SyncState};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncStatusResponse {
    #[serde(flatten)]
    state: SyncState,
    running: bool,
    policy: &'static str,
    last_saved_at: Option<DateTime<Utc>>,
}

/// Runs the sync on its own task so a dropped request cannot abort it.
async fn sync_now(State(state): State<Arc<AppState>>) -> ApiResult<Json<SyncReport>> {
    let sync_service = state.sync_service.clone();
    let report = tokio::spawn(async move { sync_service.sync_once().await })
        .await
        .map_err(|e| CoreError::Unexpected(format!("Sync task failed: {}", e)))??;
    Ok(Json(report))
}

async fn get_sync_status(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SyncStatusResponse>> {
    Ok(Json(SyncStatusResponse {
        state: state.sync_service.state(),
        running: state.sync_service.is_running(),
        policy: state.sync_service.policy_name(),
        last_saved_at: state.quote_service.last_saved_at()?,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync", post(sync_now))
        .route("/sync/status", get(get_sync_status))
}
