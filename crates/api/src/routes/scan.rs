use axum::extract::State;
use axum::{routing::post, Json, Router};

use crate::background::{scan_and_update, ScanSummary};
use crate::error::AppResult;
use crate::state::AppState;

/// POST /api/scan -- run a supervisor scan now instead of waiting for
/// the periodic one. Icon generation is triggered for anything stale.
async fn trigger_scan(State(state): State<AppState>) -> AppResult<Json<ScanSummary>> {
    let summary = scan_and_update(&state, true).await?;
    Ok(Json(summary))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/scan", post(trigger_scan))
}
