use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use saweria_relay_core::format_timestamp;

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{ClearResponse, DebugResponse, StatsResponse},
};

/// Everything in both stores.
async fn get_debug(State(state): State<Arc<AppState>>) -> ApiResult<Json<DebugResponse>> {
    let snapshot = state.donation_service.snapshot()?;
    Ok(Json(DebugResponse::from(snapshot)))
}

async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatsResponse>> {
    let stats = state.donation_service.stats()?;
    Ok(Json(StatsResponse {
        stats,
        timestamp: format_timestamp(Utc::now()),
    }))
}

async fn clear_all(State(state): State<Arc<AppState>>) -> ApiResult<Json<ClearResponse>> {
    let summary = state.donation_service.clear().await?;
    Ok(Json(ClearResponse::from(summary)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/debug", get(get_debug))
        .route("/stats", get(get_stats))
        .route("/clear", post(clear_all))
}
