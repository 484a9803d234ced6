use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use saweria_relay_core::format_timestamp;

use crate::{error::ApiResult, main_lib::AppState, models::StatusResponse};

const ENDPOINTS: [&str; 6] = [
    "GET /",
    "POST /saweria",
    "GET /roblox-check?confirm=<id>",
    "GET /debug",
    "GET /stats",
    "POST /clear",
];

/// Service status with queue counters.
async fn get_status(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatusResponse>> {
    let service = &state.donation_service;
    let stats = service.stats()?;
    let now = Utc::now();

    Ok(Json(StatusResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        storage: service.backend_name(),
        database: state.db_path.clone(),
        queue_size: stats.undelivered,
        total_donations: stats.total_donations,
        uptime_seconds: (now - state.started_at).num_seconds(),
        timestamp: format_timestamp(now),
        endpoints: ENDPOINTS.to_vec(),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_status))
}
