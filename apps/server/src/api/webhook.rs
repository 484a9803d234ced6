use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::warn;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::IngestResponse,
};

/// Accepts a Saweria webhook. The body is read raw so that any JSON shape
/// reaches the alias mapper and parse failures stay JSON-formatted 400s.
async fn receive_donation(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<IngestResponse>> {
    let body = body?;
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected webhook body: {}", e);
        ApiError::BadRequest(format!("Invalid JSON payload: {e}"))
    })?;

    let receipt = state.donation_service.ingest(&payload).await?;
    Ok(Json(IngestResponse {
        success: true,
        donation_id: receipt.donation_id,
        queue_size: receipt.queue_size,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/saweria", post(receive_donation))
}
