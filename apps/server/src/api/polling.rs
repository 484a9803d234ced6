use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use saweria_relay_core::PollResult;

use crate::{error::ApiResult, main_lib::AppState, models::CheckQuery};

/// Game-server poll. Confirms `?confirm=<id>` first when given, then serves
/// the oldest undelivered donation.
async fn check_donations(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CheckQuery>, QueryRejection>,
) -> ApiResult<Json<PollResult>> {
    let Query(query) = query?;
    let result = state
        .donation_service
        .poll(query.confirm.as_deref())
        .await?;
    Ok(Json(result))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/roblox-check", get(check_donations))
}
