use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use saweria_relay_server::{
    api::app_router,
    build_state,
    config::{Config, StorageBackend},
};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

async fn sqlite_router() -> (Router, TempDir) {
    let tmp = tempdir().unwrap();
    let config = Config {
        storage: StorageBackend::Sqlite,
        db_path: tmp.path().join("donations.db").to_string_lossy().into_owned(),
        ..Config::default()
    };
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), tmp)
}

async fn memory_router(capacity: usize) -> Router {
    let config = Config {
        storage: StorageBackend::Memory,
        queue_capacity: capacity,
        ..Config::default()
    };
    let state = build_state(&config).await.unwrap();
    app_router(state, &config)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(raw) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(raw.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post_donation(app: &Router, payload: Value) -> Value {
    let (status, body) = send(app, Method::POST, "/saweria", Some(&payload.to_string())).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    body
}

#[tokio::test]
async fn donation_flows_from_webhook_to_game_server() {
    let (app, _tmp) = sqlite_router().await;

    let receipt = post_donation(
        &app,
        json!({"donatur_name": "Budi", "amount_raw": "5000", "message": "Semangat!"}),
    )
    .await;
    assert_eq!(receipt["success"], true);
    assert_eq!(receipt["queue_size"], 1);
    let id = receipt["donation_id"].as_str().unwrap().to_string();

    let (status, poll) = send(&app, Method::GET, "/roblox-check", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(poll["donation"]["id"], id.as_str());
    assert_eq!(poll["donation"]["username"], "Budi");
    assert_eq!(poll["donation"]["amount"], 5000);
    assert_eq!(poll["donation"]["message"], "Semangat!");
    assert_eq!(poll["queue_size"], 1);
    assert_eq!(poll["top_spenders"][0]["total_amount"], 5000);

    // Polling again without confirming serves the same donation.
    let (_, again) = send(&app, Method::GET, "/roblox-check", None).await;
    assert_eq!(again["donation"]["id"], id.as_str());

    let uri = format!("/roblox-check?confirm={id}");
    let (status, confirmed) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(confirmed["donation"].is_null());
    assert_eq!(confirmed["queue_size"], 0);
    assert_eq!(confirmed["top_spenders"][0]["username"], "Budi");
}

#[tokio::test]
async fn donations_are_served_in_arrival_order() {
    let (app, _tmp) = sqlite_router().await;
    let first = post_donation(&app, json!({"name": "A", "amount": 10})).await;
    post_donation(&app, json!({"name": "B", "amount": "20"})).await;

    let (_, poll) = send(&app, Method::GET, "/roblox-check", None).await;
    assert_eq!(poll["donation"]["username"], "A");
    assert_eq!(poll["queue_size"], 2);

    let uri = format!(
        "/roblox-check?confirm={}",
        first["donation_id"].as_str().unwrap()
    );
    let (_, next) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(next["donation"]["username"], "B");
    assert_eq!(next["donation"]["amount"], 20);
    assert_eq!(next["queue_size"], 1);
}

#[tokio::test]
async fn unknown_confirm_id_is_ignored() {
    let (app, _tmp) = sqlite_router().await;
    post_donation(&app, json!({"username": "Sari", "amount": 1})).await;

    let (status, poll) = send(&app, Method::GET, "/roblox-check?confirm=nope", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(poll["donation"]["username"], "Sari");
    assert_eq!(poll["queue_size"], 1);
}

#[tokio::test]
async fn missing_fields_default_to_anonymous() {
    let (app, _tmp) = sqlite_router().await;
    post_donation(&app, json!({})).await;

    let (_, poll) = send(&app, Method::GET, "/roblox-check", None).await;
    assert_eq!(poll["donation"]["username"], "Anonymous");
    assert_eq!(poll["donation"]["amount"], 0);
    assert_eq!(poll["donation"]["message"], "");
}

#[tokio::test]
async fn malformed_bodies_are_rejected_with_json_errors() {
    let (app, _tmp) = sqlite_router().await;

    let (status, body) = send(&app, Method::POST, "/saweria", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::POST, "/saweria", Some("[1, 2, 3]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (_, debug) = send(&app, Method::GET, "/debug", None).await;
    assert_eq!(debug["total_donations"], 0);
}

#[tokio::test]
async fn unknown_routes_return_json_404() {
    let (app, _tmp) = sqlite_router().await;
    let (status, body) = send(&app, Method::GET, "/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
    assert_eq!(body["path"], "/does-not-exist");
}

#[tokio::test]
async fn wrong_method_on_known_route_returns_json_404() {
    let app = memory_router(20).await;

    let (status, body) = send(&app, Method::GET, "/saweria", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
    assert_eq!(body["path"], "/saweria");

    let (status, body) = send(&app, Method::GET, "/clear", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["path"], "/clear");
}

#[tokio::test]
async fn repeated_confirm_parameter_is_a_json_400() {
    let app = memory_router(20).await;
    let (status, body) = send(&app, Method::GET, "/roblox-check?confirm=a&confirm=b", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body["error"].as_str().unwrap().contains("confirm"));
}

#[tokio::test]
async fn oversized_webhook_body_is_a_json_413() {
    let app = memory_router(20).await;
    let huge = format!("{{\"message\": \"{}\"}}", "x".repeat(3 * 1024 * 1024));

    let (status, body) = send(&app, Method::POST, "/saweria", Some(&huge)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], 413);
    assert!(body["error"].is_string());

    let (_, debug) = send(&app, Method::GET, "/debug", None).await;
    assert_eq!(debug["total_donations"], 0);
}

#[tokio::test]
async fn status_endpoint_reports_backend_and_queue() {
    let (app, _tmp) = sqlite_router().await;
    post_donation(&app, json!({"name": "A", "amount": 1})).await;

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "sqlite");
    assert!(body["database"].as_str().unwrap().ends_with("donations.db"));
    assert_eq!(body["queue_size"], 1);
    assert!(body["endpoints"].as_array().unwrap().len() >= 5);
}

#[tokio::test]
async fn stats_and_clear() {
    let (app, _tmp) = sqlite_router().await;
    let first = post_donation(&app, json!({"name": "Budi", "amount": 5000})).await;
    post_donation(&app, json!({"name": "Budi", "amount": 2500})).await;
    post_donation(&app, json!({"name": "Sari", "amount": 1000})).await;
    let uri = format!(
        "/roblox-check?confirm={}",
        first["donation_id"].as_str().unwrap()
    );
    send(&app, Method::GET, &uri, None).await;

    let (status, stats) = send(&app, Method::GET, "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_donations"], 3);
    assert_eq!(stats["delivered"], 1);
    assert_eq!(stats["undelivered"], 2);
    assert_eq!(stats["lifetime_amount"], 8500);
    assert_eq!(stats["unique_donors"], 2);
    assert_eq!(stats["top_spender"]["username"], "Budi");
    assert!(stats["timestamp"].is_string());

    let (_, debug) = send(&app, Method::GET, "/debug", None).await;
    assert_eq!(debug["donations"].as_array().unwrap().len(), 3);
    assert_eq!(debug["top_spenders"].as_array().unwrap().len(), 2);

    let (status, cleared) = send(&app, Method::POST, "/clear", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["success"], true);
    assert_eq!(cleared["donations_removed"], 3);
    assert_eq!(cleared["top_spenders_removed"], 2);

    let (_, poll) = send(&app, Method::GET, "/roblox-check", None).await;
    assert!(poll["donation"].is_null());
    assert!(poll["top_spenders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn memory_backend_evicts_oldest_past_capacity() {
    let app = memory_router(20).await;
    for i in 0..25 {
        post_donation(&app, json!({"name": format!("donor{i}"), "amount": 1})).await;
    }

    let (_, debug) = send(&app, Method::GET, "/debug", None).await;
    assert_eq!(debug["total_donations"], 20);

    let (_, poll) = send(&app, Method::GET, "/roblox-check", None).await;
    assert_eq!(poll["donation"]["username"], "donor5");
    assert_eq!(poll["queue_size"], 20);
    // Leaderboard keeps every donor even after eviction.
    let (_, stats) = send(&app, Method::GET, "/stats", None).await;
    assert_eq!(stats["unique_donors"], 25);

    let (_, status) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status["storage"], "memory");
    assert!(status.get("database").is_none());
}
