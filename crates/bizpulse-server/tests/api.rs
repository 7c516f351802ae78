use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use bizpulse_core::config::{AuthMode, Config};
use bizpulse_core::event::{Business, PaymentMethod};
use bizpulse_duckdb::DuckDbBackend;
use bizpulse_server::app::build_app;
use bizpulse_server::state::AppState;

fn test_config() -> Config {
    Config {
        port: 0,
        data_dir: "/tmp/bizpulse-test".to_string(),
        duckdb_memory_limit: "1GB".to_string(),
        auth_mode: AuthMode::None,
        freshness_seconds: 60,
        poll_seconds: 10,
        default_retention_months: 3,
        cors_origins: vec![],
    }
}

async fn setup() -> (Arc<AppState>, axum::Router) {
    setup_with_config(test_config()).await
}

async fn setup_with_config(config: Config) -> (Arc<AppState>, axum::Router) {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let state = Arc::new(AppState::new(db, config));
    let app = build_app(Arc::clone(&state));
    (state, app)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn health_returns_ok() {
    let (_state, app) = setup().await;

    let response = app.oneshot(get_request("/health")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn collected_visit_shows_up_on_the_dashboard() {
    let (_state, app) = setup().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/collect/visit",
            json!({ "device_id": "dev-1", "user_name": "Asha", "page_path": "/home" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));

    let response = app
        .oneshot(get_request("/api/dashboard"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let data = &body["data"];
    assert_eq!(data["weekday_visits"].as_array().expect("weekday").len(), 7);
    assert_eq!(data["hourly_visits"].as_array().expect("hourly").len(), 24);

    // Today's bucket is the last of the trailing window and carries the visit.
    let today = &data["weekday_visits"][6];
    assert_eq!(today["count"], 1);

    let delivery = &data["delivery"];
    assert_eq!(
        delivery["available"].as_i64().expect("available")
            + delivery["unavailable"].as_i64().expect("unavailable"),
        delivery["total"].as_i64().expect("total")
    );

    let users = data["top_users"].as_array().expect("top_users");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["device_id"], "dev-1");
    assert_eq!(users[0]["total_visits"], 1);
}

#[tokio::test]
async fn visit_with_blank_device_is_rejected() {
    let (_state, app) = setup().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/collect/visit",
            json!({ "device_id": "   ", "page_path": "/home" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn unknown_interaction_type_is_rejected() {
    let (_state, app) = setup().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/collect/interaction",
            json!({ "business_id": "biz_1", "type": "email" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn interactions_rank_businesses_on_the_top_endpoint() {
    let (state, app) = setup().await;

    state
        .db
        .seed_business(&Business {
            id: "biz_cafe".to_string(),
            name: "Corner Cafe".to_string(),
            category_id: None,
            payment_methods: vec![PaymentMethod::Cash],
            delivery_available: true,
        })
        .await
        .expect("seed business");

    for kind in ["view", "view", "call"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/collect/interaction",
                json!({ "business_id": "biz_cafe", "type": kind }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(get_request("/api/businesses/top?limit=5"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let ranks = body["data"].as_array().expect("ranks");
    assert_eq!(ranks.len(), 1);
    assert_eq!(ranks[0]["business_id"], "biz_cafe");
    assert_eq!(ranks[0]["name"], "Corner Cafe");
    assert_eq!(ranks[0]["views"], 2);
    assert_eq!(ranks[0]["calls"], 1);
    assert_eq!(ranks[0]["total"], 3);
}

#[tokio::test]
async fn top_endpoint_rejects_out_of_range_limits() {
    let (_state, app) = setup().await;

    for uri in ["/api/businesses/top?limit=0", "/api/businesses/top?limit=51"] {
        let response = app
            .clone()
            .oneshot(get_request(uri))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn live_serves_a_snapshot_with_heartbeats() {
    let (_state, app) = setup().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/collect/heartbeat",
            json!({ "device_id": "dev-live" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get_request("/api/live")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["live_count"], 1);
    assert!(body["data"]["refreshed_at"].is_string());
}

#[tokio::test]
async fn cleanup_validates_the_window_and_reports_counts() {
    let (_state, app) = setup().await;

    for months in [0, 61] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/maintenance/cleanup",
                json!({ "retention_months": months }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "months={months}");
    }

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/maintenance/cleanup",
            json!({ "retention_months": 3 }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["visits_deleted"], 0);
    assert_eq!(body["data"]["interactions_deleted"], 0);
    assert_eq!(body["data"]["search_logs_deleted"], 0);
}

#[tokio::test]
async fn usage_reports_all_four_tables() {
    let (_state, app) = setup().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/collect/search",
            json!({
                "query": "best chai",
                "succeeded": true,
                "result_count": 4,
                "response_time_ms": 120
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(get_request("/api/maintenance/usage"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["ai_search_logs"], 1);
    assert_eq!(body["data"]["visit_logs"], 0);
    assert_eq!(body["data"]["business_interactions"], 0);
    assert_eq!(body["data"]["unique_users"], 0);
}

#[tokio::test]
async fn export_serves_csv_and_rejects_unknown_tables() {
    let (_state, app) = setup().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/collect/visit",
            json!({ "device_id": "dev-csv", "page_path": "/listing/biz_1" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get_request("/api/export/visit_logs"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("text/csv; charset=utf-8")
    );
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let text = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert!(text.starts_with("id,device_id,user_name,page_path,visited_at"));
    assert!(text.contains("dev-csv"));

    let response = app
        .oneshot(get_request("/api/export/live_users"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn password_mode_gates_console_routes_but_not_collect() {
    let mut config = test_config();
    config.auth_mode = AuthMode::Password("s3cret".to_string());
    let (_state, app) = setup_with_config(config).await;

    let response = app
        .clone()
        .oneshot(get_request("/api/dashboard"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/dashboard")
                .header("authorization", "Bearer wrong")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/dashboard")
                .header("authorization", "Bearer s3cret")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    // Collect stays open: visitor browsers never hold the console token.
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/collect/heartbeat",
            json!({ "device_id": "dev-open" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}
