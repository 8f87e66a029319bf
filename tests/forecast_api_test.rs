mod common;

use axum::{body::Body, http::Method, http::StatusCode};
use common::{response_json, TestApp};
use consumables_forecast::config::AppConfig;
use serde_json::json;

#[tokio::test]
async fn forecasts_a_mixed_batch_in_order() {
    let app = TestApp::new();

    let response = app
        .predict(json!({
            "items": [
                {
                    "item_id": 1,
                    "name": "Bond Paper A4",
                    "historical_data": [
                        { "period": "Q1 2024", "usage": 60 },
                        { "period": "Q2 2024", "usage": 70 },
                        { "period": "Q3 2024", "usage": 80 }
                    ],
                    "current_stock": 90
                },
                {
                    "item_id": "TONER-K",
                    "historical_data": [{ "period": "Q3 2024", "usage": 7 }],
                    "current_stock": 100
                },
                {
                    "item_id": 3,
                    "forecast_features": { "avg_usage_per_quarter": 41.6 },
                    "current_stock": 10
                }
            ]
        }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["total_items"], 3);
    assert_eq!(body["method"], "linear_regression");

    let forecast = body["forecast"].as_array().unwrap();
    assert_eq!(forecast.len(), 3);

    let paper = &forecast[0];
    assert_eq!(paper["item_id"], 1);
    assert_eq!(paper["name"], "Bond Paper A4");
    assert_eq!(paper["predicted_usage"], 90);
    assert_eq!(paper["confidence"], 0.95);
    assert_eq!(paper["r_squared"], 1.0);
    assert_eq!(paper["slope"], 10.0);
    assert_eq!(paper["intercept"], 60.0);
    assert_eq!(paper["data_points"], 3);
    assert_eq!(paper["shortage_date"], "April 2025");
    assert_eq!(paper["method"], "linear_regression");

    let toner = &forecast[1];
    assert_eq!(toner["item_id"], "TONER-K");
    assert_eq!(toner["name"], "Item TONER-K");
    assert_eq!(toner["predicted_usage"], 7);
    assert_eq!(toner["confidence"], 0.3);
    assert_eq!(toner["method"], "average");
    assert!(toner["shortage_date"].is_null());
    assert!(toner.get("r_squared").is_none());

    let hinted = &forecast[2];
    assert_eq!(hinted["predicted_usage"], 42);
    assert_eq!(hinted["method"], "average_fallback");
    assert!(hinted["shortage_date"].is_null());
    assert!(hinted.get("slope").is_none());
}

#[tokio::test]
async fn empty_batch_succeeds() {
    let app = TestApp::new();

    let response = app.predict(json!({ "items": [] })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["total_items"], 0);
    assert_eq!(body["forecast"], json!([]));
}

#[tokio::test]
async fn missing_items_returns_error_envelope() {
    let app = TestApp::new();

    let response = app.predict(json!({ "products": [] })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Invalid request format. Expected \"items\" array."
    );
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn non_array_items_returns_same_message() {
    let app = TestApp::new();

    let response = app.predict(json!({ "items": { "item_id": 1 } })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(
        body["error"],
        "Invalid request format. Expected \"items\" array."
    );
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new();

    let response = app
        .request(
            Method::POST,
            "/predict/consumables/linear",
            Some(Body::from("{\"items\": [")),
            &[("content-type", "application/json")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid request");
}

#[tokio::test]
async fn negative_stock_fails_validation() {
    let app = TestApp::new();

    let response = app
        .predict(json!({
            "items": [{ "item_id": 1, "current_stock": -5 }]
        }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Validation failed");
    assert!(body["error"].as_str().unwrap().starts_with("items[0]"));
}

#[tokio::test]
async fn oversized_batch_is_rejected() {
    let mut cfg = AppConfig::new("127.0.0.1".into(), 18_080, "test".into());
    cfg.max_batch_items = 2;
    let app = TestApp::with_config(cfg);

    let items: Vec<_> = (0..3).map(|i| json!({ "item_id": i })).collect();
    let response = app.predict(json!({ "items": items })).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Too many items");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::new();

    let response = app
        .request(Method::GET, "/health", None, &[("x-request-id", "planner-42")])
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "planner-42");
}

#[tokio::test]
async fn health_reports_service_details() {
    let app = TestApp::new();

    let response = app.request(Method::GET, "/health", None, &[]).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(
        body["endpoints"]["predict_consumables"],
        "/predict/consumables/linear"
    );
}

#[tokio::test]
async fn metrics_count_served_forecasts() {
    let app = TestApp::new();

    let response = app
        .predict(json!({ "items": [{ "item_id": 1, "historical_data": [{ "usage": 3 }, { "usage": 5 }] }] }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/metrics", None, &[]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("consumable_forecast_batches_total"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new();

    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None, &[])
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["paths"]["/predict/consumables/linear"].is_object());
}
