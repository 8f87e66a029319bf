use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use chrono::{TimeZone, Utc};
use consumables_forecast::{
    config::AppConfig,
    forecast::{FixedClock, Forecaster},
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;

/// Helper harness wrapping the full application router with a pinned clock.
pub struct TestApp {
    router: Router,
    #[allow(dead_code)]
    pub state: AppState,
}

impl TestApp {
    /// Application whose clock reads 2025-01-10T12:00:00Z.
    pub fn new() -> Self {
        Self::with_config(AppConfig::new(
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        ))
    }

    pub fn with_config(mut cfg: AppConfig) -> Self {
        cfg.cors_allow_any_origin = true;
        consumables_forecast::metrics::register_metrics();

        let now = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
        let forecaster =
            Forecaster::new(cfg.forecast.clone()).with_clock(Arc::new(FixedClock(now)));
        let state = AppState::with_forecaster(cfg, forecaster);
        let router = consumables_forecast::app_router(state.clone()).expect("router builds");

        Self { router, state }
    }

    /// Send a request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Body>,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = builder
            .body(body.unwrap_or_else(Body::empty))
            .expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// POST a JSON document to the forecast endpoint.
    pub async fn predict(&self, body: Value) -> axum::response::Response {
        let bytes = serde_json::to_vec(&body).expect("failed to serialize json request body");
        self.request(
            Method::POST,
            "/predict/consumables/linear",
            Some(Body::from(bytes)),
            &[("content-type", "application/json")],
        )
        .await
    }
}

/// Reads a response body as JSON.
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not json")
}
