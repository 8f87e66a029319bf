//! Consumables Forecast Library
//!
//! Next-quarter usage forecasting for office consumables, served over HTTP
//! and usable in-process through [`forecast::Forecaster`].
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod errors;
pub mod forecast;
pub mod handlers;
pub mod metrics;
pub mod middleware_helpers;
pub mod openapi;
pub mod tracing;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use http::HeaderValue;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

use crate::forecast::{Forecaster, TracingObserver};
use crate::metrics::MetricsObserver;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub forecaster: Arc<Forecaster>,
}

impl AppState {
    /// Builds state with the logging and metrics observers attached.
    pub fn new(config: config::AppConfig) -> Self {
        let forecaster = Forecaster::new(config.forecast.clone())
            .with_observer(Arc::new(TracingObserver))
            .with_observer(Arc::new(MetricsObserver));
        Self::with_forecaster(config, forecaster)
    }

    pub fn with_forecaster(config: config::AppConfig, forecaster: Forecaster) -> Self {
        Self {
            config,
            forecaster: Arc::new(forecaster),
        }
    }
}

/// Errors raised while assembling the HTTP application
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true")]
    MissingCorsConfiguration,
}

/// Build CORS layer from config
pub fn build_cors_layer(cfg: &config::AppConfig) -> Result<CorsLayer, StartupError> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any))
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        Ok(CorsLayer::permissive())
    } else {
        ::tracing::error!("Missing CORS configuration detected; set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true");
        Err(StartupError::MissingCorsConfiguration)
    }
}

/// Forecast and health routes without any middleware.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/predict/consumables/linear",
            post(handlers::forecast::predict_consumables),
        )
        .route("/health", get(handlers::health::health_check))
}

/// Full application: routes, metrics, Swagger UI and the middleware stack.
pub fn app_router(state: AppState) -> Result<Router, StartupError> {
    let cors_layer = build_cors_layer(&state.config)?;

    Ok(Router::<AppState>::new()
        .merge(api_routes())
        .route(
            "/metrics",
            get(|| async move {
                match metrics::metrics_handler().await {
                    Ok(body) => (StatusCode::OK, body),
                    Err(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        String::from("metrics error"),
                    ),
                }
            }),
        )
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state))
}

pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::errors::*;
    pub use crate::forecast::*;
    pub use crate::AppState;
}
