use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    errors::ServiceError,
    forecast::{ForecastMethod, ForecastResult, ItemRequest},
    metrics::{FORECAST_BATCHES_TOTAL, FORECAST_BATCH_FAILURES},
    AppState,
};

const MISSING_ITEMS: &str = "Invalid request format. Expected \"items\" array.";

/// Batch of items to forecast
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ForecastBatchRequest {
    /// Items to forecast, answered in the same order
    #[serde(default)]
    pub items: Option<Vec<ItemRequest>>,
}

impl ForecastBatchRequest {
    /// Decodes a request body. A missing or non-array `items` is reported
    /// with the same message either way.
    pub fn from_json(body: Value) -> Result<Self, ServiceError> {
        if !body.get("items").map_or(false, Value::is_array) {
            return Err(ServiceError::BadRequest(MISSING_ITEMS.to_string()));
        }
        serde_json::from_value(body)
            .map_err(|e| ServiceError::BadRequest(format!("Invalid item: {}", e)))
    }

    /// Checks the batch shape and every item before anything is forecast.
    pub fn into_items(self, max_items: usize) -> Result<Vec<ItemRequest>, ServiceError> {
        let items = self
            .items
            .ok_or_else(|| ServiceError::BadRequest(MISSING_ITEMS.to_string()))?;

        if items.len() > max_items {
            return Err(ServiceError::PayloadTooLarge(format!(
                "{} items submitted; at most {} are accepted per request",
                items.len(),
                max_items
            )));
        }

        for (index, item) in items.iter().enumerate() {
            item.validate().map_err(|e| {
                ServiceError::ValidationError(format!("items[{}]: {}", index, e))
            })?;
            item.forecast_features.validate().map_err(|e| {
                ServiceError::ValidationError(format!("items[{}].forecast_features: {}", index, e))
            })?;
            for (point_index, point) in item.historical_data.iter().enumerate() {
                point.validate().map_err(|e| {
                    ServiceError::ValidationError(format!(
                        "items[{}].historical_data[{}]: {}",
                        index, point_index, e
                    ))
                })?;
            }
        }

        Ok(items)
    }
}

/// Forecasts for a whole batch
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ForecastBatchResponse {
    pub success: bool,
    pub forecast: Vec<ForecastResult>,
    pub total_items: usize,
    pub method: ForecastMethod,
}

impl ForecastBatchResponse {
    pub fn new(forecast: Vec<ForecastResult>) -> Self {
        Self {
            success: true,
            total_items: forecast.len(),
            forecast,
            method: ForecastMethod::LinearRegression,
        }
    }
}

/// Predict next-quarter usage for a batch of consumables
#[utoipa::path(
    post,
    path = "/predict/consumables/linear",
    request_body = ForecastBatchRequest,
    responses(
        (status = 200, description = "Forecasts generated", body = ForecastBatchResponse,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Malformed or invalid batch", body = crate::errors::ErrorResponse),
        (status = 413, description = "Too many items in one batch", body = crate::errors::ErrorResponse),
        (status = 500, description = "Forecasting failed", body = crate::errors::ErrorResponse)
    ),
    tag = "forecast"
)]
#[instrument(skip_all)]
pub async fn predict_consumables(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ForecastBatchResponse>, ServiceError> {
    let Json(body) = payload?;
    let request = ForecastBatchRequest::from_json(body)?;
    let items = request.into_items(state.config.max_batch_items)?;
    info!("Received forecast request for {} items", items.len());

    let forecaster = state.forecaster.clone();
    // Forecasting is CPU-bound; a panic here fails the whole batch.
    let forecasts = tokio::task::spawn_blocking(move || forecaster.forecast_all(&items))
        .await
        .map_err(|e| {
            FORECAST_BATCH_FAILURES.inc();
            ServiceError::InternalError(format!("forecast task failed: {}", e))
        })?;

    FORECAST_BATCHES_TOTAL.inc();
    info!(
        "Successfully generated forecasts for {} items",
        forecasts.len()
    );

    Ok(Json(ForecastBatchResponse::new(forecasts)))
}
