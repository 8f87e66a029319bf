use tracing::{info, warn};

use super::model::{ForecastResult, ItemRequest};

/// Hook invoked once for every forecast a [`Forecaster`](super::Forecaster)
/// produces.
pub trait ForecastObserver: Send + Sync {
    fn on_forecast(&self, item: &ItemRequest, result: &ForecastResult);
}

/// Logs each forecast; degraded results are logged at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ForecastObserver for TracingObserver {
    fn on_forecast(&self, item: &ItemRequest, result: &ForecastResult) {
        if result.method.is_fallback() {
            warn!(
                item_id = %result.item_id,
                method = %result.method,
                history_len = item.historical_data.len(),
                predicted_usage = result.predicted_usage,
                "Insufficient usage history, using fallback forecast"
            );
        } else {
            info!(
                item_id = %result.item_id,
                data_points = result.data_points.unwrap_or_default(),
                predicted_usage = result.predicted_usage,
                confidence = result.confidence,
                "Forecast for {}: {} units (confidence: {:.2})",
                result.name,
                result.predicted_usage,
                result.confidence
            );
        }
    }
}
