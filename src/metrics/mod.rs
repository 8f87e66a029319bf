/*!
 * # Metrics Module
 *
 * Prometheus counters for forecast traffic, exposed in text format at
 * `/metrics`.
 */

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use thiserror::Error;

use crate::forecast::{ForecastObserver, ForecastResult, ItemRequest};

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to export metrics: {0}")]
    ExportError(String),
}

impl From<prometheus::Error> for MetricsError {
    fn from(err: prometheus::Error) -> Self {
        MetricsError::ExportError(err.to_string())
    }
}

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref FORECASTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "consumable_forecasts_total",
            "Total number of item forecasts produced"
        ),
        &["method"]
    )
    .expect("metric can be created");
    pub static ref FORECAST_BATCHES_TOTAL: IntCounter = IntCounter::new(
        "consumable_forecast_batches_total",
        "Total number of forecast batches served"
    )
    .expect("metric can be created");
    pub static ref FORECAST_BATCH_FAILURES: IntCounter = IntCounter::new(
        "consumable_forecast_batch_failures_total",
        "Total number of forecast batches that failed"
    )
    .expect("metric can be created");
}

/// Registers the forecast counters. Safe to call more than once.
pub fn register_metrics() {
    let collectors: [Box<dyn prometheus::core::Collector>; 3] = [
        Box::new(FORECASTS_TOTAL.clone()),
        Box::new(FORECAST_BATCHES_TOTAL.clone()),
        Box::new(FORECAST_BATCH_FAILURES.clone()),
    ];
    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(err) => tracing::warn!("Failed to register metric: {}", err),
        }
    }
}

/// Counts forecasts per method.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObserver;

impl ForecastObserver for MetricsObserver {
    fn on_forecast(&self, _item: &ItemRequest, result: &ForecastResult) {
        FORECASTS_TOTAL
            .with_label_values(&[result.method.as_ref()])
            .inc();
    }
}

/// Renders the registry in Prometheus text format.
pub async fn metrics_handler() -> Result<String, MetricsError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| MetricsError::ExportError(e.to_string()))
}
