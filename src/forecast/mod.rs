/*!
 * # Usage Forecasting
 *
 * Predicts next-quarter consumable usage for each inventory item from its
 * usage history.
 *
 * Per item the forecaster:
 *
 * 1. drops zero-usage periods and re-indexes the remaining observations,
 * 2. falls back to averaging when the history is empty or too short,
 * 3. otherwise fits a least-squares trend line and predicts the next period,
 * 4. derives a confidence score from the fit's r-squared,
 * 5. projects a stock-out month when the current stock will not last the
 *    shortage horizon.
 *
 * Forecasting is pure: the only outside input is the current moment, which
 * comes from an injectable [`Clock`].
 */

mod clock;
mod model;
mod observer;
mod regression;
mod settings;
mod shortage;

use std::sync::Arc;

use chrono::{DateTime, Utc};

pub use clock::{Clock, FixedClock, SystemClock};
pub use model::{
    ForecastFeatures, ForecastMethod, ForecastResult, HistoricalPoint, ItemId, ItemRequest,
    RegressionDiagnostics,
};
pub use observer::{ForecastObserver, TracingObserver};
pub use regression::{LinearFit, UsageSeries};
pub use settings::ForecastSettings;
pub use shortage::{project_shortage, shortage_label};

/// Decimal places kept on confidence and fit diagnostics in results
const DISPLAY_PRECISION: i32 = 3;

/// Per-item usage forecaster.
#[derive(Clone)]
pub struct Forecaster {
    settings: ForecastSettings,
    clock: Arc<dyn Clock>,
    observers: Vec<Arc<dyn ForecastObserver>>,
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::new(ForecastSettings::default())
    }
}

impl std::fmt::Debug for Forecaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forecaster")
            .field("settings", &self.settings)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Forecaster {
    pub fn new(settings: ForecastSettings) -> Self {
        Self {
            settings,
            clock: Arc::new(SystemClock),
            observers: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ForecastObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    /// Forecasts a single item.
    pub fn forecast(&self, item: &ItemRequest) -> ForecastResult {
        let result = forecast_at(item, &self.settings, self.clock.now());
        for observer in &self.observers {
            observer.on_forecast(item, &result);
        }
        result
    }

    /// Forecasts every item, returning results in input order.
    pub fn forecast_all(&self, items: &[ItemRequest]) -> Vec<ForecastResult> {
        items.iter().map(|item| self.forecast(item)).collect()
    }
}

/// Forecasts one item with the default settings and the system clock.
pub fn forecast(item: &ItemRequest) -> ForecastResult {
    Forecaster::default().forecast(item)
}

/// Forecasts a batch with the default settings and the system clock.
pub fn forecast_all(items: &[ItemRequest]) -> Vec<ForecastResult> {
    Forecaster::default().forecast_all(items)
}

fn forecast_at(
    item: &ItemRequest,
    settings: &ForecastSettings,
    now: DateTime<Utc>,
) -> ForecastResult {
    if item.historical_data.is_empty() {
        let predicted_usage = round_usage(item.forecast_features.fallback_usage());
        return ForecastResult::fallback(
            item,
            ForecastMethod::AverageFallback,
            predicted_usage,
            settings.min_confidence,
            None,
        );
    }

    let series = UsageSeries::extract(&item.historical_data);

    if series.len() < settings.min_regression_points {
        let average = series
            .mean()
            .unwrap_or_else(|| item.forecast_features.fallback_usage());
        let predicted_usage = round_usage(average);
        return ForecastResult::fallback(
            item,
            ForecastMethod::Average,
            predicted_usage,
            settings.min_confidence,
            None,
        );
    }

    let fit = LinearFit::fit(series.periods(), series.values());
    let predicted_usage = round_usage(fit.predict(series.next_period()));
    let confidence = settings.clamp_confidence(fit.r_squared.abs());
    // Only a fitted trend is trusted to project a stock-out.
    let shortage_date =
        project_shortage(predicted_usage, item.current_stock, now, settings).map(shortage_label);

    ForecastResult::regression(
        item,
        predicted_usage,
        round_to(confidence, DISPLAY_PRECISION),
        shortage_date,
        RegressionDiagnostics {
            r_squared: round_to(fit.r_squared, DISPLAY_PRECISION),
            slope: round_to(fit.slope, DISPLAY_PRECISION),
            intercept: round_to(fit.intercept, DISPLAY_PRECISION),
            data_points: series.len(),
        },
    )
}

/// Rounds a predicted quantity to a whole, non-negative unit count.
///
/// Halves round to even. Non-finite and negative predictions become 0, and
/// predictions beyond `u64::MAX` saturate there. The HTTP boundary caps
/// quantities well below that.
fn round_usage(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round_ties_even() as u64
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let rounded = (value * factor).round_ties_even() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}
