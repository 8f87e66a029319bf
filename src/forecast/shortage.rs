use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::settings::ForecastSettings;

const LABEL_FORMAT: &str = "%B %Y";

/// Projects the date on which `current_stock` runs out if `predicted_usage`
/// is consumed evenly over one quarter.
///
/// Returns `None` when nothing is consumed, nothing is in stock, or the
/// stock lasts at least the configured horizon.
pub fn project_shortage(
    predicted_usage: u64,
    current_stock: f64,
    now: DateTime<Utc>,
    settings: &ForecastSettings,
) -> Option<NaiveDate> {
    if predicted_usage == 0 || !(current_stock > 0.0) {
        return None;
    }

    let daily_rate = predicted_usage as f64 / settings.days_per_quarter;
    if !(daily_rate > 0.0) {
        return None;
    }

    let days_until_shortage = current_stock / daily_rate;
    if !(days_until_shortage < settings.shortage_horizon_days) {
        return None;
    }

    let whole_days = Duration::try_days(days_until_shortage.floor() as i64)?;
    now.checked_add_signed(whole_days).map(|at| at.date_naive())
}

/// Month/year label reported to callers, e.g. `"March 2026"`.
pub fn shortage_label(date: NaiveDate) -> String {
    date.format(LABEL_FORMAT).to_string()
}
