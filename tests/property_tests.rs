//! Property-based tests for the forecasting core.
//!
//! These tests use proptest to check invariants that must hold for any
//! usage history, not only the hand-picked scenarios in the unit tests.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use consumables_forecast::forecast::{
    FixedClock, ForecastMethod, ForecastSettings, Forecaster, ItemRequest,
};
use proptest::prelude::*;

fn forecaster() -> Forecaster {
    let now = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
    Forecaster::new(ForecastSettings::default()).with_clock(Arc::new(FixedClock(now)))
}

// Strategies for generating test data
fn usage_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), 0.0f64..10_000.0]
}

fn history_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(usage_strategy(), 0..24)
}

fn item_strategy() -> impl Strategy<Value = ItemRequest> {
    (
        any::<i64>(),
        history_strategy(),
        prop::option::of(-100.0f64..1_000.0),
        0.0f64..50_000.0,
    )
        .prop_map(|(id, history, average, stock)| {
            let mut item = ItemRequest::new(id).with_usage(history).with_stock(stock);
            if let Some(average) = average {
                item = item.with_average(average);
            }
            item
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn confidence_stays_within_band(item in item_strategy()) {
        let settings = ForecastSettings::default();
        let result = forecaster().forecast(&item);
        prop_assert!(result.confidence >= settings.min_confidence);
        prop_assert!(result.confidence <= settings.max_confidence);
    }

    #[test]
    fn fallback_results_carry_floor_confidence_and_no_diagnostics(item in item_strategy()) {
        let result = forecaster().forecast(&item);
        if result.method.is_fallback() {
            prop_assert_eq!(result.confidence, ForecastSettings::default().min_confidence);
            prop_assert!(result.r_squared.is_none());
            prop_assert!(result.shortage_date.is_none());
            prop_assert!(result.data_points.is_none());
        } else {
            prop_assert!(result.has_diagnostics());
            prop_assert!(result.data_points.unwrap_or(0) >= 2);
        }
    }

    #[test]
    fn method_follows_positive_observation_count(item in item_strategy()) {
        let positive = item.historical_data.iter().filter(|p| p.usage > 0.0).count();
        let result = forecaster().forecast(&item);
        let expected = match (item.historical_data.is_empty(), positive) {
            (true, _) => ForecastMethod::AverageFallback,
            (false, 0 | 1) => ForecastMethod::Average,
            _ => ForecastMethod::LinearRegression,
        };
        prop_assert_eq!(result.method, expected);
    }

    #[test]
    fn batch_preserves_order_and_length(items in prop::collection::vec(item_strategy(), 0..20)) {
        let results = forecaster().forecast_all(&items);
        prop_assert_eq!(results.len(), items.len());
        for (item, result) in items.iter().zip(&results) {
            prop_assert_eq!(&result.item_id, &item.item_id);
        }
    }

    #[test]
    fn shortage_is_within_horizon_when_present(item in item_strategy()) {
        let result = forecaster().forecast(&item);
        if let Some(label) = result.shortage_date {
            prop_assert!(result.predicted_usage > 0);
            let first_of_month = NaiveDate::parse_from_str(&format!("01 {}", label), "%d %B %Y");
            prop_assert!(first_of_month.is_ok(), "unexpected label {}", label);
            let first_of_month = first_of_month.unwrap();
            prop_assert!(first_of_month >= NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
            prop_assert!(first_of_month <= NaiveDate::from_ymd_opt(2025, 7, 9).unwrap());
        }
    }
}
