use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

const DEFAULT_DAYS_PER_QUARTER: f64 = 90.0;
const DEFAULT_SHORTAGE_HORIZON_DAYS: f64 = 180.0;
const DEFAULT_MIN_CONFIDENCE: f64 = 0.3;
const DEFAULT_MAX_CONFIDENCE: f64 = 0.95;
const DEFAULT_MIN_REGRESSION_POINTS: usize = 2;

/// Numeric policy applied by the forecaster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ForecastSettings {
    /// Length of the forecast period, used to derive a daily usage rate
    #[serde(default = "default_days_per_quarter")]
    #[validate(range(min = 1.0))]
    pub days_per_quarter: f64,

    /// Stock-outs further away than this are not reported
    #[serde(default = "default_shortage_horizon_days")]
    #[validate(range(min = 1.0))]
    pub shortage_horizon_days: f64,

    /// Confidence floor, also the confidence of every fallback result
    #[serde(default = "default_min_confidence")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_confidence: f64,

    /// Confidence ceiling for regression results
    #[serde(default = "default_max_confidence")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_confidence: f64,

    /// Minimum non-zero observations before a trend line is fitted
    #[serde(default = "default_min_regression_points")]
    #[validate(range(min = 2))]
    pub min_regression_points: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            days_per_quarter: DEFAULT_DAYS_PER_QUARTER,
            shortage_horizon_days: DEFAULT_SHORTAGE_HORIZON_DAYS,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            max_confidence: DEFAULT_MAX_CONFIDENCE,
            min_regression_points: DEFAULT_MIN_REGRESSION_POINTS,
        }
    }
}

impl ForecastSettings {
    /// Maps a goodness-of-fit score onto the configured confidence band.
    pub fn clamp_confidence(&self, score: f64) -> f64 {
        if score.is_nan() {
            return self.min_confidence;
        }
        score.max(self.min_confidence).min(self.max_confidence)
    }

    /// Field checks plus the cross-field ordering of the confidence band.
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.validate()?;

        if self.min_confidence > self.max_confidence {
            let mut errors = ValidationErrors::new();
            let mut err = ValidationError::new("confidence_band");
            err.message = Some("min_confidence must not exceed max_confidence".into());
            errors.add("min_confidence", err);
            return Err(errors);
        }

        Ok(())
    }
}

fn default_days_per_quarter() -> f64 {
    DEFAULT_DAYS_PER_QUARTER
}

fn default_shortage_horizon_days() -> f64 {
    DEFAULT_SHORTAGE_HORIZON_DAYS
}

fn default_min_confidence() -> f64 {
    DEFAULT_MIN_CONFIDENCE
}

fn default_max_confidence() -> f64 {
    DEFAULT_MAX_CONFIDENCE
}

fn default_min_regression_points() -> usize {
    DEFAULT_MIN_REGRESSION_POINTS
}
