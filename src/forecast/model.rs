use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

/// Identity of an inventory item as supplied by the planning caller.
///
/// Upstream systems send either numeric database ids or opaque string
/// codes, so both are accepted and echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ItemId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Numeric(id) => write!(f, "{}", id),
            ItemId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        ItemId::Numeric(id)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId::Text(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        ItemId::Text(id)
    }
}

/// One observed usage period.
///
/// `period` and `timestamp` are carried for the caller's benefit only;
/// forecasting looks at `usage` alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct HistoricalPoint {
    #[serde(default)]
    #[schema(example = "Q1 2025")]
    pub period: Option<String>,
    #[serde(default)]
    #[schema(example = "2025-01-01")]
    pub timestamp: Option<String>,
    /// Quantity consumed during the period. Zero means "not observed".
    #[serde(default)]
    #[validate(range(
        min = 0.0,
        max = 1_000_000_000_000.0,
        message = "usage must be between 0 and 1e12"
    ))]
    #[schema(example = 50)]
    pub usage: f64,
}

impl HistoricalPoint {
    pub fn with_usage(usage: f64) -> Self {
        Self {
            usage,
            ..Default::default()
        }
    }
}

/// Auxiliary hints computed by the caller. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ForecastFeatures {
    /// Average usage per quarter, used when there is too little history to fit.
    #[serde(default)]
    #[validate(range(
        max = 1_000_000_000_000.0,
        message = "avg_usage_per_quarter must not exceed 1e12"
    ))]
    pub avg_usage_per_quarter: Option<f64>,
}

impl ForecastFeatures {
    /// Fallback quantity; absent hints count as zero.
    pub fn fallback_usage(&self) -> f64 {
        self.avg_usage_per_quarter.unwrap_or(0.0)
    }
}

/// A single item to forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ItemRequest {
    pub item_id: ItemId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub historical_data: Vec<HistoricalPoint>,
    #[serde(default)]
    pub forecast_features: ForecastFeatures,
    #[serde(default)]
    #[validate(range(
        min = 0.0,
        max = 1_000_000_000_000.0,
        message = "current_stock must be between 0 and 1e12"
    ))]
    pub current_stock: f64,
}

impl ItemRequest {
    pub fn new(item_id: impl Into<ItemId>) -> Self {
        Self {
            item_id: item_id.into(),
            name: None,
            historical_data: Vec::new(),
            forecast_features: ForecastFeatures::default(),
            current_stock: 0.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends one history point per usage value, in order.
    pub fn with_usage<I>(mut self, usage: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        self.historical_data
            .extend(usage.into_iter().map(HistoricalPoint::with_usage));
        self
    }

    pub fn with_average(mut self, avg_usage_per_quarter: f64) -> Self {
        self.forecast_features.avg_usage_per_quarter = Some(avg_usage_per_quarter);
        self
    }

    pub fn with_stock(mut self, current_stock: f64) -> Self {
        self.current_stock = current_stock;
        self
    }

    /// The supplied name, or `Item <id>` when none was given.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Item {}", self.item_id))
    }
}

/// Which prediction path produced a result.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ForecastMethod {
    /// No history at all; the caller's average hint was used.
    AverageFallback,
    /// Fewer points than a trend line needs; observed usage was averaged.
    Average,
    /// Full least-squares fit.
    LinearRegression,
}

impl ForecastMethod {
    pub fn is_fallback(&self) -> bool {
        !matches!(self, ForecastMethod::LinearRegression)
    }
}

/// Forecast for one item.
///
/// The regression diagnostics (`r_squared`, `slope`, `intercept`,
/// `data_points`) are only populated for [`ForecastMethod::LinearRegression`];
/// use the constructors to keep that pairing intact.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ForecastResult {
    pub item_id: ItemId,
    #[schema(example = "Bond Paper A4")]
    pub name: String,
    #[schema(example = 40)]
    pub predicted_usage: u64,
    /// Month and year of the projected stock-out, e.g. `"March 2026"`.
    #[schema(example = "March 2026")]
    pub shortage_date: Option<String>,
    #[schema(example = 0.95)]
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_squared: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intercept: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_points: Option<usize>,
    pub method: ForecastMethod,
}

impl ForecastResult {
    /// Result of one of the averaging paths.
    pub fn fallback(
        item: &ItemRequest,
        method: ForecastMethod,
        predicted_usage: u64,
        confidence: f64,
        shortage_date: Option<String>,
    ) -> Self {
        debug_assert!(method.is_fallback());
        Self {
            item_id: item.item_id.clone(),
            name: item.display_name(),
            predicted_usage,
            shortage_date,
            confidence,
            r_squared: None,
            slope: None,
            intercept: None,
            data_points: None,
            method,
        }
    }

    /// Result of a full regression fit, diagnostics included.
    pub fn regression(
        item: &ItemRequest,
        predicted_usage: u64,
        confidence: f64,
        shortage_date: Option<String>,
        diagnostics: RegressionDiagnostics,
    ) -> Self {
        Self {
            item_id: item.item_id.clone(),
            name: item.display_name(),
            predicted_usage,
            shortage_date,
            confidence,
            r_squared: Some(diagnostics.r_squared),
            slope: Some(diagnostics.slope),
            intercept: Some(diagnostics.intercept),
            data_points: Some(diagnostics.data_points),
            method: ForecastMethod::LinearRegression,
        }
    }

    pub fn has_diagnostics(&self) -> bool {
        self.r_squared.is_some()
            && self.slope.is_some()
            && self.intercept.is_some()
            && self.data_points.is_some()
    }
}

/// Display-rounded fit statistics attached to regression results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionDiagnostics {
    pub r_squared: f64,
    pub slope: f64,
    pub intercept: f64,
    pub data_points: usize,
}
