use super::model::HistoricalPoint;

/// Usage observations retained for fitting.
///
/// Zero-usage periods are treated as missing rather than observed zeros, so
/// they are dropped and the remaining points are re-indexed `0..n` in the
/// order they were observed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageSeries {
    periods: Vec<f64>,
    values: Vec<f64>,
}

impl UsageSeries {
    pub fn extract(history: &[HistoricalPoint]) -> Self {
        let values: Vec<f64> = history
            .iter()
            .map(|point| point.usage)
            .filter(|usage| *usage > 0.0)
            .collect();
        let periods = (0..values.len()).map(|rank| rank as f64).collect();

        Self { periods, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn periods(&self) -> &[f64] {
        &self.periods
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Index of the period following the last retained observation.
    pub fn next_period(&self) -> f64 {
        self.periods.len() as f64
    }

    pub fn mean(&self) -> Option<f64> {
        mean(&self.values)
    }
}

/// Ordinary least-squares fit of `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    /// Fits a line through paired observations using the closed-form
    /// estimators. Extra values in the longer slice are ignored.
    ///
    /// Degenerate inputs never fail: fewer than two points or a zero spread
    /// in `x` give a flat line through the mean, and a zero spread in `y`
    /// gives an r-squared of 0.
    pub fn fit(x: &[f64], y: &[f64]) -> Self {
        let n = x.len().min(y.len());
        let (x, y) = (&x[..n], &y[..n]);

        let flat = |intercept: f64| Self {
            slope: 0.0,
            intercept,
            r_squared: 0.0,
        };

        if n < 2 {
            return flat(mean(y).unwrap_or(0.0));
        }

        let x_mean = mean(x).unwrap_or(0.0);
        let y_mean = mean(y).unwrap_or(0.0);

        let (numerator, denominator) = x.iter().zip(y).fold((0.0, 0.0), |(num, den), (xi, yi)| {
            let dx = xi - x_mean;
            (num + dx * (yi - y_mean), den + dx * dx)
        });

        if denominator == 0.0 {
            return flat(y_mean);
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;

        let ss_residual: f64 = x
            .iter()
            .zip(y)
            .map(|(xi, yi)| (yi - (slope * xi + intercept)).powi(2))
            .sum();
        let ss_total: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();

        let r_squared = if ss_total > 0.0 {
            1.0 - ss_residual / ss_total
        } else {
            0.0
        };

        Self {
            slope,
            intercept,
            r_squared,
        }
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
