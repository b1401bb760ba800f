//! Forecast accuracy metrics.

use crate::domain::ForecastMetrics;
use crate::error::{ForecastError, Result};

/// Mean absolute error and root mean squared error of `forecast` against `actual`.
pub fn evaluate_forecast(actual: &[f64], forecast: &[f64]) -> Result<ForecastMetrics> {
    if actual.len() != forecast.len() || actual.is_empty() {
        return Err(ForecastError::InvalidParameter(format!(
            "actual and forecast must have the same non-zero length (got {} and {})",
            actual.len(),
            forecast.len()
        )));
    }

    let n = actual.len();
    let (abs_sum, sq_sum) = actual
        .iter()
        .zip(forecast)
        .map(|(a, f)| a - f)
        .fold((0.0, 0.0), |(abs, sq), e| (abs + e.abs(), sq + e * e));

    Ok(ForecastMetrics {
        mae: abs_sum / n as f64,
        rmse: (sq_sum / n as f64).sqrt(),
        n,
    })
}
