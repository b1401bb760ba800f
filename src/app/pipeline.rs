//! Shared "forecast pipeline" logic used by the CLI front-end and the tests.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> smooth -> split -> fit -> forecast -> evaluate -> persist
//!
//! The CLI can then focus on presentation (summary, ASCII plot).

use crate::domain::{ForecastConfig, ForecastMetrics, ForecastRecord, SalesSeries};
use crate::error::{ForecastError, Result};
use crate::fit::{TrainTestSplit, train_test_split};
use crate::io::forecast_file::write_forecast_csv;
use crate::io::ingest::{IngestedSales, load_sales};
use crate::math::{evaluate_forecast, trailing_mean};
use crate::models::{ArimaModel, FittedArima};

/// Everything computed by a forecast over the test partition.
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    pub split: TrainTestSplit,
    pub fitted: FittedArima,
    pub records: Vec<ForecastRecord>,
    pub metrics: ForecastMetrics,
}

/// Result of the modelling step.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Forecast(ForecastOutput),
    /// Nothing to score against; the output file is left untouched.
    NoForecast { reason: String },
}

/// All computed outputs of a single `sf fit` run.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub ingest: IngestedSales,
    /// Trailing moving average of the full series (diagnostic only).
    pub moving_average: Vec<Option<f64>>,
    pub outcome: RunOutcome,
}

impl ForecastRun {
    pub fn forecast(&self) -> Option<&ForecastOutput> {
        match &self.outcome {
            RunOutcome::Forecast(out) => Some(out),
            RunOutcome::NoForecast { .. } => None,
        }
    }
}

/// Execute the full pipeline: read `config.input`, write `config.output`.
pub fn run_forecast(config: &ForecastConfig) -> Result<ForecastRun> {
    if config.ma_window == 0 {
        return Err(ForecastError::InvalidParameter(
            "moving-average window must be at least 1".to_string(),
        ));
    }

    let ingest = load_sales(&config.input)?;
    tracing::info!(
        path = %config.input.display(),
        rows = ingest.series.len(),
        "loaded sales history"
    );
    if ingest.duplicate_dates > 0 {
        tracing::warn!(
            duplicates = ingest.duplicate_dates,
            "input has repeated dates; rows kept in file order"
        );
    }

    let moving_average = trailing_mean(&ingest.series.sales, config.ma_window);
    let outcome = build_forecast(&ingest.series, config)?;

    match &outcome {
        RunOutcome::Forecast(out) => {
            write_forecast_csv(&config.output, &out.records)?;
            tracing::info!(
                path = %config.output.display(),
                rows = out.records.len(),
                "wrote forecast"
            );
        }
        RunOutcome::NoForecast { reason } => {
            tracing::warn!(reason = %reason, "no forecast produced");
        }
    }

    Ok(ForecastRun {
        ingest,
        moving_average,
        outcome,
    })
}

/// Split, fit and forecast an in-memory series. Does no I/O.
pub fn build_forecast(series: &SalesSeries, config: &ForecastConfig) -> Result<RunOutcome> {
    let split = train_test_split(series, config.train_ratio)?;
    tracing::info!(
        train = split.train.len(),
        test = split.test.len(),
        ratio = config.train_ratio,
        "split series"
    );

    if series.len() < 2 || split.test.is_empty() {
        return Ok(RunOutcome::NoForecast {
            reason: format!(
                "{} row(s) leave an empty test partition at train ratio {}",
                series.len(),
                config.train_ratio
            ),
        });
    }

    let fitted = ArimaModel::new(config.order).fit(&split.train.sales)?;
    let predicted = fitted.forecast(split.test.len())?;
    let metrics = evaluate_forecast(&split.test.sales, &predicted)?;
    tracing::info!(
        order = %config.order,
        mae = metrics.mae,
        rmse = metrics.rmse,
        "evaluated forecast"
    );

    let records = split
        .test
        .dates
        .iter()
        .zip(&split.test.sales)
        .zip(&predicted)
        .map(|((&date, &actual), &predicted)| ForecastRecord {
            date,
            actual,
            predicted,
        })
        .collect();

    Ok(RunOutcome::Forecast(ForecastOutput {
        split,
        fitted,
        records,
        metrics,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArimaOrder;
    use chrono::NaiveDate;

    fn series(sales: &[f64]) -> SalesSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        SalesSeries {
            dates: (0..sales.len()).map(|i| start + chrono::Days::new(i as u64)).collect(),
            sales: sales.to_vec(),
        }
    }

    fn config() -> ForecastConfig {
        ForecastConfig::new("unused.csv", "unused_out.csv")
    }

    #[test]
    fn forecasts_cover_the_test_tail() {
        let sales: Vec<f64> = (0..10).map(|i| 100.0 + 10.0 * i as f64).collect();
        let RunOutcome::Forecast(out) = build_forecast(&series(&sales), &config()).unwrap() else {
            panic!("expected a forecast");
        };

        let dates: Vec<NaiveDate> = out.records.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
            ]
        );
        assert_eq!(out.records[0].actual, 180.0);
        assert!((out.records[0].predicted - 180.0).abs() < 1e-6);
        assert!((out.records[1].predicted - 190.0).abs() < 1e-6);
        assert!(out.metrics.mae < 1e-6);
    }

    #[test]
    fn single_row_is_no_forecast() {
        let outcome = build_forecast(&series(&[5.0]), &config()).unwrap();
        assert!(matches!(outcome, RunOutcome::NoForecast { .. }));
        let outcome = build_forecast(&series(&[]), &config()).unwrap();
        assert!(matches!(outcome, RunOutcome::NoForecast { .. }));
    }

    #[test]
    fn short_training_set_is_insufficient_data() {
        let err = build_forecast(&series(&[1.0, 2.0, 3.0, 4.0, 5.0]), &config()).unwrap_err();
        assert!(
            matches!(err, ForecastError::InsufficientData { needed: 7, got: 4, .. }),
            "{err}"
        );
    }

    #[test]
    fn order_is_configurable() {
        let sales: Vec<f64> = (0..20).map(|i| 50.0 + (i % 3) as f64).collect();
        let mut cfg = config();
        cfg.order = ArimaOrder::new(1, 0, 0);
        let RunOutcome::Forecast(out) = build_forecast(&series(&sales), &cfg).unwrap() else {
            panic!("expected a forecast");
        };
        assert_eq!(out.fitted.order(), ArimaOrder::new(1, 0, 0));
        assert_eq!(out.records.len(), 4);
        assert!(out.records.iter().all(|r| r.predicted.is_finite()));
    }
}
