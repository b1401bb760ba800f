//! Shared domain types.
//!
//! These types are kept small and `Copy` where possible so they can be passed
//! freely between the producer pipeline, the viewer, and the terminal UI.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default ARIMA order used by the producer: AR(5), first differences, no MA term.
pub const DEFAULT_ORDER: ArimaOrder = ArimaOrder { p: 5, d: 1, q: 0 };

/// Default chronological train share.
pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;

/// Default trailing moving-average window for the diagnostic smoothing.
pub const DEFAULT_MA_WINDOW: usize = 7;

/// Number of histogram bins in the sales distribution view.
pub const HISTOGRAM_BINS: usize = 30;

/// ARIMA(p, d, q) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// Autoregressive lags.
    pub p: usize,
    /// Differencing order.
    pub d: usize,
    /// Moving-average lags.
    pub q: usize,
}

impl ArimaOrder {
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Whether the regression carries an intercept.
    ///
    /// Differenced models are fitted without a drift term.
    pub fn has_intercept(self) -> bool {
        self.d == 0
    }

    /// Order of the long autoregression used to estimate innovations (`q > 0` only).
    pub fn innovation_lags(self) -> usize {
        if self.q == 0 { 0 } else { self.p + self.q }
    }

    /// First index (on the differenced scale) with a complete regression row.
    pub fn regression_start(self) -> usize {
        if self.q == 0 {
            self.p
        } else {
            self.p.max(self.innovation_lags() + self.q)
        }
    }

    /// Minimum number of training observations required to fit this order.
    pub fn min_observations(self) -> usize {
        self.d + self.regression_start() + 1
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        DEFAULT_ORDER
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// Parses `p,d,q` (parentheses and spaces are tolerated: `(5, 1, 0)`).
impl FromStr for ArimaOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("expected `p,d,q`, got '{s}'"));
        }
        let mut values = [0usize; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse::<usize>()
                .map_err(|_| format!("invalid order component '{part}' in '{s}'"))?;
        }
        Ok(Self::new(values[0], values[1], values[2]))
    }
}

/// One row of the raw sales input, after column renaming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub sales: f64,
    /// Accepted but unused downstream.
    pub stock: Option<f64>,
    /// Accepted but unused downstream.
    pub price: Option<f64>,
}

/// Date-ordered sales observations (ascending).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesSeries {
    pub dates: Vec<NaiveDate>,
    pub sales: Vec<f64>,
}

impl SalesSeries {
    /// Build a series from records, sorting by date (stable for equal dates).
    pub fn from_records(mut records: Vec<SalesRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        let dates = records.iter().map(|r| r.date).collect();
        let sales = records.iter().map(|r| r.sales).collect();
        Self { dates, sales }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of dates that repeat their predecessor.
    pub fn duplicate_dates(&self) -> usize {
        self.dates.windows(2).filter(|w| w[0] == w[1]).count()
    }

    /// Contiguous sub-series `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> SalesSeries {
        SalesSeries {
            dates: self.dates[start..end].to_vec(),
            sales: self.sales[start..end].to_vec(),
        }
    }
}

/// One persisted forecast row: the contract between producer and viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

impl ForecastRecord {
    pub fn residual(&self) -> f64 {
        self.actual - self.predicted
    }
}

/// Accuracy of the forecast over the test partition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub n: usize,
}

/// Producer configuration, derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub order: ArimaOrder,
    pub train_ratio: f64,
    pub ma_window: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

impl ForecastConfig {
    /// Config with the default policy for the given paths.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            order: DEFAULT_ORDER,
            train_ratio: DEFAULT_TRAIN_RATIO,
            ma_window: DEFAULT_MA_WINDOW,
            plot: false,
            plot_width: 100,
            plot_height: 25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_parses_plain_and_parenthesized() {
        assert_eq!("5,1,0".parse::<ArimaOrder>().unwrap(), ArimaOrder::new(5, 1, 0));
        assert_eq!("(2, 0, 1)".parse::<ArimaOrder>().unwrap(), ArimaOrder::new(2, 0, 1));
        assert!("5,1".parse::<ArimaOrder>().is_err());
        assert!("a,1,0".parse::<ArimaOrder>().is_err());
    }

    #[test]
    fn default_order_needs_seven_observations() {
        assert_eq!(DEFAULT_ORDER.min_observations(), 7);
        assert!(!DEFAULT_ORDER.has_intercept());
        assert_eq!(DEFAULT_ORDER.to_string(), "(5,1,0)");
    }

    #[test]
    fn moving_average_terms_raise_the_minimum() {
        let order = ArimaOrder::new(1, 1, 1);
        // long AR of 2 lags, then one lagged innovation
        assert_eq!(order.regression_start(), 3);
        assert_eq!(order.min_observations(), 5);
    }

    #[test]
    fn series_sorts_by_date_and_counts_duplicates() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let rec = |day, sales| SalesRecord {
            date: d(day),
            sales,
            stock: None,
            price: None,
        };
        let series = SalesSeries::from_records(vec![rec(3, 30.0), rec(1, 10.0), rec(3, 31.0), rec(2, 20.0)]);
        assert_eq!(series.dates, vec![d(1), d(2), d(3), d(3)]);
        assert_eq!(series.sales, vec![10.0, 20.0, 30.0, 31.0]);
        assert_eq!(series.duplicate_dates(), 1);
    }
}
