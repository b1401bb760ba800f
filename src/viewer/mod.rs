//! Forecast viewer logic: load, filter by date range, aggregate.
//!
//! Everything here is presentation-independent. The terminal dashboard, the
//! `sf report` table, and `sf export` are all thin projections of a
//! [`FilteredView`].
//!
//! The loaded table is immutable. Each filter change builds a fresh view,
//! so every interaction is a pure function of `(dataset, range)`.

use std::path::Path;

use chrono::{Datelike, NaiveDate};

use crate::domain::{ForecastRecord, HISTOGRAM_BINS};
use crate::error::Result;
use crate::io::forecast_file::read_forecast_csv;

mod histogram;
mod kpi;

pub use histogram::Histogram;
pub use kpi::{Kpis, fmt_kpi};

/// Inclusive date range. `start > end` is allowed and selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// True when the bounds are inverted.
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// The loaded forecast table.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    records: Vec<ForecastRecord>,
}

impl Dashboard {
    /// Load the forecast file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::from_records(read_forecast_csv(path)?))
    }

    pub fn from_records(records: Vec<ForecastRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ForecastRecord] {
        &self.records
    }

    /// Min/max dates of the loaded data; `None` when the table is empty.
    pub fn full_range(&self) -> Option<DateRange> {
        let start = self.records.iter().map(|r| r.date).min()?;
        let end = self.records.iter().map(|r| r.date).max()?;
        Some(DateRange::new(start, end))
    }

    /// Resolve optional user bounds against the data's span.
    ///
    /// Missing bounds default to the corresponding end of the loaded data.
    /// Returns `None` only when a bound is missing and the table is empty.
    pub fn resolve_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<DateRange> {
        let full = self.full_range();
        let start = start.or(full.map(|r| r.start))?;
        let end = end.or(full.map(|r| r.end))?;
        Some(DateRange::new(start, end))
    }

    /// Rows with `range.start <= Date <= range.end`, in file order.
    pub fn filter(&self, range: DateRange) -> FilteredView {
        let rows = if range.is_inverted() {
            Vec::new()
        } else {
            self.records.iter().filter(|r| range.contains(r.date)).copied().collect()
        };
        FilteredView {
            range: Some(range),
            rows,
        }
    }
}

/// A date-range subset of the forecast table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView {
    pub range: Option<DateRange>,
    pub rows: Vec<ForecastRecord>,
}

impl FilteredView {
    /// View with no rows and no range (nothing loaded).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn kpis(&self) -> Kpis {
        Kpis::from_rows(&self.rows)
    }

    /// `Actual − Predicted` for each row.
    pub fn residuals(&self) -> Vec<f64> {
        self.rows.iter().map(ForecastRecord::residual).collect()
    }

    /// Distribution of actual sales with the dashboard's fixed bin count.
    pub fn actual_histogram(&self) -> Histogram {
        let values: Vec<f64> = self.rows.iter().map(|r| r.actual).collect();
        Histogram::new(&values, HISTOGRAM_BINS)
    }

    /// `(x, actual)` points, with `x` from [`date_to_x`].
    pub fn actual_series(&self) -> Vec<(f64, f64)> {
        self.rows.iter().map(|r| (date_to_x(r.date), r.actual)).collect()
    }

    pub fn predicted_series(&self) -> Vec<(f64, f64)> {
        self.rows.iter().map(|r| (date_to_x(r.date), r.predicted)).collect()
    }

    pub fn residual_series(&self) -> Vec<(f64, f64)> {
        self.rows.iter().map(|r| (date_to_x(r.date), r.residual())).collect()
    }
}

/// Map a date to a chart coordinate (days since the common era).
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of [`date_to_x`], rounding to the nearest day.
pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn rec(day: u32, actual: f64, predicted: f64) -> ForecastRecord {
        ForecastRecord {
            date: d(day),
            actual,
            predicted,
        }
    }

    fn dashboard() -> Dashboard {
        Dashboard::from_records(vec![rec(1, 100.0, 90.0), rec(2, 200.0, 210.0), rec(3, 150.0, 150.0)])
    }

    #[test]
    fn full_range_filter_is_identity() {
        let dash = dashboard();
        let range = dash.full_range().unwrap();
        assert_eq!(range, DateRange::new(d(1), d(3)));

        let view = dash.filter(range);
        assert_eq!(view.rows, dash.records());
    }

    #[test]
    fn bounds_are_inclusive() {
        let view = dashboard().filter(DateRange::new(d(2), d(3)));
        assert_eq!(view.rows, vec![rec(2, 200.0, 210.0), rec(3, 150.0, 150.0)]);
    }

    #[test]
    fn inverted_range_is_empty_not_an_error() {
        let view = dashboard().filter(DateRange::new(d(3), d(1)));
        assert!(view.is_empty());
        let kpis = view.kpis();
        assert_eq!(kpis, Kpis::default());
        assert_eq!(fmt_kpi(kpis.total_actual), "0");
        assert!(view.actual_histogram().counts.is_empty());
    }

    #[test]
    fn residuals_follow_the_filter() {
        let dash = dashboard();
        assert_eq!(dash.filter(dash.full_range().unwrap()).residuals(), vec![10.0, -10.0, 0.0]);
        assert_eq!(dash.filter(DateRange::new(d(2), d(2))).residuals(), vec![-10.0]);
    }

    #[test]
    fn resolve_range_fills_missing_bounds_from_data() {
        let dash = dashboard();
        assert_eq!(dash.resolve_range(Some(d(2)), None), Some(DateRange::new(d(2), d(3))));
        assert_eq!(dash.resolve_range(None, None), dash.full_range());
        assert_eq!(Dashboard::default().resolve_range(None, Some(d(2))), None);
        assert_eq!(
            Dashboard::default().resolve_range(Some(d(1)), Some(d(2))),
            Some(DateRange::new(d(1), d(2)))
        );
    }

    #[test]
    fn chart_x_round_trips_to_dates() {
        let x = date_to_x(d(15));
        assert_eq!(x_to_date(x), Some(d(15)));
        assert_eq!(x_to_date(x + 0.4), Some(d(15)));
        assert_eq!(x_to_date(f64::NAN), None);
    }
}
