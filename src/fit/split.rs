//! Chronological train/test split.
//!
//! The partition is a prefix/suffix cut of the date-ordered series. Rows are
//! never shuffled: training on later dates than the ones being scored would
//! leak the future into the fit.

use crate::domain::SalesSeries;
use crate::error::{ForecastError, Result};

/// Train/test partition of a sales series.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train: SalesSeries,
    pub test: SalesSeries,
}

/// Number of training rows for `n` observations: `floor(n * ratio)`.
pub fn train_len(n: usize, ratio: f64) -> usize {
    ((n as f64) * ratio).floor() as usize
}

/// Split `series` into the first `floor(n * ratio)` rows and the remainder.
pub fn train_test_split(series: &SalesSeries, ratio: f64) -> Result<TrainTestSplit> {
    if !(ratio.is_finite() && ratio > 0.0 && ratio < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "train ratio must lie strictly between 0 and 1 (got {ratio})"
        )));
    }

    let n = series.len();
    let cut = train_len(n, ratio).min(n);
    Ok(TrainTestSplit {
        train: series.slice(0, cut),
        test: series.slice(cut, n),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(n: usize) -> SalesSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        SalesSeries {
            dates: (0..n).map(|i| start + chrono::Days::new(i as u64)).collect(),
            sales: (0..n).map(|i| i as f64).collect(),
        }
    }

    #[test]
    fn ten_rows_split_eight_two() {
        let split = train_test_split(&series(10), 0.8).unwrap();
        assert_eq!(split.train.len(), 8);
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.test.sales, vec![8.0, 9.0]);
    }

    #[test]
    fn train_size_rounds_down() {
        for n in [11, 13, 17, 99, 101] {
            let split = train_test_split(&series(n), 0.8).unwrap();
            assert_eq!(split.train.len(), (n * 8) / 10, "n={n}");
            assert_eq!(split.train.len() + split.test.len(), n);
        }
    }

    #[test]
    fn degenerate_inputs_leave_nothing_to_train_on() {
        let split = train_test_split(&series(1), 0.8).unwrap();
        assert_eq!(split.train.len(), 0);
        assert_eq!(split.test.len(), 1);

        let split = train_test_split(&series(0), 0.8).unwrap();
        assert!(split.test.is_empty());
    }

    #[test]
    fn ratio_outside_unit_interval_is_rejected() {
        assert!(train_test_split(&series(10), 1.0).is_err());
        assert!(train_test_split(&series(10), 0.0).is_err());
        assert!(train_test_split(&series(10), f64::NAN).is_err());
    }
}
