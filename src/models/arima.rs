//! ARIMA(p, d, q) estimation and forecasting.
//!
//! The series is differenced `d` times and an ARMA(p, q) is fitted to the
//! result by least squares:
//!
//! - `q == 0`: conditional least squares, regressing `w_t` on `w_{t-1..t-p}`.
//! - `q > 0`: Hannan–Rissanen. A long autoregression of order `p + q` gives
//!   innovation estimates `e_t`, then `w_t` is regressed on its own lags and
//!   on `e_{t-1..t-q}`.
//!
//! An intercept is only estimated when `d == 0`; differenced models carry no
//! drift term. Forecasts are produced recursively on the differenced scale
//! (future innovations are zero) and integrated back to levels.
//!
//! Estimation is fully deterministic: the same series always yields the same
//! coefficients and forecasts.

use nalgebra::{DMatrix, DVector};

use crate::domain::ArimaOrder;
use crate::error::{ForecastError, Result};
use crate::math::solve_least_squares;

/// Unfitted model: just the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaModel {
    order: ArimaOrder,
}

/// A fitted ARIMA model, ready to forecast past the end of its training series.
#[derive(Debug, Clone)]
pub struct FittedArima {
    order: ArimaOrder,
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    /// Training series on the original scale.
    history: Vec<f64>,
    /// Training series after `d` differences.
    differenced: Vec<f64>,
    /// In-sample innovations aligned with `differenced` (zero where undefined).
    innovations: Vec<f64>,
    sigma2: f64,
    n_obs: usize,
}

impl ArimaModel {
    pub fn new(order: ArimaOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Fit the model to `series` (oldest first).
    pub fn fit(&self, series: &[f64]) -> Result<FittedArima> {
        let order = self.order;
        let needed = order.min_observations();
        if series.len() < needed {
            return Err(ForecastError::InsufficientData {
                order,
                needed,
                got: series.len(),
            });
        }
        if let Some(idx) = series.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidParameter(format!(
                "training series has a non-finite value at position {idx}"
            )));
        }

        let differenced = difference(series, order.d);

        let long_ar_residuals = if order.q > 0 {
            Some(long_ar_innovations(&differenced, order)?)
        } else {
            None
        };
        let lagged_innovations = long_ar_residuals.as_deref().unwrap_or(&[]);

        let start = order.regression_start();
        let rows = differenced.len() - start;
        let cols = usize::from(order.has_intercept()) + order.p + order.q;

        let (x, y) = design(&differenced, lagged_innovations, order, start, order.p, order.q);
        let beta = if cols == 0 {
            DVector::zeros(0)
        } else {
            solve_least_squares(&x, &y).ok_or_else(|| {
                ForecastError::Computation(format!(
                    "least squares failed while fitting ARIMA{order} on {} observations",
                    series.len()
                ))
            })?
        };

        let (intercept, ar, ma) = split_coefficients(&beta, order);

        // Stage-2 residuals replace the long-AR estimates from `start` onwards.
        let regressors = if lagged_innovations.is_empty() {
            vec![0.0; differenced.len()]
        } else {
            lagged_innovations.to_vec()
        };
        let mut innovations = regressors.clone();
        let mut sse = 0.0;
        for t in start..differenced.len() {
            let fitted = one_step(&differenced, &regressors, t, intercept, &ar, &ma);
            let e = differenced[t] - fitted;
            innovations[t] = e;
            sse += e * e;
        }
        let sigma2 = sse / rows as f64;

        tracing::debug!(
            order = %order,
            intercept,
            ar = ?ar,
            ma = ?ma,
            sigma2,
            "fitted ARIMA"
        );

        Ok(FittedArima {
            order,
            intercept,
            ar,
            ma,
            history: series.to_vec(),
            differenced,
            innovations,
            sigma2,
            n_obs: rows,
        })
    }
}

impl FittedArima {
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// In-sample innovation variance on the differenced scale.
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Number of regression rows used in estimation.
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// Forecast the next `horizon` values on the original scale.
    pub fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let mut w = self.differenced.clone();
        let mut e = self.innovations.clone();
        w.reserve(horizon);
        e.reserve(horizon);

        for _ in 0..horizon {
            let t = w.len();
            let next = one_step(&w, &e, t, self.intercept, &self.ar, &self.ma);
            w.push(next);
            e.push(0.0);
        }

        let levels = integrate(&w[self.differenced.len()..], &self.history, self.order.d);
        if let Some(idx) = levels.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::Computation(format!(
                "ARIMA{} produced a non-finite forecast at step {}",
                self.order,
                idx + 1
            )));
        }
        Ok(levels)
    }
}

/// Apply `d` first differences.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut out = series.to_vec();
    for _ in 0..d {
        if out.len() <= 1 {
            return Vec::new();
        }
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }
    out
}

/// Undo `d` differences of `diffs`, continuing from the end of `history`.
pub fn integrate(diffs: &[f64], history: &[f64], d: usize) -> Vec<f64> {
    let mut out = diffs.to_vec();
    for level in (0..d).rev() {
        let mut last = difference(history, level).last().copied().unwrap_or(0.0);
        for v in out.iter_mut() {
            last += *v;
            *v = last;
        }
    }
    out
}

/// Innovations from a long autoregression of order `p + q` (stage one of Hannan–Rissanen).
fn long_ar_innovations(w: &[f64], order: ArimaOrder) -> Result<Vec<f64>> {
    let m = order.innovation_lags();
    let (x, y) = design(w, &[], order, m, m, 0);
    let beta = solve_least_squares(&x, &y).ok_or_else(|| {
        ForecastError::Computation(format!("long autoregression failed while fitting ARIMA{order}"))
    })?;

    let offset = usize::from(order.has_intercept());
    let intercept = if offset == 1 { beta[0] } else { 0.0 };
    let phi: Vec<f64> = beta.iter().skip(offset).copied().collect();

    let mut out = vec![0.0; w.len()];
    for t in m..w.len() {
        out[t] = w[t] - one_step(w, &out, t, intercept, &phi, &[]);
    }
    Ok(out)
}

/// Regression design for rows `start..w.len()` with `p` lags of `w` and `q` lags of `e`.
fn design(
    w: &[f64],
    e: &[f64],
    order: ArimaOrder,
    start: usize,
    p: usize,
    q: usize,
) -> (DMatrix<f64>, DVector<f64>) {
    let offset = usize::from(order.has_intercept());
    let rows = w.len().saturating_sub(start);
    let cols = offset + p + q;

    let mut x = DMatrix::zeros(rows, cols);
    let mut y = DVector::zeros(rows);
    for (r, t) in (start..w.len()).enumerate() {
        if offset == 1 {
            x[(r, 0)] = 1.0;
        }
        for i in 0..p {
            x[(r, offset + i)] = w[t - 1 - i];
        }
        for j in 0..q {
            x[(r, offset + p + j)] = e[t - 1 - j];
        }
        y[r] = w[t];
    }
    (x, y)
}

fn split_coefficients(beta: &DVector<f64>, order: ArimaOrder) -> (f64, Vec<f64>, Vec<f64>) {
    let offset = usize::from(order.has_intercept());
    let intercept = if offset == 1 { beta[0] } else { 0.0 };
    let ar = (0..order.p).map(|i| beta[offset + i]).collect();
    let ma = (0..order.q).map(|j| beta[offset + order.p + j]).collect();
    (intercept, ar, ma)
}

/// Conditional prediction of `w[t]` from the values and innovations before `t`.
fn one_step(w: &[f64], e: &[f64], t: usize, intercept: f64, ar: &[f64], ma: &[f64]) -> f64 {
    let mut pred = intercept;
    for (i, phi) in ar.iter().enumerate() {
        pred += phi * w[t - 1 - i];
    }
    for (j, theta) in ma.iter().enumerate() {
        pred += theta * e[t - 1 - j];
    }
    pred
}
