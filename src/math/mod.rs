//! Numerical utilities: least squares, rolling windows, and accuracy metrics.

pub mod metrics;
pub mod ols;
pub mod rolling;

pub use metrics::*;
pub use ols::*;
pub use rolling::*;
