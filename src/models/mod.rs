//! Time-series models.
//!
//! Only the ARIMA family is implemented; the order is a configuration value,
//! not something searched for.

pub mod arima;

pub use arima::*;
