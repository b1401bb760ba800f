//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the model order and producer configuration (`ArimaOrder`, `ForecastConfig`)
//! - raw and ordered sales observations (`SalesRecord`, `SalesSeries`)
//! - the persisted forecast row (`ForecastRecord`) and its accuracy metrics

pub mod types;

pub use types::*;
