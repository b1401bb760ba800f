//! Reporting utilities: formatted terminal output for forecast runs and
//! filtered forecast views.

pub mod format;

pub use format::*;
