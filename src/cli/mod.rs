//! Command-line parsing for the retail sales forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modelling code.
//!
//! Path flags fall back to environment variables (`SF_INPUT`, `SF_OUTPUT`,
//! `SF_FORECAST_FILE`), which may also come from a `.env` file.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::ArimaOrder;
use crate::io::export::DEFAULT_EXPORT_FILE;

pub mod paths;

/// Default raw sales input.
pub const DEFAULT_INPUT: &str = "data/retail_sales.csv";
/// Default forecast table (producer output, viewer input).
pub const DEFAULT_FORECAST_FILE: &str = "data/forecast_output.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sf", version, about = "Retail sales forecaster (ARIMA) and forecast viewer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit ARIMA on the training split, forecast the test period, and write the forecast CSV.
    Fit(FitArgs),
    /// Launch the interactive forecast dashboard.
    View(ViewArgs),
    /// Print KPIs and the filtered forecast table (non-interactive).
    Report(ReportArgs),
    /// Write the filtered forecast rows to CSV.
    Export(ExportArgs),
}

/// Options for the forecast producer.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Raw sales CSV (`data, venda, estoque, preco` or English headers).
    #[arg(short = 'i', long, env = "SF_INPUT", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Forecast CSV to write.
    #[arg(short = 'o', long, env = "SF_OUTPUT", default_value = DEFAULT_FORECAST_FILE)]
    pub output: PathBuf,

    /// ARIMA order as `p,d,q`.
    #[arg(long, default_value = "5,1,0")]
    pub order: ArimaOrder,

    /// Fraction of rows (chronologically first) used for training.
    #[arg(long, default_value_t = 0.8)]
    pub train_ratio: f64,

    /// Trailing moving-average window (diagnostic only).
    #[arg(long, default_value_t = 7)]
    pub ma_window: usize,

    /// Render an ASCII plot of history, forecast, and moving average.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for the interactive dashboard.
#[derive(Debug, Parser, Clone)]
pub struct ViewArgs {
    /// Forecast CSV produced by `sf fit`.
    #[arg(short = 'f', long, env = "SF_FORECAST_FILE", default_value = DEFAULT_FORECAST_FILE)]
    pub file: PathBuf,
}

/// Date-range selection shared by `report` and `export`.
#[derive(Debug, Parser, Clone)]
pub struct RangeArgs {
    /// Forecast CSV produced by `sf fit`.
    #[arg(short = 'f', long, env = "SF_FORECAST_FILE", default_value = DEFAULT_FORECAST_FILE)]
    pub file: PathBuf,

    /// First date to include (defaults to the earliest date in the file).
    #[arg(long, value_parser = parse_date_arg)]
    pub start: Option<NaiveDate>,

    /// Last date to include (defaults to the latest date in the file).
    #[arg(long, value_parser = parse_date_arg)]
    pub end: Option<NaiveDate>,
}

/// Options for `sf report`.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub range: RangeArgs,
}

/// Options for `sf export`.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Destination CSV.
    #[arg(short = 'o', long, default_value = DEFAULT_EXPORT_FILE)]
    pub output: PathBuf,

    /// Append a `Residual` column (actual - predicted).
    #[arg(long)]
    pub with_residual: bool,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    crate::io::ingest::parse_date(s)
}
