//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - validates paths before any work starts
//! - runs the forecast pipeline and prints the summary/plot
//! - drives the dashboard, report and export commands

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::paths::{validate_csv_path, validate_ma_window, validate_output_path, validate_train_ratio};
use crate::cli::{Command, ExportArgs, FitArgs, RangeArgs, ReportArgs, ViewArgs};
use crate::domain::ForecastConfig;
use crate::error::AppError;
use crate::viewer::{Dashboard, FilteredView};

pub mod pipeline;

use pipeline::RunOutcome;

/// Entry point for the `sf` binary.
pub fn run() -> Result<(), AppError> {
    // Optional: a missing `.env` is fine.
    dotenvy::dotenv().ok();

    // We want `sf` and `sf -f out.csv` to behave like `sf view ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => {
            init_tracing();
            handle_fit(args)
        }
        Command::View(args) => handle_view(args),
        Command::Report(args) => {
            init_tracing();
            handle_report(args)
        }
        Command::Export(args) => {
            init_tracing();
            handle_export(args)
        }
    }
}

/// Structured logs go to stderr so stdout stays clean for reports.
///
/// Not installed for the dashboard, which owns the terminal.
fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sales_forecast=info".into()),
        )
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = forecast_config_from_args(&args)?;
    let run = pipeline::run_forecast(&config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));
    if let RunOutcome::NoForecast { .. } = run.outcome {
        println!("No forecast produced");
    }

    if config.plot {
        let plot = crate::plot::render_run_plot(&run, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    Ok(())
}

fn handle_view(args: ViewArgs) -> Result<(), AppError> {
    validate_csv_path(&args.file)?;
    crate::tui::run(args)
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let view = filtered_view(&args.range)?;

    println!("{}", crate::report::format_kpis(&view));
    println!("{}", crate::report::format_forecast_table(&view));
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let output = validate_output_path(&args.output)?;
    let view = filtered_view(&args.range)?;

    crate::io::export::export_filtered(&output, &view, args.with_residual)?;
    println!("Exported {} row(s) to {}", view.len(), output.display());
    Ok(())
}

fn filtered_view(args: &RangeArgs) -> Result<FilteredView, AppError> {
    let file = validate_csv_path(&args.file)?;
    let dashboard = Dashboard::load(&file)?;
    Ok(match dashboard.resolve_range(args.start, args.end) {
        Some(range) => dashboard.filter(range),
        None => FilteredView::empty(),
    })
}

/// Build the producer config, validating paths and numeric flags up front.
pub fn forecast_config_from_args(args: &FitArgs) -> Result<ForecastConfig, AppError> {
    let input = validate_csv_path(&args.input)?;
    let output = validate_output_path(&args.output)?;

    Ok(ForecastConfig {
        input,
        output,
        order: args.order,
        train_ratio: validate_train_ratio(args.train_ratio)?,
        ma_window: validate_ma_window(args.ma_window)?,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
    })
}

/// Rewrite argv so `sf` defaults to `sf view`.
///
/// Rules:
/// - `sf`                      -> `sf view`
/// - `sf -f out.csv ...`       -> `sf view -f out.csv ...`
/// - `sf --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("view".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "view" | "report" | "export");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "view flags".
    if arg1.starts_with('-') {
        argv.insert(1, "view".to_string());
        return argv;
    }

    argv
}
