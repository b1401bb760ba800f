use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sales_forecast::app::pipeline::{RunOutcome, run_forecast};
use sales_forecast::domain::ForecastConfig;
use sales_forecast::error::ForecastError;
use sales_forecast::io::read_forecast_csv;
use tempfile::TempDir;

/// Write a raw sales CSV with the source column names and `sales[i]` on day `i + 1`.
fn write_sales(dir: &Path, sales: &[f64]) -> PathBuf {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut text = String::from("data,venda,estoque,preco\n");
    for (i, v) in sales.iter().enumerate() {
        let date = start + chrono::Days::new(i as u64);
        text.push_str(&format!("{date},{v},50,9.99\n"));
    }
    let path = dir.join("retail_sales.csv");
    fs::write(&path, text).unwrap();
    path
}

fn config(dir: &TempDir, sales: &[f64]) -> ForecastConfig {
    let input = write_sales(dir.path(), sales);
    ForecastConfig::new(input, dir.path().join("forecast_output.csv"))
}

fn trend(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + 10.0 * i as f64).collect()
}

#[test]
fn ten_rows_forecast_the_last_two_days() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, &trend(10));

    let run = run_forecast(&cfg).unwrap();
    assert!(run.forecast().is_some());

    let rows = read_forecast_csv(&cfg.output).unwrap();
    let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        ]
    );
    assert_eq!(rows[0].actual, 180.0);
    assert_eq!(rows[1].actual, 190.0);
    assert!(rows.iter().all(|r| r.predicted.is_finite()));

    let text = fs::read_to_string(&cfg.output).unwrap();
    assert!(text.starts_with("Date,Actual_Sales,Predicted_Sales\n"));
}

#[test]
fn output_rows_match_the_test_partition() {
    let dir = TempDir::new().unwrap();
    let sales: Vec<f64> = (0..37).map(|i| 200.0 + ((i * 7) % 11) as f64).collect();
    let cfg = config(&dir, &sales);

    run_forecast(&cfg).unwrap();
    let rows = read_forecast_csv(&cfg.output).unwrap();

    // floor(37 * 0.8) = 29 training rows.
    assert_eq!(rows.len(), 37 - 29);
    let actual: Vec<f64> = rows.iter().map(|r| r.actual).collect();
    assert_eq!(actual, sales[29..].to_vec());
    assert!(rows.windows(2).all(|w| w[0].date < w[1].date));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let dir = TempDir::new().unwrap();
    let sales: Vec<f64> = (0..30).map(|i| 50.0 + (i as f64 * 0.7).sin() * 10.0 + i as f64).collect();
    let cfg = config(&dir, &sales);

    run_forecast(&cfg).unwrap();
    let first = fs::read(&cfg.output).unwrap();
    run_forecast(&cfg).unwrap();
    let second = fs::read(&cfg.output).unwrap();
    assert_eq!(first, second);
}

#[test]
fn unsorted_input_is_ordered_by_date() {
    let dir = TempDir::new().unwrap();
    let mut text = String::from("Date,Sales\n");
    for day in (1..=10).rev() {
        text.push_str(&format!("2024-01-{day:02},{}\n", 90 + 10 * day));
    }
    let input = dir.path().join("sales.csv");
    fs::write(&input, text).unwrap();
    let cfg = ForecastConfig::new(&input, dir.path().join("out.csv"));

    run_forecast(&cfg).unwrap();
    let rows = read_forecast_csv(&cfg.output).unwrap();
    assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
    assert_eq!(rows[0].actual, 180.0);
}

#[test]
fn too_few_rows_is_insufficient_data() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, &trend(5));

    let err = run_forecast(&cfg).unwrap_err();
    assert!(matches!(err, ForecastError::InsufficientData { .. }), "{err}");
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("(5,1,0)"));
    assert!(!cfg.output.exists());
}

#[test]
fn empty_input_produces_no_forecast_and_no_file() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, &[]);

    let run = run_forecast(&cfg).unwrap();
    assert!(matches!(run.outcome, RunOutcome::NoForecast { .. }));
    assert!(!cfg.output.exists());
}

#[test]
fn no_forecast_leaves_previous_output_untouched() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, &[42.0]);
    fs::write(&cfg.output, "previous").unwrap();

    let run = run_forecast(&cfg).unwrap();
    assert!(run.forecast().is_none());
    assert_eq!(fs::read_to_string(&cfg.output).unwrap(), "previous");
}

#[test]
fn missing_sales_column_is_a_schema_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("sales.csv");
    fs::write(&input, "data,estoque\n2024-01-01,5\n").unwrap();
    let cfg = ForecastConfig::new(&input, dir.path().join("out.csv"));

    let err = run_forecast(&cfg).unwrap_err();
    assert!(matches!(err, ForecastError::Schema(_)), "{err}");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn missing_input_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let cfg = ForecastConfig::new(dir.path().join("absent.csv"), dir.path().join("out.csv"));
    let err = run_forecast(&cfg).unwrap_err();
    assert!(matches!(err, ForecastError::MissingFile(_)), "{err}");
}

#[test]
fn write_leaves_no_temporary_files() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, &trend(12));
    run_forecast(&cfg).unwrap();

    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["forecast_output.csv", "retail_sales.csv"]);
}
