//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the modelling and viewer code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::{ForecastRun, RunOutcome};
use crate::domain::ForecastConfig;
use crate::viewer::{FilteredView, fmt_kpi};

/// Format the full run summary (dataset stats + fit diagnostics + accuracy).
pub fn format_run_summary(run: &ForecastRun, config: &ForecastConfig) -> String {
    let mut out = String::new();
    let series = &run.ingest.series;

    out.push_str("=== sf - Retail Sales Forecast ===\n");
    out.push_str(&format!("Input : {}\n", config.input.display()));
    let columns: Vec<String> = run
        .ingest
        .columns
        .iter()
        .map(|(col, label)| format!("{label}->{}", col.canonical()))
        .collect();
    out.push_str(&format!("Columns: {}\n", columns.join(", ")));
    match (series.dates.first(), series.dates.last()) {
        (Some(first), Some(last)) => out.push_str(&format!(
            "Rows: n={} | dates=[{first}, {last}] | duplicates={}\n",
            series.len(),
            run.ingest.duplicate_dates
        )),
        _ => out.push_str("Rows: n=0\n"),
    }
    let last_ma = run.moving_average.iter().rev().find_map(|v| *v);
    out.push_str(&format!(
        "MA({}) last: {}\n",
        config.ma_window,
        last_ma.map(|v| format!("{v:.2}")).unwrap_or_else(|| "n/a".to_string())
    ));

    let fc = match &run.outcome {
        RunOutcome::Forecast(fc) => fc,
        RunOutcome::NoForecast { reason } => {
            out.push_str(&format!("\nNo forecast produced: {reason}\n"));
            return out;
        }
    };

    out.push_str(&format!(
        "Split: train={} test={} (ratio {})\n",
        fc.split.train.len(),
        fc.split.test.len(),
        config.train_ratio
    ));

    let model = &fc.fitted;
    out.push_str(&format!("\nModel: ARIMA{}\n", model.order()));
    if model.order().has_intercept() {
        out.push_str(&format!("- const: {:.6}\n", model.intercept()));
    }
    out.push_str(&format!("- ar   : {}\n", fmt_vec(model.ar_coefficients())));
    if !model.ma_coefficients().is_empty() {
        out.push_str(&format!("- ma   : {}\n", fmt_vec(model.ma_coefficients())));
    }
    out.push_str(&format!("- sigma2: {:.6} (n_obs={})\n", model.sigma2(), model.n_obs()));

    out.push_str(&format!(
        "\nAccuracy (test): MAE={:.4} RMSE={:.4} n={}\n",
        fc.metrics.mae, fc.metrics.rmse, fc.metrics.n
    ));
    out.push_str(&format!("Output: {}\n", config.output.display()));

    out
}

/// Format the KPI block for a filtered view.
pub fn format_kpis(view: &FilteredView) -> String {
    let kpis = view.kpis();
    let range = view
        .range
        .map(|r| r.to_string())
        .unwrap_or_else(|| "(no data)".to_string());

    let mut out = String::new();
    out.push_str(&format!("Range: {range} | rows={}\n", view.len()));
    out.push_str(&format!("Total actual sales   : {}\n", fmt_kpi(kpis.total_actual)));
    out.push_str(&format!("Total predicted sales: {}\n", fmt_kpi(kpis.total_predicted)));
    out.push_str(&format!("Mean daily sales     : {}\n", fmt_kpi(kpis.avg_daily_actual)));
    out
}

/// Format the filtered rows with their residuals.
pub fn format_forecast_table(view: &FilteredView) -> String {
    if view.is_empty() {
        return "No rows in range.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(
        format!(
            "{:<10} {:>14} {:>14} {:>14}\n",
            "date", "actual", "predicted", "residual"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<14} {:-<14} {:-<14}", "", "", "", "").trim_end());
    out.push('\n');

    for r in &view.rows {
        out.push_str(&format!(
            "{:<10} {:>14.2} {:>14.2} {:>14.2}\n",
            r.date,
            r.actual,
            r.predicted,
            r.residual()
        ));
    }
    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ForecastRecord;
    use crate::viewer::{Dashboard, DateRange};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn dashboard() -> Dashboard {
        Dashboard::from_records(vec![
            ForecastRecord {
                date: d(1),
                actual: 100.0,
                predicted: 90.0,
            },
            ForecastRecord {
                date: d(2),
                actual: 200.0,
                predicted: 210.0,
            },
        ])
    }

    #[test]
    fn kpi_block_shows_truncated_totals() {
        let view = dashboard().filter(DateRange::new(d(1), d(2)));
        let text = format_kpis(&view);
        assert!(text.contains("Total actual sales   : 300"));
        assert!(text.contains("Total predicted sales: 300"));
        assert!(text.contains("Mean daily sales     : 150"));
        assert!(text.contains("rows=2"));
    }

    #[test]
    fn empty_view_reports_zero_and_no_rows() {
        let view = dashboard().filter(DateRange::new(d(2), d(1)));
        assert!(format_kpis(&view).contains("Total actual sales   : 0"));
        assert_eq!(format_forecast_table(&view), "No rows in range.\n");
    }

    #[test]
    fn table_lists_residuals() {
        let view = dashboard().filter(DateRange::new(d(1), d(2)));
        let table = format_forecast_table(&view);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("2024-01-01"));
        assert!(lines[2].trim_end().ends_with("10.00"));
        assert!(lines[3].trim_end().ends_with("-10.00"));
    }
}
