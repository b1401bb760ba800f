//! Export the filtered forecast rows to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! same columns as the forecast file, optionally followed by `Residual`.

use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::io::atomic::write_atomically;
use crate::io::forecast_file::{ACTUAL_COLUMN, DATE_COLUMN, PREDICTED_COLUMN, RESIDUAL_COLUMN, fmt_number};
use crate::viewer::FilteredView;

/// Default export file name, relative to the working directory.
pub const DEFAULT_EXPORT_FILE: &str = "forecast_results.csv";

/// Write the rows of `view` to `path`, replacing any previous file atomically.
pub fn export_filtered(path: &Path, view: &FilteredView, include_residual: bool) -> Result<()> {
    write_atomically(path, |w| write_filtered_csv(w, view, include_residual))?;
    tracing::info!(
        path = %path.display(),
        rows = view.len(),
        include_residual,
        "exported filtered forecast"
    );
    Ok(())
}

/// Serialize the rows of `view` (with header) to any writer.
pub fn write_filtered_csv(w: &mut dyn Write, view: &FilteredView, include_residual: bool) -> std::io::Result<()> {
    let mut writer = csv::Writer::from_writer(w);

    let mut header = vec![DATE_COLUMN, ACTUAL_COLUMN, PREDICTED_COLUMN];
    if include_residual {
        header.push(RESIDUAL_COLUMN);
    }
    writer.write_record(&header)?;

    for r in &view.rows {
        let mut row = vec![r.date.to_string(), fmt_number(r.actual), fmt_number(r.predicted)];
        if include_residual {
            row.push(fmt_number(r.residual()));
        }
        writer.write_record(&row)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ForecastRecord;
    use crate::viewer::{Dashboard, DateRange};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

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

    fn render(view: &FilteredView, include_residual: bool) -> String {
        let mut buf = Vec::new();
        write_filtered_csv(&mut buf, view, include_residual).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn residual_column_only_on_request() {
        let dash = dashboard();
        let view = dash.filter(DateRange::new(d(1), d(2)));
        assert_eq!(
            render(&view, false),
            "Date,Actual_Sales,Predicted_Sales\n2024-01-01,100,90\n2024-01-02,200,210\n"
        );
        assert_eq!(
            render(&view, true),
            "Date,Actual_Sales,Predicted_Sales,Residual\n2024-01-01,100,90,10\n2024-01-02,200,210,-10\n"
        );
    }

    #[test]
    fn empty_view_exports_header_only() {
        let view = dashboard().filter(DateRange::new(d(2), d(1)));
        assert_eq!(render(&view, true), "Date,Actual_Sales,Predicted_Sales,Residual\n");
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);
        let dash = dashboard();
        export_filtered(&path, &dash.filter(DateRange::new(d(2), d(2))), false).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Date,Actual_Sales,Predicted_Sales\n2024-01-02,200,210\n");
    }
}
