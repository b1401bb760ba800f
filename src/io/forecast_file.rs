//! Read/write the forecast table shared by the producer and the viewer.
//!
//! Schema (one row per test-period date, header included):
//!
//! ```text
//! Date,Actual_Sales,Predicted_Sales
//! 2024-01-09,180,179.99999999999997
//! ```
//!
//! Numbers use the shortest representation that parses back to the same
//! `f64`, so a write/read cycle is lossless and repeated runs are
//! byte-identical.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::StringRecord;

use crate::domain::ForecastRecord;
use crate::error::{ForecastError, Result};
use crate::io::atomic::write_atomically;
use crate::io::ingest::{build_header_map, parse_date};

pub const DATE_COLUMN: &str = "Date";
pub const ACTUAL_COLUMN: &str = "Actual_Sales";
pub const PREDICTED_COLUMN: &str = "Predicted_Sales";
pub const RESIDUAL_COLUMN: &str = "Residual";

/// Write forecast rows to `path`, replacing any previous file atomically.
pub fn write_forecast_csv(path: &Path, records: &[ForecastRecord]) -> Result<()> {
    write_atomically(path, |w| write_forecasts(w, records))
}

/// Serialize forecast rows (with header) to any writer.
pub fn write_forecasts(w: &mut dyn Write, records: &[ForecastRecord]) -> std::io::Result<()> {
    let mut writer = csv::Writer::from_writer(w);
    writer.write_record([DATE_COLUMN, ACTUAL_COLUMN, PREDICTED_COLUMN])?;
    for r in records {
        writer.write_record([r.date.to_string(), fmt_number(r.actual), fmt_number(r.predicted)])?;
    }
    writer.flush()
}

/// Load the forecast table at `path`.
pub fn read_forecast_csv(path: &Path) -> Result<Vec<ForecastRecord>> {
    if !path.exists() {
        return Err(ForecastError::MissingFile(path.to_path_buf()));
    }
    let file = File::open(path)
        .map_err(|e| ForecastError::io(format!("failed to open forecast CSV '{}'", path.display()), e))?;
    read_forecasts(file)
}

/// Parse a forecast table from any reader. Extra columns are ignored.
pub fn read_forecasts<R: Read>(reader: R) -> Result<Vec<ForecastRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| ForecastError::csv("failed to read forecast CSV headers", e))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = require_column(&header_map, &headers, DATE_COLUMN)?;
    let actual_idx = require_column(&header_map, &headers, ACTUAL_COLUMN)?;
    let predicted_idx = require_column(&header_map, &headers, PREDICTED_COLUMN)?;

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| ForecastError::InvalidRow {
            line,
            message: format!("CSV parse error: {e}"),
        })?;
        let row_err = |message: String| ForecastError::InvalidRow { line, message };

        let date = parse_date(field(&record, date_idx, DATE_COLUMN).map_err(row_err)?).map_err(row_err)?;
        let actual = parse_number(field(&record, actual_idx, ACTUAL_COLUMN).map_err(row_err)?, ACTUAL_COLUMN)
            .map_err(row_err)?;
        let predicted =
            parse_number(field(&record, predicted_idx, PREDICTED_COLUMN).map_err(row_err)?, PREDICTED_COLUMN)
                .map_err(row_err)?;

        out.push(ForecastRecord {
            date,
            actual,
            predicted,
        });
    }
    Ok(out)
}

/// Shortest round-trip formatting (`100` rather than `100.0`).
pub fn fmt_number(v: f64) -> String {
    format!("{v}")
}

fn require_column(header_map: &HashMap<String, usize>, headers: &StringRecord, name: &str) -> Result<usize> {
    header_map.get(&name.to_lowercase()).copied().ok_or_else(|| {
        let found: Vec<&str> = headers.iter().collect();
        ForecastError::Schema(format!(
            "forecast file is missing column `{name}`; expected {DATE_COLUMN}, {ACTUAL_COLUMN}, {PREDICTED_COLUMN}; found [{}]",
            found.join(", ")
        ))
    })
}

fn field<'a>(record: &'a StringRecord, idx: usize, name: &str) -> std::result::Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing value for `{name}`"))
}

fn parse_number(s: &str, name: &str) -> std::result::Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("invalid `{name}` value '{s}'")),
    }
}
