//! Raw sales CSV ingest and normalization.
//!
//! This module turns a retail sales export into a date-ordered [`SalesSeries`].
//!
//! Design goals:
//! - **Strict schema**: `Date` and `Sales` columns must be present (under their
//!   source labels `data`/`venda` or the canonical English names).
//! - **Fail fast**: an unparseable date or sales value aborts the load with the
//!   offending line number. Nothing is coerced or skipped silently.
//! - **Deterministic**: rows are stable-sorted by date; duplicates are kept
//!   and counted, not dropped.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::{SalesRecord, SalesSeries};
use crate::error::{ForecastError, Result};

/// Canonical input columns and the header labels accepted for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SalesColumn {
    Date,
    Sales,
    Stock,
    Price,
}

impl SalesColumn {
    pub const ALL: [SalesColumn; 4] = [Self::Date, Self::Sales, Self::Stock, Self::Price];

    pub fn canonical(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Sales => "Sales",
            Self::Stock => "Stock",
            Self::Price => "Price",
        }
    }

    /// Accepted (normalized) header labels: the source export's first, then English.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Date => &["data", "date"],
            Self::Sales => &["venda", "sales"],
            Self::Stock => &["estoque", "stock"],
            Self::Price => &["preco", "preço", "price"],
        }
    }

    fn required(self) -> bool {
        matches!(self, Self::Date | Self::Sales)
    }
}

/// Ingest output: the ordered series plus what was learned while reading it.
#[derive(Debug, Clone)]
pub struct IngestedSales {
    pub series: SalesSeries,
    /// Source header label resolved for each canonical column that was present.
    pub columns: Vec<(SalesColumn, String)>,
    pub rows_read: usize,
    pub duplicate_dates: usize,
}

/// Load the raw sales file at `path`.
pub fn load_sales(path: &Path) -> Result<IngestedSales> {
    if !path.exists() {
        return Err(ForecastError::MissingFile(path.to_path_buf()));
    }
    let file = File::open(path)
        .map_err(|e| ForecastError::io(format!("failed to open sales CSV '{}'", path.display()), e))?;
    read_sales(file)
}

/// Parse raw sales CSV from any reader.
pub fn read_sales<R: Read>(reader: R) -> Result<IngestedSales> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| ForecastError::csv("failed to read CSV headers", e))?
        .clone();

    let header_map = build_header_map(&headers);
    let resolved = resolve_columns(&headers, &header_map)?;
    let index_of = |col: SalesColumn| resolved.get(&col).map(|(idx, _)| *idx);

    // Required columns are guaranteed by `resolve_columns`.
    let (Some(date_idx), Some(sales_idx)) = (index_of(SalesColumn::Date), index_of(SalesColumn::Sales)) else {
        return Err(ForecastError::Schema("date/sales columns could not be resolved".to_string()));
    };
    let stock_idx = index_of(SalesColumn::Stock);
    let price_idx = index_of(SalesColumn::Price);

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| ForecastError::InvalidRow {
            line,
            message: format!("CSV parse error: {e}"),
        })?;

        if record.iter().all(str::is_empty) {
            continue;
        }

        let date_raw = get_required(&record, date_idx, "Date").map_err(|message| ForecastError::InvalidRow { line, message })?;
        let date = parse_date(date_raw).map_err(|message| ForecastError::InvalidRow { line, message })?;

        let sales_raw =
            get_required(&record, sales_idx, "Sales").map_err(|message| ForecastError::InvalidRow { line, message })?;
        let sales = parse_sales(sales_raw).map_err(|message| ForecastError::InvalidRow { line, message })?;

        records.push(SalesRecord {
            date,
            sales,
            stock: parse_opt_f64(stock_idx.and_then(|i| get_optional(&record, i))),
            price: parse_opt_f64(price_idx.and_then(|i| get_optional(&record, i))),
        });
    }

    let rows_read = records.len();
    let series = SalesSeries::from_records(records);
    let duplicate_dates = series.duplicate_dates();

    let columns = SalesColumn::ALL
        .iter()
        .filter_map(|col| resolved.get(col).map(|(_, label)| (*col, label.clone())))
        .collect();

    Ok(IngestedSales {
        series,
        columns,
        rows_read,
        duplicate_dates,
    })
}

pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

pub(crate) fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_lowercase()
}

fn resolve_columns(
    headers: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<HashMap<SalesColumn, (usize, String)>> {
    let mut resolved = HashMap::new();
    let mut missing = Vec::new();

    for col in SalesColumn::ALL {
        let hit = col
            .aliases()
            .iter()
            .find_map(|alias| header_map.get(*alias).copied());
        match hit {
            Some(idx) => {
                let label = headers.get(idx).unwrap_or_default().trim_start_matches('\u{feff}').to_string();
                resolved.insert(col, (idx, label));
            }
            None if col.required() => missing.push(format!(
                "`{}` (accepted headers: {})",
                col.canonical(),
                col.aliases().join(", ")
            )),
            None => {}
        }
    }

    if !missing.is_empty() {
        let found: Vec<&str> = headers.iter().collect();
        return Err(ForecastError::Schema(format!(
            "missing required column(s) {}; found [{}]",
            missing.join(" and "),
            found.join(", ")
        )));
    }

    Ok(resolved)
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> std::result::Result<&'a str, String> {
    get_optional(record, idx).ok_or_else(|| format!("missing required value: `{name}`"))
}

fn get_optional(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a calendar date.
///
/// ISO dates (`YYYY-MM-DD`) are expected, but exports often carry a time part
/// or use day-first formats. A small fixed set of formats keeps parsing
/// deterministic.
pub fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!(
        "invalid date '{s}'; expected one of: YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY, DD-MM-YYYY (optionally with HH:MM:SS)"
    ))
}

fn parse_sales(s: &str) -> std::result::Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("invalid sales value '{s}' (expected a number)"))?;
    if !v.is_finite() {
        return Err(format!("non-finite sales value '{s}'"));
    }
    Ok(v)
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let v = s?.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn renames_source_columns_and_sorts_by_date() {
        let csv = "data,venda,estoque,preco\n2024-01-03,30,5,9.9\n2024-01-01,10,7,9.9\n2024-01-02,20,6,10.5\n";
        let ingest = read_sales(csv.as_bytes()).unwrap();

        assert_eq!(ingest.series.dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
        assert_eq!(ingest.series.sales, vec![10.0, 20.0, 30.0]);
        assert_eq!(ingest.rows_read, 3);
        assert_eq!(ingest.duplicate_dates, 0);
        assert_eq!(
            ingest.columns,
            vec![
                (SalesColumn::Date, "data".to_string()),
                (SalesColumn::Sales, "venda".to_string()),
                (SalesColumn::Stock, "estoque".to_string()),
                (SalesColumn::Price, "preco".to_string()),
            ]
        );
    }

    #[test]
    fn english_headers_with_bom_and_no_optional_columns() {
        let csv = "\u{feff}Date,Sales\n2024-02-01,5\n";
        let ingest = read_sales(csv.as_bytes()).unwrap();
        assert_eq!(ingest.series.len(), 1);
        assert_eq!(ingest.columns.len(), 2);
    }

    #[test]
    fn missing_sales_column_is_a_schema_error() {
        let csv = "data,estoque\n2024-01-01,3\n";
        let err = read_sales(csv.as_bytes()).unwrap_err();
        match err {
            ForecastError::Schema(msg) => {
                assert!(msg.contains("`Sales`"), "{msg}");
                assert!(msg.contains("venda"), "{msg}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unparseable_date_fails_with_line_number() {
        let csv = "data,venda\n2024-01-01,1\nnot-a-date,2\n";
        let err = read_sales(csv.as_bytes()).unwrap_err();
        match err {
            ForecastError::InvalidRow { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("not-a-date"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_sales_values_are_not_coerced() {
        for bad in ["abc", "NaN", "inf", ""] {
            let csv = format!("data,venda\n2024-01-01,{bad}\n");
            let err = read_sales(csv.as_bytes()).unwrap_err();
            assert!(matches!(err, ForecastError::InvalidRow { line: 2, .. }), "value {bad:?}: {err}");
        }
    }

    #[test]
    fn negative_sales_are_kept() {
        // Net sales go below zero on days dominated by returns.
        let csv = "data,venda\n2024-01-01,-3\n2024-01-02,4.5\n";
        let ingest = read_sales(csv.as_bytes()).unwrap();
        assert_eq!(ingest.series.sales, vec![-3.0, 4.5]);
    }

    #[test]
    fn stock_and_price_are_tolerated_when_garbled() {
        let csv = "data,venda,estoque,preco\n2024-01-01,1,n/a,\n";
        let ingest = read_sales(csv.as_bytes()).unwrap();
        assert_eq!(ingest.series.sales, vec![1.0]);
    }

    #[test]
    fn duplicate_dates_are_kept_and_counted() {
        let csv = "date,sales\n2024-01-01,1\n2024-01-01,2\n2024-01-02,3\n";
        let ingest = read_sales(csv.as_bytes()).unwrap();
        assert_eq!(ingest.series.len(), 3);
        assert_eq!(ingest.duplicate_dates, 1);
    }

    #[test]
    fn accepts_datetime_and_day_first_formats() {
        assert_eq!(parse_date("2024-03-05 00:00:00").unwrap(), d(2024, 3, 5));
        assert_eq!(parse_date("05/03/2024").unwrap(), d(2024, 3, 5));
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn missing_file_is_reported_by_path() {
        let err = load_sales(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, ForecastError::MissingFile(_)));
    }
}
