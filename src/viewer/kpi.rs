use crate::domain::ForecastRecord;

/// Headline figures for the filtered rows.
///
/// `None` means "no rows selected"; display code renders it as `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kpis {
    pub total_actual: Option<f64>,
    pub total_predicted: Option<f64>,
    pub avg_daily_actual: Option<f64>,
    pub rows: usize,
}

impl Kpis {
    pub fn from_rows(rows: &[ForecastRecord]) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let total_actual: f64 = rows.iter().map(|r| r.actual).sum();
        let total_predicted: f64 = rows.iter().map(|r| r.predicted).sum();
        Self {
            total_actual: Some(total_actual),
            total_predicted: Some(total_predicted),
            avg_daily_actual: Some(total_actual / rows.len() as f64),
            rows: rows.len(),
        }
    }
}

/// Integer display of a KPI, truncated toward zero. Missing values show `0`.
pub fn fmt_kpi(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}", v.trunc() as i64),
        _ => "0".to_string(),
    }
}
