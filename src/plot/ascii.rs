//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! The x axis is the observation index of the full series. Plot elements:
//! - training observations: `.`
//! - test actuals: `o`
//! - forecast: `*`
//! - trailing moving average: `-` line

use chrono::NaiveDate;

use crate::app::pipeline::ForecastRun;
use crate::domain::SalesSeries;

/// Render the diagnostic plot for a completed run.
pub fn render_run_plot(run: &ForecastRun, width: usize, height: usize) -> String {
    let series = &run.ingest.series;
    let (train_len, predicted) = match run.forecast() {
        Some(fc) => {
            let predicted: Vec<f64> = fc.records.iter().map(|r| r.predicted).collect();
            (fc.split.train.len(), predicted)
        }
        None => (series.len(), Vec::new()),
    };
    render_forecast_plot(series, train_len, &predicted, &run.moving_average, width, height)
}

/// Render history, forecast and moving average on one grid.
///
/// `predicted[i]` is plotted at index `train_len + i`.
pub fn render_forecast_plot(
    series: &SalesSeries,
    train_len: usize,
    predicted: &[f64],
    moving_average: &[Option<f64>],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let n = series.len();
    let (Some(first), Some(last)) = (series.dates.first(), series.dates.last()) else {
        return "Plot: (no data)\n".to_string();
    };
    let x_max = (n.max(train_len + predicted.len()) as f64 - 1.0).max(1.0);

    let ma_points: Vec<(f64, f64)> = moving_average
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
        .collect();

    let values = series
        .sales
        .iter()
        .chain(predicted)
        .copied()
        .chain(ma_points.iter().map(|&(_, y)| y));
    let (y_min, y_max) = y_range(values).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the moving average first (so points can overlay).
    draw_curve(&mut grid, &ma_points, x_max, y_min, y_max);

    for (i, &y) in series.sales.iter().enumerate() {
        let ch = if i < train_len { '.' } else { 'o' };
        plot_point(&mut grid, i as f64, y, x_max, y_min, y_max, ch);
    }
    for (i, &y) in predicted.iter().enumerate() {
        plot_point(&mut grid, (train_len + i) as f64, y, x_max, y_min, y_max, '*');
    }

    let mut out = String::new();
    out.push_str(&header(*first, *last, n, train_len, y_min, y_max));
    out.push_str("Legend: '.' train, 'o' test, '*' forecast, '-' moving average\n");

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn header(first: NaiveDate, last: NaiveDate, n: usize, train_len: usize, y_min: f64, y_max: f64) -> String {
    format!("Plot: {first} → {last} (n={n}, train={train_len}) | y=[{y_min:.2}, {y_max:.2}]\n")
}

fn plot_point(grid: &mut [Vec<char>], x: f64, y: f64, x_max: f64, y_min: f64, y_max: f64, ch: char) {
    if !y.is_finite() {
        return;
    }
    let col = map_x(x, x_max, grid[0].len());
    let row = map_y(y, y_min, y_max, grid.len());
    grid[row][col] = ch;
}

fn y_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for y in values.filter(|y| y.is_finite()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_max: f64, y_min: f64, y_max: f64) {
    if curve.is_empty() {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
