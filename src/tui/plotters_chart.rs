//! Plotters-powered chart widgets for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//! - histogram bars come for free as `Rectangle` elements
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color as TuiColor, Style},
    widgets::Widget,
};

use crate::viewer::Histogram;

/// One line series with its color.
pub struct ChartLine<'a> {
    pub points: &'a [(f64, f64)],
    pub color: RGBColor,
}

/// A render-only line chart description.
///
/// All series and bounds are computed outside the render call; `render()`
/// only draws.
pub struct LinePlottersChart<'a> {
    pub lines: &'a [ChartLine<'a>],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for LinePlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if too_small(area, buf) {
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !valid_bounds(self.x_bounds, self.y_bounds) {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for line in self.lines {
                chart.draw_series(LineSeries::new(line.points.iter().copied(), &line.color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Histogram bars for a precomputed [`Histogram`].
pub struct HistogramPlottersChart<'a> {
    pub histogram: &'a Histogram,
    pub x_label: &'a str,
    pub fmt_x: fn(f64) -> String,
}

impl<'a> HistogramPlottersChart<'a> {
    /// `([x_min, x_max], [0, y_max])` covering every bucket.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let h = self.histogram;
        let x_max = h.min + h.width * h.counts.len() as f64;
        let y_max = (h.max_count() as f64 * 1.1).max(1.0);
        ([h.min, x_max], [0.0, y_max])
    }
}

impl<'a> Widget for HistogramPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if too_small(area, buf) {
            return;
        }

        let (x_bounds, y_bounds) = self.bounds();
        if !valid_bounds(x_bounds, y_bounds) {
            return;
        }
        let [x0, x1] = x_bounds;
        let [y0, y1] = y_bounds;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 5)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc("count")
                .x_labels(4)
                .y_labels(4)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let bar_color = RGBColor(0, 255, 255); // cyan
            chart.draw_series(
                self.histogram
                    .buckets()
                    .filter(|&(_, _, count)| count > 0)
                    .map(|(lo, hi, count)| Rectangle::new([(lo, 0.0), (hi, count as f64)], bar_color.filled())),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

// When the available area is too small, Plotters may fail to build a chart.
// In that case, we render a small hint rather than panicking.
fn too_small(area: Rect, buf: &mut Buffer) -> bool {
    if area.is_empty() {
        return true;
    }
    if area.width < 20 || area.height < 8 {
        buf.set_stringn(
            area.x,
            area.y,
            "Chart area too small (resize terminal).",
            area.width as usize,
            Style::default().fg(TuiColor::Yellow),
        );
        return true;
    }
    false
}

fn valid_bounds(x: [f64; 2], y: [f64; 2]) -> bool {
    x.iter().chain(&y).all(|v| v.is_finite()) && x[1] > x[0] && y[1] > y[0]
}
