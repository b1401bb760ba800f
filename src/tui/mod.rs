//! Ratatui-based forecast dashboard.
//!
//! The TUI loads a forecast CSV once, then lets the user move a date range
//! over it. Every key press recomputes the filtered view (KPI cards, the
//! actual/predicted chart, the sales histogram, the residual chart and the
//! table) from the loaded data and the current bounds.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Days, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table},
};

use crate::cli::ViewArgs;
use crate::error::AppError;
use crate::io::export::{DEFAULT_EXPORT_FILE, export_filtered};
use crate::io::ingest::parse_date;
use crate::viewer::{Dashboard, DateRange, FilteredView, Histogram, fmt_kpi, x_to_date};

mod plotters_chart;

use plotters_chart::{ChartLine, HistogramPlottersChart, LinePlottersChart};

const FIELD_START: usize = 0;
const FIELD_END: usize = 1;

/// Start the TUI.
pub fn run(args: ViewArgs) -> Result<(), AppError> {
    // Load before taking over the terminal so a bad file is reported normally.
    let dashboard = Dashboard::load(&args.file)?;
    let mut app = App::new(dashboard, args.file);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    dashboard: Dashboard,
    path: PathBuf,
    range: Option<DateRange>,
    view: FilteredView,
    selected_field: usize,
    editing_date: bool,
    date_input: String,
    table_offset: usize,
    export_path: PathBuf,
    status: String,
}

impl App {
    fn new(dashboard: Dashboard, path: PathBuf) -> Self {
        let range = dashboard.full_range();
        let status = format!("Loaded {} row(s) from {}", dashboard.records().len(), path.display());
        let mut app = Self {
            dashboard,
            path,
            range,
            view: FilteredView::empty(),
            selected_field: FIELD_START,
            editing_date: false,
            date_input: String::new(),
            table_offset: 0,
            export_path: PathBuf::from(DEFAULT_EXPORT_FILE),
            status,
        };
        app.refilter();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply one key press. Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_date {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => self.selected_field = FIELD_START,
            KeyCode::Down => self.selected_field = FIELD_END,
            KeyCode::Left => self.shift_selected(-1),
            KeyCode::Right => self.shift_selected(1),
            KeyCode::Enter => {
                if let Some(date) = self.selected_date() {
                    self.date_input = date.to_string();
                    self.editing_date = true;
                    self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
                }
            }
            KeyCode::Char('a') => {
                self.range = self.dashboard.full_range();
                self.refilter();
                self.status = "Range reset to full span.".to_string();
            }
            KeyCode::Char('x') => self.export(false),
            KeyCode::Char('X') => self.export(true),
            KeyCode::Char('L') => self.reload(),
            KeyCode::PageDown | KeyCode::Char('j') => {
                let last = self.view.len().saturating_sub(1);
                self.table_offset = (self.table_offset + 1).min(last);
            }
            KeyCode::PageUp | KeyCode::Char('k') => {
                self.table_offset = self.table_offset.saturating_sub(1);
            }
            _ => {}
        }

        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_date = false;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_date = false;
                self.apply_date_input();
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' || c == '/' {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn selected_date(&self) -> Option<NaiveDate> {
        let range = self.range?;
        Some(if self.selected_field == FIELD_START {
            range.start
        } else {
            range.end
        })
    }

    fn set_selected_date(&mut self, date: NaiveDate) {
        let Some(range) = self.range.as_mut() else {
            return;
        };
        if self.selected_field == FIELD_START {
            range.start = date;
        } else {
            range.end = date;
        }
        self.refilter();
        self.status = match self.range {
            Some(r) if r.is_inverted() => format!("Start is after end: {r}"),
            Some(r) => format!("Range: {r}"),
            None => String::new(),
        };
    }

    fn shift_selected(&mut self, days: i64) {
        let Some(date) = self.selected_date() else {
            self.status = "No data loaded.".to_string();
            return;
        };
        let step = Days::new(days.unsigned_abs());
        let shifted = if days >= 0 {
            date.checked_add_days(step)
        } else {
            date.checked_sub_days(step)
        };
        if let Some(next) = shifted {
            self.set_selected_date(next);
        }
    }

    fn apply_date_input(&mut self) {
        let trimmed = self.date_input.trim().to_string();
        match parse_date(&trimmed) {
            Ok(date) => self.set_selected_date(date),
            Err(e) => self.status = format!("Invalid date: {e}"),
        }
    }

    fn refilter(&mut self) {
        self.view = match self.range {
            Some(range) => self.dashboard.filter(range),
            None => FilteredView::empty(),
        };
        self.table_offset = 0;
    }

    fn export(&mut self, include_residual: bool) {
        self.status = match export_filtered(&self.export_path, &self.view, include_residual) {
            Ok(()) => format!(
                "Exported {} row(s){} to {}",
                self.view.len(),
                if include_residual { " with residuals" } else { "" },
                self.export_path.display()
            ),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn reload(&mut self) {
        match Dashboard::load(&self.path) {
            Ok(dashboard) => {
                self.dashboard = dashboard;
                let full = self.dashboard.full_range();
                // Bounds survive a reload only while both still fall inside the new span.
                let keep = match (self.range, full) {
                    (Some(r), Some(f)) => f.contains(r.start) && f.contains(r.end),
                    _ => false,
                };
                if !keep {
                    self.range = full;
                }
                self.refilter();
                self.status = format!(
                    "Reloaded {} row(s) from {}{}",
                    self.dashboard.records().len(),
                    self.path.display(),
                    if keep { "" } else { "; range reset to full span" }
                );
            }
            Err(err) => self.status = format!("Reload failed: {err}"),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_kpis(frame, chunks[1]);
        self.draw_body(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let range = self
            .range
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let lines = vec![
            Line::from(vec![
                Span::styled("sf", Style::default().fg(Color::Cyan)),
                Span::raw(" · Sales Forecast Dashboard"),
            ]),
            Line::from(Span::styled(
                format!(
                    "file: {} | range: {range} | rows: {}/{}",
                    display_path(&self.path),
                    self.view.len(),
                    self.dashboard.records().len()
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_kpis(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let kpis = self.view.kpis();
        let cards = [
            ("Total Actual Sales", kpis.total_actual),
            ("Total Predicted Sales", kpis.total_predicted),
            ("Mean Daily Sales", kpis.avg_daily_actual),
        ];
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(area);

        for ((title, value), rect) in cards.into_iter().zip(chunks.iter()) {
            let p = Paragraph::new(fmt_kpi(value))
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::BOLD))
                .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(p, *rect);
        }
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[0]);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Percentage(35),
                Constraint::Percentage(20),
            ])
            .split(rows[1]);

        self.draw_forecast_chart(frame, top[0]);
        self.draw_histogram(frame, top[1]);
        self.draw_residual_chart(frame, bottom[0]);
        self.draw_table(frame, bottom[1]);
        self.draw_settings(frame, bottom[2]);
    }

    /// Render a titled block and return its cleared inner area, or `None`
    /// (after drawing the empty state) when no rows are selected.
    fn chart_area(&self, frame: &mut ratatui::Frame<'_>, area: Rect, title: &str) -> Option<Rect> {
        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if self.view.is_empty() {
            let msg = Paragraph::new("No rows in range")
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center);
            frame.render_widget(msg, inner);
            return None;
        }
        Some(inner)
    }

    fn draw_forecast_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(inner) = self.chart_area(frame, area, "Actual vs Predicted") else {
            return;
        };

        let actual = self.view.actual_series();
        let predicted = self.view.predicted_series();
        let Some((x_bounds, y_bounds)) = series_bounds(&[actual.as_slice(), predicted.as_slice()]) else {
            return;
        };
        let lines = [
            ChartLine {
                points: &actual,
                color: RGBColor(255, 255, 255),
            },
            ChartLine {
                points: &predicted,
                color: RGBColor(0, 255, 255),
            },
        ];
        let widget = LinePlottersChart {
            lines: &lines,
            x_bounds,
            y_bounds,
            x_label: "date (white=actual, cyan=predicted)",
            y_label: "sales",
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_value,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_histogram(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(inner) = self.chart_area(frame, area, "Sales Distribution") else {
            return;
        };

        let histogram: Histogram = self.view.actual_histogram();
        let widget = HistogramPlottersChart {
            histogram: &histogram,
            x_label: "actual sales",
            fmt_x: fmt_axis_value,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_residual_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(inner) = self.chart_area(frame, area, "Residuals (Actual - Predicted)") else {
            return;
        };

        let residuals = self.view.residual_series();
        let Some((x_bounds, y_bounds)) = series_bounds(&[residuals.as_slice()]) else {
            return;
        };
        let lines = [ChartLine {
            points: &residuals,
            color: RGBColor(255, 0, 0),
        }];
        let widget = LinePlottersChart {
            lines: &lines,
            x_bounds,
            y_bounds,
            x_label: "date",
            y_label: "residual",
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_value,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Forecast Rows").borders(Borders::ALL);
        if self.view.is_empty() {
            let msg = Paragraph::new("No rows in range")
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(msg, area);
            return;
        }

        let header = Row::new(["Date", "Actual", "Predicted", "Residual"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = self.view.rows.iter().skip(self.table_offset).map(|r| {
            Row::new(vec![
                Cell::from(r.date.to_string()),
                Cell::from(format!("{:.2}", r.actual)),
                Cell::from(format!("{:.2}", r.predicted)),
                Cell::from(format!("{:.2}", r.residual())),
            ])
        });
        let widths = [
            Constraint::Length(10),
            Constraint::Min(8),
            Constraint::Min(8),
            Constraint::Min(8),
        ];
        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, area);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
        let items = vec![
            ListItem::new(format!("Start: {}", fmt(self.range.map(|r| r.start)))),
            ListItem::new(format!("End:   {}", fmt(self.range.map(|r| r.end)))),
        ];

        let list = List::new(items)
            .block(Block::default().title("Range").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing_date {
            let hint = Paragraph::new(format!("> {}", self.date_input))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ field  ←/→ ±1 day  Enter edit  a all  x export  X export+residual  L reload  j/k scroll  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Padded bounds over several `(x, y)` series; `None` when all are empty.
fn series_bounds(series: &[&[(f64, f64)]]) -> Option<([f64; 2], [f64; 2])> {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in series.iter().flat_map(|s| s.iter()) {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !(x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite()) {
        return None;
    }

    // A single date still needs a non-empty x span.
    if x_max <= x_min {
        x_min -= 1.0;
        x_max += 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1.0);
    Some(([x_min, x_max], [y_min - pad, y_max + pad]))
}

fn fmt_axis_date(v: f64) -> String {
    x_to_date(v)
        .map(|d| d.format("%m-%d").to_string())
        .unwrap_or_default()
}

fn fmt_axis_value(v: f64) -> String {
    format!("{v:.0}")
}

fn display_path(path: &Path) -> String {
    path.strip_prefix("./").unwrap_or(path).display().to_string()
}
