//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing the source file, the
//! trailing window, and the bandwidth rule, then renders the density chart
//! with its peak annotations. Every settings change re-runs the full report
//! pipeline from the file on disk.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use tracing::{info, warn};

use crate::app::pipeline::DensityReport;
use crate::cli::TuiArgs;
use crate::cli::picker::{discover_source_files, pretty_path, validate_source_path};
use crate::domain::{BandwidthRule, ChartStyle, ReportConfig, TRAILING_DAY_PRESETS};
use crate::error::AppError;
use crate::report::{format_axis_density, format_currency, peak_amount_label, peak_density_label};

mod plotters_chart;

use plotters_chart::DensityPlottersChart;

const FIELD_COUNT: usize = 3;

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    let mut app = App::new(&args)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::render(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::render(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::render(format!("Failed to enter alternate screen: {e}")));
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
    files: Vec<PathBuf>,
    selected_file: usize,
    config: ReportConfig,
    selected_field: usize,
    status: String,
    report: Option<DensityReport>,
}

impl App {
    fn new(args: &TuiArgs) -> Result<Self, AppError> {
        let mut files = discover_source_files();
        let selected_file = match &args.source.file {
            Some(path) => {
                let path = validate_source_path(path)?;
                match files.iter().position(|f| same_file(f, &path)) {
                    Some(idx) => idx,
                    None => {
                        files.insert(0, path);
                        0
                    }
                }
            }
            None => 0,
        };

        let Some(source) = files.get(selected_file).cloned() else {
            return Err(AppError::usage(
                "No spreadsheet or CSV files found. Provide one with `salesdens -f <file.xlsx>`.",
            ));
        };

        let mut config = ReportConfig::for_source(source);
        config.trailing_days = args.source.days;
        config.bandwidth = args.source.bandwidth;
        config.bad_rows = args.source.on_bad_row;

        let mut app = Self {
            files,
            selected_file,
            config,
            selected_field: 0,
            status: String::new(),
            report: None,
        };
        app.rerun();
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::render(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::render(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::render(format!("Event read error: {e}")))? {
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

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char('p') => {
                self.config.trailing_days = next_preset(self.config.trailing_days);
                self.rerun();
            }
            KeyCode::Char('r') => self.rerun(),
            KeyCode::Char('s') => self.export_svg(),
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            0 => {
                if self.files.is_empty() {
                    return;
                }
                let n = self.files.len();
                self.selected_file = if delta >= 0 {
                    (self.selected_file + 1) % n
                } else {
                    (self.selected_file + n - 1) % n
                };
                self.config.source = self.files[self.selected_file].clone();
            }
            1 => {
                self.config.trailing_days = if delta >= 0 {
                    self.config.trailing_days.saturating_add(1)
                } else {
                    self.config.trailing_days.saturating_sub(1)
                };
            }
            2 => {
                self.config.bandwidth = match self.config.bandwidth {
                    BandwidthRule::Scott => BandwidthRule::Silverman,
                    BandwidthRule::Silverman => BandwidthRule::Scott,
                };
            }
            _ => return,
        }
        self.rerun();
    }

    /// Re-execute the whole pipeline for the current settings.
    ///
    /// A failure clears the chart and names the failing stage in the status line.
    fn rerun(&mut self) {
        match crate::app::pipeline::run_report(&self.config) {
            Ok(report) => {
                self.status = format!(
                    "{} | {}",
                    peak_amount_label(&report.peak),
                    peak_density_label(&report.peak, &self.config.style)
                );
                self.report = Some(report);
            }
            Err(err) => {
                warn!(error = %err, source = %self.config.source.display(), "report failed");
                self.status = err.to_string();
                self.report = None;
            }
        }
    }

    fn export_svg(&mut self) {
        let Some(report) = &self.report else {
            self.status = "Nothing to export.".to_string();
            return;
        };
        let stem = self
            .config
            .source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("sales");
        let path = PathBuf::from(format!("{stem}_{}d_density.svg", self.config.trailing_days));
        match crate::plot::write_density_svg(&path, &report.to_file(), &self.config.style, self.config.svg_size) {
            Ok(()) => {
                info!(path = %path.display(), "exported SVG from TUI");
                self.status = format!("Wrote {}", path.display());
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("salesdens", Style::default().fg(Color::Cyan)),
            Span::raw(" - trailing-window sales density"),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "source: {} | last {} day(s) | bandwidth: {}",
                pretty_path(&self.config.source),
                self.config.trailing_days,
                self.config.bandwidth.display_name(),
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(report) = &self.report {
            lines.push(Line::from(Span::styled(
                format!(
                    "window: {} -> {} | n={} | h={:.4}",
                    report.window.cutoff,
                    report.window.latest,
                    report.window.records.len(),
                    report.estimate.bandwidth,
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(6)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(self.config.style.series_label.as_str())
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(report) = &self.report else {
            let msg = Paragraph::new("No chart: see the status line for the failed stage.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let curve = report.estimate.grid.points();
        let (x_bounds, y_bounds) = chart_bounds(&curve);
        let style = &self.config.style;

        let (chart_rect, insets) = chart_layout(inner);
        let widget = DensityPlottersChart {
            curve: &curve,
            peak: (report.peak.sale_amount, report.peak.density),
            x_bounds,
            y_bounds,
            curve_color: style.curve_color,
            peak_color: style.peak_color,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, style);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!(
                "File ({}/{}): {}",
                self.selected_file + 1,
                self.files.len(),
                pretty_path(&self.config.source)
            )),
            ListItem::new(format!("Last days: {}", self.config.trailing_days)),
            ListItem::new(format!("Bandwidth: {}", self.config.bandwidth.display_name())),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  p 30/60 days  s export svg  r reload  q quit";
        let status_style = if self.report.is_some() {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, status_style),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn same_file(a: &std::path::Path, b: &std::path::Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Cycle through the window presets; a custom value jumps to the first preset.
fn next_preset(current: u32) -> u32 {
    match TRAILING_DAY_PRESETS.iter().position(|&d| d == current) {
        Some(idx) => TRAILING_DAY_PRESETS[(idx + 1) % TRAILING_DAY_PRESETS.len()],
        None => TRAILING_DAY_PRESETS[0],
    }
}

/// X spans the grid; Y runs from zero to the peak plus headroom.
fn chart_bounds(curve: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let (mut x0, mut x1) = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y1 = f64::NEG_INFINITY;
    for &(x, y) in curve {
        x0 = x0.min(x);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    if !x0.is_finite() || !x1.is_finite() || x1 <= x0 {
        x0 = 0.0;
        x1 = 1.0;
    }
    if !y1.is_finite() || y1 <= 0.0 {
        y1 = 1.0;
    }
    ([x0, x1], [0.0, y1 * 1.1])
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 4,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    style: &ChartStyle,
) {
    let ticks = 5usize;
    let tick_style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = format_currency(x_val);
        let label_len = label.chars().count() as u16;
        let start = x
            .saturating_sub(label_len / 2)
            .min((inner.x + inner.width).saturating_sub(label_len));
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(tick_style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format_axis_density(y_val, style.density_scale);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(tick_style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new(style.x_label.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(style.y_label.as_str())
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1).max(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_cycle_and_custom_values_reset() {
        assert_eq!(next_preset(30), 60);
        assert_eq!(next_preset(60), 30);
        assert_eq!(next_preset(45), 30);
    }

    #[test]
    fn chart_bounds_start_at_zero_density() {
        let (x, y) = chart_bounds(&[(10.0, 0.001), (20.0, 0.004), (30.0, 0.002)]);
        assert_eq!(x, [10.0, 30.0]);
        assert_eq!(y[0], 0.0);
        assert!((y[1] - 0.0044).abs() < 1e-12);
    }

    #[test]
    fn chart_layout_reserves_axis_space() {
        let inner = Rect { x: 0, y: 0, width: 80, height: 20 };
        let (rect, insets) = chart_layout(inner);
        assert!(insets.is_some());
        assert_eq!(rect.x, 9);
        assert_eq!(rect.width, 80 - 9 - 4);
    }
}
