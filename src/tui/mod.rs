//! Ratatui-based terminal UI.
//!
//! The TUI renders one Plotters panel per fitted model side by side (data
//! points, fitted curve, residual segments) with a settings panel for the model
//! set, noise level, sample size, start count and seed. Every change refits.

use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::{RunOutput, run_fit};
use crate::domain::{FitConfig, FitResult};
use crate::error::AppError;
use crate::math::linspace;
use crate::models::predict;

mod plotters_chart;

use plotters_chart::ModelPanelChart;

/// Number of rows in the settings list.
const SETTINGS_FIELDS: usize = 5;
/// Start counts cycled by the `s` key.
const START_CYCLE: [usize; 4] = [1, 4, 8, 16];
/// Noise step for `+`/`-` and ←/→ on the noise field.
const NOISE_STEP: f64 = 0.5;

/// Start the TUI.
pub fn run(config: FitConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
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
    config: FitConfig,
    selected_field: usize,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(config: FitConfig) -> Self {
        let mut app = Self {
            config,
            selected_field: 0,
            status: String::new(),
            run: None,
        };
        app.refit();
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

    /// Apply a key press; returns `true` when the UI should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < SETTINGS_FIELDS {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char('r') => {
                self.config.sample_seed = self.config.sample_seed.wrapping_add(1);
                self.refit();
            }
            KeyCode::Char('m') => self.toggle_model_set(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.step_noise(1.0),
            KeyCode::Char('-') => self.step_noise(-1.0),
            KeyCode::Char('s') => {
                let pos = START_CYCLE.iter().position(|&s| s == self.config.starts);
                let next = pos.map(|i| (i + 1) % START_CYCLE.len()).unwrap_or(0);
                self.config.starts = START_CYCLE[next];
                self.refit();
            }
            KeyCode::Char('d') => self.write_debug(),
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            0 => self.toggle_model_set(),
            1 => self.step_noise(delta as f64),
            2 => {
                let next = if delta >= 0 {
                    self.config.sample_count.saturating_add(5)
                } else {
                    self.config.sample_count.saturating_sub(5)
                };
                self.config.sample_count = next.max(5);
                self.refit();
            }
            3 => {
                self.config.starts = if delta >= 0 {
                    self.config.starts.saturating_add(1)
                } else {
                    self.config.starts.saturating_sub(1).max(1)
                };
                self.refit();
            }
            4 => {
                self.config.sample_seed = if delta >= 0 {
                    self.config.sample_seed.wrapping_add(1)
                } else {
                    self.config.sample_seed.wrapping_sub(1)
                };
                self.refit();
            }
            _ => {}
        }
    }

    /// Switch the model set; the noise level follows the new set's default.
    fn toggle_model_set(&mut self) {
        self.config.model_set = self.config.model_set.next();
        self.config.noise = self.config.model_set.default_noise();
        self.refit();
    }

    fn step_noise(&mut self, direction: f64) {
        let next = self.config.noise + direction * NOISE_STEP;
        self.config.noise = next.max(0.0);
        self.refit();
    }

    /// Run the pipeline with the current settings.
    ///
    /// Failures are shown in the status line rather than ending the session.
    fn refit(&mut self) {
        match run_fit(&self.config) {
            Ok(run) => {
                self.status = format!(
                    "seed={} noise={:.1} starts={} -> preferred: {}",
                    self.config.sample_seed,
                    self.config.noise,
                    self.config.starts,
                    run.selection.best.model.display_name
                );
                self.run = Some(run);
            }
            Err(err) => {
                log::warn!("refit failed: {err}");
                self.status = format!("Fit failed: {err}");
                self.run = None;
            }
        }
    }

    fn write_debug(&mut self) {
        let Some(run) = &self.run else {
            self.status = "No fit to write.".to_string();
            return;
        };
        self.status = match crate::debug::write_debug_bundle(run, &self.config, Path::new("debug")) {
            Ok(path) => format!("Wrote debug bundle: {}", path.display()),
            Err(err) => format!("Debug write failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("chi2fit", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {} models", self.config.model_set.display_name())),
        ]));

        if let Some(run) = &self.run {
            let best = &run.selection.best;
            lines.push(Line::from(Span::styled(
                format!(
                    "n={} | preferred: {} | chi2={:.2} | bic={:.2}",
                    run.sample.stats.n_points, best.model.display_name, best.quality.chi2, best.quality.bic,
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
            .constraints([Constraint::Min(0), Constraint::Length(7)])
            .split(area);

        self.draw_panels(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_panels(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(run) = &self.run else {
            let msg = Paragraph::new("No fit available (see status line).")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };

        let fits = &run.selection.fits;
        let constraints: Vec<Constraint> = fits
            .iter()
            .map(|_| Constraint::Ratio(1, fits.len().max(1) as u32))
            .collect();
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (fit, &col) in fits.iter().zip(columns.iter()) {
            let series = panel_series(run, fit, self.config.smooth_points);
            let chosen = fit.model.kind == run.selection.best.model.kind;
            let title = panel_title(fit, self.config.model_set.titles_with_stats(), chosen);

            let block = Block::default().title(title).borders(Borders::ALL);
            let inner = block.inner(col);
            frame.render_widget(block, col);
            frame.render_widget(Clear, inner);

            let (r, g, b) = fit.model.kind.panel_rgb();
            let (chart_rect, insets) = chart_layout(inner);
            let widget = ModelPanelChart {
                curve: &series.curve,
                points: &series.points,
                residuals: &series.residuals,
                x_bounds: series.x_bounds,
                y_bounds: series.y_bounds,
                color: RGBColor(r, g, b),
            };
            frame.render_widget(widget, chart_rect);
            if let Some(insets) = insets {
                draw_axis_ticks(frame, inner, chart_rect, insets, series.x_bounds, series.y_bounds);
            }
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!("Model set: {}", self.config.model_set.display_name())),
            ListItem::new(format!("Noise: {:.1}", self.config.noise)),
            ListItem::new(format!("Points: {}", self.config.sample_count)),
            ListItem::new(format!("Starts: {}", self.config.starts)),
            ListItem::new(format!("Seed: {}", self.config.sample_seed)),
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
        let help = "↑/↓ select  ←/→ adjust  r reseed  m set  +/- noise  s starts  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Title of a model panel, e.g. `Linear Fit (2-Parameter Model) | χ²=1.23 BIC=7.89 *`.
fn panel_title(fit: &FitResult, with_stats: bool, chosen: bool) -> String {
    let mut title = fit.model.kind.panel_title();
    if with_stats {
        title.push_str(&format!(
            " | Reduced χ² = {:.2} BIC = {:.2}",
            fit.quality.chi2, fit.quality.bic
        ));
    }
    if chosen {
        title.push_str(" *");
    }
    title
}

/// Precomputed series for one model panel.
#[derive(Debug, Clone)]
struct PanelSeries {
    curve: Vec<(f64, f64)>,
    points: Vec<(f64, f64)>,
    residuals: Vec<[(f64, f64); 2]>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build chart series for one fitted model.
fn panel_series(run: &RunOutput, fit: &FitResult, smooth_points: usize) -> PanelSeries {
    let stats = &run.sample.stats;
    let (mut x0, mut x1) = (stats.x_min, stats.x_max);
    if !(x0.is_finite() && x1.is_finite()) || x1 <= x0 {
        x0 = 0.0;
        x1 = 1.0;
    }
    let x_bounds = [x0, x1];

    let points: Vec<(f64, f64)> = run.sample.points.iter().map(|p| (p.x, p.y_obs)).collect();

    let curve: Vec<(f64, f64)> = linspace(x0, x1, smooth_points.max(2))
        .into_iter()
        .map(|x| (x, predict(fit.model.kind, x, &fit.model.params)))
        .filter(|(_, y)| y.is_finite())
        .collect();

    let residuals: Vec<[(f64, f64); 2]> = run
        .residuals
        .iter()
        .find(|r| r.model == fit.model.kind)
        .map(|r| {
            r.rows
                .iter()
                .map(|row| [(row.point.x, row.point.y_obs), (row.point.x, row.y_fit)])
                .collect()
        })
        .unwrap_or_default();

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in points.iter().chain(curve.iter()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    for seg in &residuals {
        y_min = y_min.min(seg[1].1);
        y_max = y_max.max(seg[1].1);
    }

    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let y_bounds = [y_min - pad, y_max + pad];

    PanelSeries {
        curve,
        points,
        residuals,
        x_bounds,
        y_bounds,
    }
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
        left: 7,
        right: 1,
        top: 0,
        bottom: 1,
    };

    if inner.width <= insets.left + insets.right + 12
        || inner.height <= insets.top + insets.bottom + 6
    {
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
) {
    let ticks = 3usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = format!("{x_val:.1}");
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2).min(inner.x + inner.width - label_len.min(inner.width));
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
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
        let label = format!("{y_val:.1}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }
}
