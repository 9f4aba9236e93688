//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid per panel), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! One panel per fitted model, laid out side by side. Plot elements:
//! - observed points: `o`
//! - fitted curve: `-` line
//! - residual segments: `:` from each point to the curve

use crate::domain::{FitResult, ModelSet, Observation};
use crate::math::linspace;
use crate::models::{predict, predict_many};

/// Separator between adjacent panels.
const PANEL_GAP: &str = "   ";

/// Render one panel per fit, side by side.
pub fn render_panels(
    points: &[Observation],
    fits: &[FitResult],
    model_set: ModelSet,
    smooth_points: usize,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((x_min, x_max)) = x_range(points) else {
        return "Plot: no data\n".to_string();
    };

    let panels: Vec<Vec<String>> = fits
        .iter()
        .map(|fit| render_panel(points, fit, model_set, (x_min, x_max), smooth_points, width, height))
        .collect();
    let n_rows = panels.iter().map(Vec::len).max().unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.3}, {x_max:.3}] | o data, - fit, : residual\n"
    ));
    for i in 0..n_rows {
        let cells: Vec<String> = panels
            .iter()
            .map(|p| format!("{:<width$}", p.get(i).map(String::as_str).unwrap_or("")))
            .collect();
        out.push_str(cells.join(PANEL_GAP).trim_end());
        out.push('\n');
    }
    out
}

fn render_panel(
    points: &[Observation],
    fit: &FitResult,
    model_set: ModelSet,
    (x_min, x_max): (f64, f64),
    smooth_points: usize,
    width: usize,
    height: usize,
) -> Vec<String> {
    let kind = fit.model.kind;
    let params = &fit.model.params;

    let curve: Vec<(f64, f64)> = linspace(x_min, x_max, smooth_points.max(2))
        .into_iter()
        .map(|x| (x, predict(kind, x, params)))
        .collect();
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let fitted = predict_many(kind, &xs, params);

    let (y_min, y_max) = y_range(points, &curve, &fitted).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first, then residual segments fill the gaps, then points on top.
    draw_curve(&mut grid, &curve, x_min, x_max, y_min, y_max);
    for (p, &y_fit) in points.iter().zip(fitted.iter()) {
        if !y_fit.is_finite() {
            continue;
        }
        let x = map_x(p.x, x_min, x_max, width);
        let y0 = map_y(p.y_obs, y_min, y_max, height);
        let y1 = map_y(y_fit, y_min, y_max, height);
        draw_line(&mut grid, x, y0, x, y1, ':');
    }
    for p in points {
        let x = map_x(p.x, x_min, x_max, width);
        let y = map_y(p.y_obs, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut lines = Vec::with_capacity(height + 3);
    lines.push(truncate(&kind.panel_title(), width));
    if model_set.titles_with_stats() {
        lines.push(truncate(&format!("Reduced χ² = {:.2}", fit.quality.chi2), width));
        lines.push(truncate(&format!("BIC = {:.2}", fit.quality.bic), width));
    }
    for row in grid {
        lines.push(row.into_iter().collect());
    }
    lines.push(truncate(&format!("y=[{y_min:.2}, {y_max:.2}]"), width));
    lines
}

fn x_range(points: &[Observation]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_range(points: &[Observation], curve: &[(f64, f64)], fitted: &[f64]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    let values = points
        .iter()
        .map(|p| p.y_obs)
        .chain(curve.iter().map(|&(_, y)| y))
        .chain(fitted.iter().copied())
        .filter(|y| y.is_finite());
    for y in values {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, cx, cy, '-'),
            None => grid[cy][cx] = '-',
        }
        prev = Some((cx, cy));
    }
}

/// Integer line drawing (Bresenham-ish). Only blank cells are written.
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

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, FittedModel, ModelKind, SolverSummary};

    fn points(ys: &[f64]) -> Vec<Observation> {
        ys.iter()
            .enumerate()
            .map(|(index, &y_obs)| Observation {
                index,
                x: index as f64,
                y_obs,
                sigma: 1.0,
            })
            .collect()
    }

    fn fit(kind: ModelKind, params: Vec<f64>, chi2: f64, bic: f64) -> FitResult {
        FitResult {
            model: FittedModel {
                kind,
                display_name: kind.display_name().to_string(),
                params,
            },
            quality: FitQuality {
                chi2,
                chi2_per_dof: 0.0,
                bic,
                bic_gaussian: 0.0,
                sse: 0.0,
                rmse: 0.0,
                n: 5,
                k: kind.param_count(),
            },
            solver: SolverSummary {
                iterations: 0,
                evals: 0,
                start: 0,
                message: String::new(),
            },
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let pts = points(&[0.0, 2.0, 1.0, 3.0, 4.0]);
        let fits = vec![
            fit(ModelKind::Linear, vec![1.0, 0.0], 0.0, 0.0),
            fit(ModelKind::Quadratic, vec![0.0, 0.0, 2.0], 0.0, 0.0),
        ];

        let txt = render_panels(&pts, &fits, ModelSet::Trend, 5, 16, 6);
        let expected = concat!(
            "Plot: x=[0.000, 4.000] | o data, - fit, : residual\n",
            "Linear Fit (2-P.   Quadratic Fit (.\n",
            "             --o                  o\n",
            "           o-                 o   :\n",
            "         --                   :   :\n",
            "    o ---          ----o-----------\n",
            "  ----  o          :       o\n",
            "o-                 o\n",
            "y=[-0.20, 4.20]    y=[-0.20, 4.20]\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn ephemeris_titles_carry_statistics() {
        let pts = points(&[0.0, 1.0, 2.5, 3.0]);
        let fits = vec![fit(ModelKind::LinearEphemeris, vec![0.0, 1.0], 1.234, 7.891)];

        let txt = render_panels(&pts, &fits, ModelSet::Ephemeris, 20, 40, 8);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[1], "Linear Fit (2-Parameter Model)");
        assert_eq!(lines[2], "Reduced χ² = 1.23");
        assert_eq!(lines[3], "BIC = 7.89");
        // header + 3 title lines + grid + y-range footer
        assert_eq!(lines.len(), 1 + 3 + 8 + 1);
    }

    #[test]
    fn trend_titles_have_no_statistics() {
        let pts = points(&[0.0, 1.0, 2.5, 3.0]);
        let fits = vec![fit(ModelKind::Linear, vec![1.0, 0.0], 1.0, 2.0)];
        let txt = render_panels(&pts, &fits, ModelSet::Trend, 20, 40, 8);
        assert!(!txt.contains("BIC"));
        assert_eq!(txt.lines().count(), 1 + 1 + 8 + 1);
    }

    #[test]
    fn residual_segments_connect_points_to_curve() {
        // Flat curve at 0 with one point far above it.
        let pts = points(&[0.0, 10.0, 0.0]);
        let fits = vec![fit(ModelKind::Linear, vec![0.0, 0.0], 0.0, 0.0)];
        let txt = render_panels(&pts, &fits, ModelSet::Trend, 10, 11, 6);
        let grid: Vec<&str> = txt.lines().skip(2).take(6).collect();

        let col = 5;
        let column: String = grid.iter().map(|row| row.chars().nth(col).unwrap_or(' ')).collect();
        assert_eq!(column, "o::::-");
    }

    #[test]
    fn empty_points_render_placeholder() {
        assert_eq!(render_panels(&[], &[], ModelSet::Trend, 10, 20, 5), "Plot: no data\n");
    }
}
