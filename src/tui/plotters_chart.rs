//! Plotters-powered model panel widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis rendering
//! - arbitrary line segments (the residual markers) without manual rasterizing
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only description of one model panel.
///
/// All series and bounds are computed outside the render call, which keeps
/// `render()` focused on drawing.
pub struct ModelPanelChart<'a> {
    /// Line series for the fitted curve (smooth grid).
    pub curve: &'a [(f64, f64)],
    /// Scatter series for the observations.
    pub points: &'a [(f64, f64)],
    /// Residual segments from each observation to the fitted value.
    pub residuals: &'a [[(f64, f64); 2]],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Curve/residual color of this model slot.
    pub color: RGBColor,
}

impl<'a> Widget for ModelPanelChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area; show a hint instead.
        if area.width < 12 || area.height < 6 {
            buf.set_string(area.x, area.y, "Too small", Style::default().fg(Color::Yellow));
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Axes only; tick labels are drawn by Ratatui around the chart rect.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .axis_style(&WHITE)
                .draw()?;

            let residual_color = self.color.mix(0.6);

            // 1) Residual segments (point -> fitted value).
            for seg in self.residuals {
                chart.draw_series(LineSeries::new(seg.iter().copied(), &residual_color))?;
            }

            // 2) Fitted curve.
            chart.draw_series(LineSeries::new(self.curve.iter().copied(), &self.color))?;

            // 3) Observed points.
            //
            // `Pixel` rather than `Circle`: the ratatui backend maps circle radii
            // to canvas units, which produces oversized markers.
            chart.draw_series(self.points.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
