//! Plotters-powered density chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::Rgb;

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: the curve and bounds are computed
/// outside the render call. This keeps `render()` focused on drawing.
pub struct DensityPlottersChart<'a> {
    /// Sampled density curve.
    pub curve: &'a [(f64, f64)],
    /// Peak `(sale, density)`; drawn as a vertical marker plus a dot.
    pub peak: (f64, f64),
    /// X bounds (sale amount).
    pub x_bounds: [f64; 2],
    /// Y bounds (raw density).
    pub y_bounds: [f64; 2],
    pub curve_color: Rgb,
    pub peak_color: Rgb,
}

impl<'a> Widget for DensityPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let curve_color = RGBColor(self.curve_color.0, self.curve_color.1, self.curve_color.2);
        let peak_color = RGBColor(self.peak_color.0, self.peak_color.1, self.peak_color.2);
        let (peak_x, peak_y) = self.peak;

        let widget = widget_fn(move |root| {
            // Axis labels are drawn by the caller as Ratatui text, so the chart
            // itself only needs a thin frame.
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(0)
                .y_labels(0)
                .axis_style(&WHITE)
                .draw()?;

            // 1) Density curve.
            chart.draw_series(LineSeries::new(self.curve.iter().copied(), &curve_color))?;

            // 2) Dashed peak marker: alternate short segments from the baseline up.
            let dashes = 12;
            let step = (y1 - y0) / (dashes as f64 * 2.0);
            chart.draw_series((0..dashes).map(|i| {
                let start = y0 + step * (2 * i) as f64;
                PathElement::new(vec![(peak_x, start), (peak_x, start + step)], peak_color)
            }))?;

            // 3) Peak point. A `Pixel` instead of `Circle`: the backend scales
            // circle radii in canvas units, which blows them up.
            chart.draw_series(std::iter::once(Pixel::new((peak_x, peak_y), peak_color)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
