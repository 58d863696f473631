//! SVG chart export via Plotters.
//!
//! Produces the full annotated chart: filled density curve, dashed-style
//! peak marker, peak labels, and a legend. Text layout uses Plotters' naive
//! font metrics, so no system font stack is needed.

use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use crate::domain::{ChartStyle, ReportFile, Rgb};
use crate::error::AppError;
use crate::report::{format_axis_density, format_currency, peak_amount_label, peak_density_label};

/// Write the annotated density chart to an SVG file.
pub fn write_density_svg(
    path: &Path,
    report: &ReportFile,
    style: &ChartStyle,
    size: (u32, u32),
) -> Result<(), AppError> {
    if report.grid.len() < 2 {
        return Err(AppError::render("Density grid needs at least 2 points to draw."));
    }
    if !(report.peak.density.is_finite() && report.peak.density > 0.0) {
        return Err(AppError::render("Peak density must be finite and > 0 to scale the chart."));
    }
    draw_density(path, report, style, size)
        .map_err(|e| AppError::render(format!("Failed to draw SVG '{}': {e}", path.display())))?;
    info!(path = %path.display(), width = size.0, height = size.1, "wrote density SVG");
    Ok(())
}

fn draw_density(
    path: &Path,
    report: &ReportFile,
    style: &ChartStyle,
    size: (u32, u32),
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let x0 = report.grid.sale[0];
    let x1 = report.grid.sale[report.grid.len() - 1];
    let y1 = report.peak.density * 1.15;

    let curve_color = rgb(style.curve_color);
    let fill_color = rgb(style.fill_color);
    let peak_color = rgb(style.peak_color);
    let line_width = style.line_width;
    let scale = style.density_scale;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20).x_label_area_size(50).y_label_area_size(80);
    if !style.title.is_empty() {
        builder.caption(&style.title, ("sans-serif", 24));
    }
    let mut chart = builder.build_cartesian_2d(x0..x1, 0.0..y1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .x_label_formatter(&|v| format_currency(*v))
        .y_label_formatter(&|v| format_axis_density(*v, scale))
        .label_style(("sans-serif", 14))
        .draw()?;

    // 1) Filled density curve.
    chart
        .draw_series(
            AreaSeries::new(report.grid.points(), 0.0, fill_color.mix(0.4))
                .border_style(curve_color.stroke_width(line_width)),
        )?
        .label(style.series_label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], curve_color.stroke_width(line_width)));

    // 2) Peak marker, drawn as short dashes up to the top of the chart.
    let peak_x = report.peak.sale_amount;
    let dashes = 24;
    let step = y1 / (dashes as f64 * 2.0);
    chart
        .draw_series((0..dashes).map(|i| {
            let y_start = step * (2 * i) as f64;
            PathElement::new(
                vec![(peak_x, y_start), (peak_x, y_start + step)],
                peak_color.stroke_width(line_width),
            )
        }))?
        .label(peak_amount_label(&report.peak))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], peak_color.stroke_width(line_width)));

    // 3) Annotations at the peak.
    let peak_coord = (peak_x, report.peak.density);
    chart.draw_series(std::iter::once(
        EmptyElement::at(peak_coord)
            + Text::new(
                peak_density_label(&report.peak, style),
                (20, -30),
                ("sans-serif", 12).into_font().color(&peak_color),
            ),
    ))?;
    chart.draw_series(std::iter::once(
        EmptyElement::at(peak_coord)
            + Text::new(
                format_currency(peak_x),
                (50, -6),
                ("sans-serif", 16).into_font().color(&peak_color),
            ),
    ))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}
