//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - density curve: `-` line
//! - peak marker: dashed `:` column
//! - peak point: `X`

use crate::domain::{ChartStyle, PeakPoint, ReportFile};
use crate::report::{format_currency, peak_amount_label, peak_density_label};

/// Render the density chart of a finished report.
pub fn render_ascii_density(report: &ReportFile, style: &ChartStyle, width: usize, height: usize) -> String {
    let curve = report.grid.points();
    render_density_plot(&curve, &report.peak, style, width, height)
}

fn render_density_plot(
    curve: &[(f64, f64)],
    peak: &PeakPoint,
    style: &ChartStyle,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(curve).unwrap_or((0.0, 1.0));
    // Densities are non-negative; anchor the baseline at zero.
    let y_min = 0.0;
    let y_max = y_top(curve).unwrap_or(1.0) * 1.05;

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so the marker only fills empty cells.
    draw_curve(&mut grid, curve, x_min, x_max, y_min, y_max);

    let marker_x = map_x(peak.sale_amount, x_min, x_max, width);
    for (row_idx, row) in grid.iter_mut().enumerate() {
        if row_idx % 2 == 0 && row[marker_x] == ' ' {
            row[marker_x] = ':';
        }
    }
    let marker_y = map_y(peak.density, y_min, y_max, height);
    grid[marker_y][marker_x] = 'X';

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {}=[{}, {}] | {} x{}=[{:.1}, {:.1}]\n",
        style.x_label.to_lowercase(),
        format_currency(x_min),
        format_currency(x_max),
        style.y_label.to_lowercase(),
        style.density_scale,
        y_min * style.density_scale,
        y_max * style.density_scale,
    ));
    out.push_str(&format!(
        "{} | {}\n",
        peak_amount_label(peak),
        peak_density_label(peak, style)
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn x_range(curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &(x, _) in curve {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_top(curve: &[(f64, f64)]) -> Option<f64> {
    let max_y = curve.iter().map(|&(_, y)| y).fold(f64::NEG_INFINITY, f64::max);
    if max_y.is_finite() && max_y > 0.0 { Some(max_y) } else { None }
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
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let gx = map_x(x, x_min, x_max, width);
        let gy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            if (x0, y0) != (gx, gy) {
                draw_line(grid, x0, y0, gx, gy, '-');
            }
        } else {
            grid[gy][gx] = '-';
        }
        prev = Some((gx, gy));
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

#[cfg(test)]
mod tests {
    use super::*;

    fn tent() -> Vec<(f64, f64)> {
        vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]
    }

    #[test]
    fn peak_is_marked_on_the_top_row() {
        let peak = PeakPoint { sale_amount: 1.0, density: 1.0 };
        let txt = render_density_plot(&tent(), &peak, &ChartStyle::default(), 10, 5);
        let lines: Vec<&str> = txt.lines().collect();

        assert_eq!(lines.len(), 2 + 5);
        assert_eq!(lines[1], "Max Probability Point: $1.00 | Highest Probability: 100000.00000");
        // x=1.0 maps to column round(0.5 * 9) = 5.
        assert_eq!(lines[2].chars().nth(5), Some('X'));
        // Bottom row under the peak is empty of curve, so the dashed marker shows.
        assert_eq!(lines[6].chars().nth(5), Some(':'));
        assert_eq!(lines[6].chars().next(), Some('-'));
    }

    #[test]
    fn plot_is_deterministic() {
        let peak = PeakPoint { sale_amount: 1.0, density: 1.0 };
        let style = ChartStyle::default();
        let a = render_density_plot(&tent(), &peak, &style, 40, 12);
        let b = render_density_plot(&tent(), &peak, &style, 40, 12);
        assert_eq!(a, b);
    }

    #[test]
    fn tiny_sizes_are_clamped() {
        let peak = PeakPoint { sale_amount: 1.0, density: 1.0 };
        let txt = render_density_plot(&tent(), &peak, &ChartStyle::default(), 1, 1);
        assert_eq!(txt.lines().count(), 2 + 5);
        assert!(txt.lines().skip(2).all(|l| l.chars().count() == 10));
    }
}
