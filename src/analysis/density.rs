//! Density estimate over the windowed sale series and its peak.

use tracing::debug;

use crate::domain::{BandwidthRule, DENSITY_GRID_POINTS, DensityEstimate, DensityGrid, PeakPoint};
use crate::error::AppError;
use crate::math::{GaussianKde, distinct_count, lin_space, min_max};

/// Fit a Gaussian KDE to `series` and sample it on a
/// [`DENSITY_GRID_POINTS`]-point grid over `[min, max]`.
pub fn estimate_density(series: &[f64], rule: BandwidthRule) -> Result<DensityEstimate, AppError> {
    let distinct = distinct_count(series);
    if distinct < 2 {
        return Err(AppError::insufficient_data(format!(
            "Density estimation needs at least 2 distinct sale values; the window has {} value(s), {distinct} distinct.",
            series.len()
        )));
    }

    let kde = GaussianKde::fit(series, rule).ok_or_else(|| {
        AppError::insufficient_data("Sale series is degenerate (zero or non-finite bandwidth).")
    })?;

    let (lo, hi) = min_max(series)
        .ok_or_else(|| AppError::insufficient_data("Sale series has no finite range."))?;
    let xs = lin_space(lo, hi, DENSITY_GRID_POINTS)?;
    let ys = kde.evaluate_grid(&xs);

    debug!(n = series.len(), bandwidth = kde.bandwidth(), rule = ?rule, "estimated density");

    Ok(DensityEstimate {
        bandwidth_rule: rule,
        bandwidth: kde.bandwidth(),
        grid: DensityGrid { sale: xs, density: ys },
    })
}

/// First grid point of maximal density.
pub fn locate_peak(grid: &DensityGrid) -> Result<PeakPoint, AppError> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &y) in grid.density.iter().enumerate() {
        if !y.is_finite() {
            continue;
        }
        match best {
            Some((_, b)) if y <= b => {}
            _ => best = Some((idx, y)),
        }
    }

    let (idx, density) =
        best.ok_or_else(|| AppError::insufficient_data("Density grid has no finite values."))?;
    Ok(PeakPoint {
        sale_amount: grid.sale[idx],
        density,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skewed_series() -> Vec<f64> {
        let mut v = vec![10.0; 9];
        v.push(1000.0);
        v
    }

    #[test]
    fn grid_has_fixed_size_and_spans_series() {
        let est = estimate_density(&[3.0, 9.5, 4.0, 7.25], BandwidthRule::Scott).unwrap();
        assert_eq!(est.grid.len(), DENSITY_GRID_POINTS);
        assert_eq!(est.grid.density.len(), DENSITY_GRID_POINTS);
        assert_eq!(est.grid.sale[0], 3.0);
        assert_eq!(est.grid.sale[DENSITY_GRID_POINTS - 1], 9.5);
    }

    #[test]
    fn dominant_mode_wins_over_outlier() {
        let est = estimate_density(&skewed_series(), BandwidthRule::Scott).unwrap();
        let peak = locate_peak(&est.grid).unwrap();
        assert!(peak.sale_amount >= 10.0 && peak.sale_amount <= 1000.0);
        assert!(peak.sale_amount < 100.0, "peak at {}", peak.sale_amount);
        assert!(peak.density > 0.0);
    }

    #[test]
    fn repeated_estimates_are_bit_identical() {
        let a = estimate_density(&skewed_series(), BandwidthRule::Silverman).unwrap();
        let b = estimate_density(&skewed_series(), BandwidthRule::Silverman).unwrap();
        let pa = locate_peak(&a.grid).unwrap();
        let pb = locate_peak(&b.grid).unwrap();
        assert_eq!(pa.sale_amount.to_bits(), pb.sale_amount.to_bits());
        assert_eq!(pa.density.to_bits(), pb.density.to_bits());
    }

    #[test]
    fn identical_sales_are_insufficient() {
        let err = estimate_density(&[42.0; 5], BandwidthRule::Scott).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InsufficientData);
    }

    #[test]
    fn locate_peak_prefers_first_maximum() {
        let grid = DensityGrid {
            sale: vec![1.0, 2.0, 3.0, 4.0],
            density: vec![0.1, 0.4, 0.4, 0.2],
        };
        let peak = locate_peak(&grid).unwrap();
        assert_eq!(peak.sale_amount, 2.0);
        assert_eq!(peak.density, 0.4);
    }
}
