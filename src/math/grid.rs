//! Evaluation grids.

use crate::error::AppError;

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
///
/// The last point is pinned to `max` exactly so callers can rely on the grid
/// spanning the full closed interval.
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AppError::insufficient_data(format!(
            "Invalid grid range: min={min}, max={max} (must be finite and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::usage("Grid steps must be >= 2."));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps - 1 {
        out.push(min + step * i as f64);
    }
    out.push(max);
    Ok(out)
}
