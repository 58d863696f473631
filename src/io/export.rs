//! Export the sampled density grid to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::ReportFile;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct GridRow {
    sale: f64,
    density: f64,
    density_scaled: f64,
    is_peak: bool,
}

/// Write one row per grid point; the peak row is flagged.
pub fn write_grid_csv(path: &Path, report: &ReportFile, density_scale: f64) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::export(format!("Failed to create grid CSV '{}': {e}", path.display())))?;

    for (&sale, &density) in report.grid.sale.iter().zip(report.grid.density.iter()) {
        writer
            .serialize(GridRow {
                sale,
                density,
                density_scaled: density * density_scale,
                is_peak: sale == report.peak.sale_amount && density == report.peak.density,
            })
            .map_err(|e| AppError::export(format!("Failed to write grid CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::export(format!("Failed to flush grid CSV: {e}")))?;

    info!(path = %path.display(), rows = report.grid.len(), "wrote density grid CSV");
    Ok(())
}
