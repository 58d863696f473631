//! Read/write report JSON files.
//!
//! Report JSON is the "portable" representation of a finished run:
//! - source + window bounds + row counts
//! - series stats and the bandwidth that was used
//! - the peak and the full sampled density grid for re-plotting
//!
//! The schema is defined by `domain::ReportFile`.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::domain::ReportFile;
use crate::error::AppError;

/// Write a report JSON file.
pub fn write_report_json(path: &Path, report: &ReportFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::export(format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::export(format!("Failed to write report JSON: {e}")))?;

    info!(path = %path.display(), "wrote report JSON");
    Ok(())
}

/// Read a report JSON file.
pub fn read_report_json(path: &Path) -> Result<ReportFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::load(format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let report: ReportFile =
        serde_json::from_reader(file).map_err(|e| AppError::load(format!("Invalid report JSON: {e}")))?;

    if report.grid.sale.len() != report.grid.density.len() {
        return Err(AppError::load(format!(
            "Invalid report JSON: grid has {} sale values but {} densities.",
            report.grid.sale.len(),
            report.grid.density.len()
        )));
    }
    Ok(report)
}
