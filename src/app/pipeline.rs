//! Shared report pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> trailing window -> sale series -> density -> peak
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! Every call starts from a clean slate; nothing is cached between runs.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::analysis::{estimate_density, locate_peak, trailing_window};
use crate::domain::{
    BadRowPolicy, BandwidthRule, ChartStyle, DensityEstimate, PeakPoint, ReportConfig, ReportFile, RowError,
    SalesTable, SeriesStats, TrailingWindow,
};
use crate::error::AppError;
use crate::io::ingest::load_sales_table;

/// All computed outputs of a single report run.
#[derive(Debug, Clone)]
pub struct DensityReport {
    pub source: PathBuf,
    pub rows_read: usize,
    pub rows_used: usize,
    pub row_errors: Vec<RowError>,
    pub window: TrailingWindow,
    pub stats: SeriesStats,
    pub estimate: DensityEstimate,
    pub peak: PeakPoint,
}

impl DensityReport {
    pub fn to_file(&self) -> ReportFile {
        ReportFile {
            tool: "salesdens".to_string(),
            source: self.source.clone(),
            trailing_days: self.window.trailing_days,
            latest: self.window.latest,
            cutoff: self.window.cutoff,
            rows_read: self.rows_read,
            rows_used: self.rows_used,
            rows_in_window: self.window.records.len(),
            stats: self.stats.clone(),
            bandwidth_rule: self.estimate.bandwidth_rule,
            bandwidth: self.estimate.bandwidth,
            peak: self.peak,
            grid: self.estimate.grid.clone(),
        }
    }
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_report(config: &ReportConfig) -> Result<DensityReport, AppError> {
    // 1) Load + normalize timestamps.
    let table = load_sales_table(&config.source, config.bad_rows)?;

    run_report_with_table(&table, config.trailing_days, config.bandwidth)
}

/// Execute the pipeline on an already loaded table.
///
/// [`run_report`] delegates here after loading; tests drive it with
/// in-memory tables.
pub fn run_report_with_table(
    table: &SalesTable,
    trailing_days: u32,
    bandwidth: BandwidthRule,
) -> Result<DensityReport, AppError> {
    // 2) Trailing window.
    let window = trailing_window(table, trailing_days)?;

    // 3) Sale series.
    let series = window.sales();
    let stats = crate::math::describe(&series)
        .ok_or_else(|| AppError::empty_data("Trailing window produced no sale values."))?;

    // 4) Density + peak.
    let estimate = estimate_density(&series, bandwidth)?;
    let peak = locate_peak(&estimate.grid)?;

    info!(
        source = %table.source.display(),
        trailing_days,
        window_rows = window.records.len(),
        bandwidth = estimate.bandwidth,
        peak_sale = peak.sale_amount,
        peak_density = peak.density,
        "built density report"
    );

    Ok(DensityReport {
        source: table.source.clone(),
        rows_read: table.rows_read,
        rows_used: table.rows_used(),
        row_errors: table.row_errors.clone(),
        window,
        stats,
        estimate,
        peak,
    })
}

/// Load `source`, window it to `trailing_days`, and render the annotated
/// density chart as terminal text.
pub fn render(
    source: &Path,
    trailing_days: u32,
    style: &ChartStyle,
    width: usize,
    height: usize,
) -> Result<String, AppError> {
    let table = load_sales_table(source, BadRowPolicy::Strict)?;
    let report = run_report_with_table(&table, trailing_days, BandwidthRule::Scott)?;
    Ok(crate::plot::render_ascii_density(&report.to_file(), style, width, height))
}
