//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while building a report
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Number of evenly spaced points the density estimate is evaluated at.
pub const DENSITY_GRID_POINTS: usize = 1000;

/// Fixed display rescaling applied to density values in labels and ticks.
///
/// Densities over currency-sized domains are tiny (1e-4 and below); the
/// scaled value is cosmetic and not a probability.
pub const DENSITY_DISPLAY_SCALE: f64 = 100_000.0;

/// Trailing-window presets offered by the interactive picker.
pub const TRAILING_DAY_PRESETS: [u32; 2] = [30, 60];

/// Bandwidth selector for the Gaussian kernel density estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BandwidthRule {
    /// `h = σ · n^(-1/5)` (the common library default).
    Scott,
    /// `h = σ · (3n/4)^(-1/5)`.
    Silverman,
}

impl BandwidthRule {
    pub fn display_name(self) -> &'static str {
        match self {
            BandwidthRule::Scott => "Scott",
            BandwidthRule::Silverman => "Silverman",
        }
    }
}

/// What to do with a row whose date or sale cannot be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BadRowPolicy {
    /// Fail the whole load on the first bad row.
    Strict,
    /// Drop the row and keep a diagnostic for it.
    Skip,
}

/// One row of the source table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalesRecord {
    pub date: NaiveDateTime,
    pub sale: f64,
}

/// A row that was dropped under [`BadRowPolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based row number in the source, header included.
    pub line: usize,
    pub message: String,
}

/// Every record loaded from one source.
#[derive(Debug, Clone)]
pub struct SalesTable {
    pub source: PathBuf,
    pub records: Vec<SalesRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl SalesTable {
    pub fn latest(&self) -> Option<NaiveDateTime> {
        self.records.iter().map(|r| r.date).max()
    }

    pub fn rows_used(&self) -> usize {
        self.records.len()
    }
}

/// Records whose date falls within `trailing_days` of the latest date.
#[derive(Debug, Clone)]
pub struct TrailingWindow {
    pub trailing_days: u32,
    pub latest: NaiveDateTime,
    pub cutoff: NaiveDateTime,
    pub records: Vec<SalesRecord>,
}

impl TrailingWindow {
    pub fn sales(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.sale).collect()
    }
}

/// Summary statistics of the windowed sale series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub n: usize,
    pub distinct: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

/// Density curve sampled on an evenly spaced grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityEstimate {
    pub bandwidth_rule: BandwidthRule,
    pub bandwidth: f64,
    pub grid: DensityGrid,
}

/// Parallel x/y columns so the JSON stays compact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityGrid {
    pub sale: Vec<f64>,
    pub density: Vec<f64>,
}

impl DensityGrid {
    pub fn len(&self) -> usize {
        self.sale.len()
    }

    pub fn points(&self) -> Vec<(f64, f64)> {
        self.sale
            .iter()
            .zip(self.density.iter())
            .map(|(&x, &y)| (x, y))
            .collect()
    }
}

/// Location and height of the density maximum over the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakPoint {
    pub sale_amount: f64,
    pub density: f64,
}

impl PeakPoint {
    pub fn scaled_density(&self, scale: f64) -> f64 {
        self.density * scale
    }
}

/// RGB triple used by [`ChartStyle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Explicit chart styling handed to every renderer.
///
/// Nothing here is process-global; two renders with different styles can
/// run side by side.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub curve_color: Rgb,
    pub fill_color: Rgb,
    pub peak_color: Rgb,
    pub line_width: u32,
    /// Multiplier applied to densities in tick labels and the peak label.
    pub density_scale: f64,
    pub series_label: String,
    pub x_label: String,
    pub y_label: String,
    pub title: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            curve_color: Rgb(0, 0, 255),
            fill_color: Rgb(170, 190, 255),
            peak_color: Rgb(255, 0, 0),
            line_width: 2,
            density_scale: DENSITY_DISPLAY_SCALE,
            series_label: "Sales Distribution".to_string(),
            x_label: "Sales Amount".to_string(),
            y_label: "Probability".to_string(),
            title: String::new(),
        }
    }
}

/// Inputs for a single report run.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub source: PathBuf,
    pub trailing_days: u32,
    pub bandwidth: BandwidthRule,
    pub bad_rows: BadRowPolicy,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_grid: Option<PathBuf>,
    pub export_report: Option<PathBuf>,
    pub export_svg: Option<PathBuf>,
    pub svg_size: (u32, u32),

    pub style: ChartStyle,
}

impl ReportConfig {
    /// Defaults used by the TUI and tests: 30 trailing days, Scott bandwidth,
    /// strict rows, no exports.
    pub fn for_source(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            trailing_days: TRAILING_DAY_PRESETS[0],
            bandwidth: BandwidthRule::Scott,
            bad_rows: BadRowPolicy::Strict,
            plot: true,
            plot_width: 100,
            plot_height: 25,
            export_grid: None,
            export_report: None,
            export_svg: None,
            svg_size: (2400, 800),
            style: ChartStyle::default(),
        }
    }
}

/// Portable representation of a finished report.
///
/// Written by `salesdens report --export-report` and read back by
/// `salesdens plot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFile {
    pub tool: String,
    pub source: PathBuf,
    pub trailing_days: u32,
    pub latest: NaiveDateTime,
    pub cutoff: NaiveDateTime,
    pub rows_read: usize,
    pub rows_used: usize,
    pub rows_in_window: usize,
    pub stats: SeriesStats,
    pub bandwidth_rule: BandwidthRule,
    pub bandwidth: f64,
    pub peak: PeakPoint,
    pub grid: DensityGrid,
}
