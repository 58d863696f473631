//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records and the loaded table (`SalesRecord`, `SalesTable`)
//! - derived views (`TrailingWindow`, `DensityEstimate`, `PeakPoint`)
//! - run configuration (`ReportConfig`, `ChartStyle`, `BandwidthRule`)

pub mod types;

pub use types::*;
