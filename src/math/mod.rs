//! Mathematical utilities: evaluation grids, descriptive stats, and the
//! Gaussian kernel density estimator.

pub mod grid;
pub mod kde;
pub mod stats;

pub use grid::*;
pub use kde::*;
pub use stats::*;
