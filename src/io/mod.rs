//! Input/output helpers.
//!
//! - spreadsheet/CSV ingest + normalization (`ingest`)
//! - density grid export (CSV) (`export`)
//! - report JSON read/write (`report`)

pub mod export;
pub mod ingest;
pub mod report;

pub use export::*;
pub use ingest::*;
pub use report::*;
