//! Reporting utilities: run summary, currency formatting, and peak labels.

pub mod format;

pub use format::*;
