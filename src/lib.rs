//! `sales-density` library crate.
//!
//! The binary (`salesdens`) is a thin wrapper around this library so that:
//!
//! - the report pipeline is testable without spawning processes
//! - front-ends (CLI, TUI) share one implementation
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
