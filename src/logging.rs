//! Tracing subscriber setup.
//!
//! `RUST_LOG` always wins; otherwise the level comes from `-v` flags.
//! The TUI owns the terminal, so it only logs when a file is given.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn filter_for(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(verbose)))
}

/// Log to stderr.
pub fn init_stderr(verbose: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log to an append-only file (no ANSI colors).
pub fn init_file(path: &Path, verbose: u8) -> Result<(), AppError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::usage(format!("Failed to open log file '{}': {e}", path.display())))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbose))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
