//! Command-line parsing for the sales density reporter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the estimation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{BadRowPolicy, BandwidthRule};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salesdens", version, about = "Trailing-window sales density reporter")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a density report, print the summary and plot, and optionally export.
    Report(ReportArgs),
    /// Plot a previously exported report JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// Pick a source file and a trailing window; every change re-runs the
    /// same pipeline as `salesdens report`.
    Tui(TuiArgs),
}

/// Options shared by `report` and `tui`.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Spreadsheet (.xlsx/.xls/.ods) or CSV file with `Date` and `Sale` columns.
    ///
    /// When omitted, you are prompted to choose from files under the current directory.
    #[arg(short = 'f', long = "file", env = "SALES_FILE", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Trailing window length in days, counted back from the latest date.
    #[arg(short = 'd', long = "days", env = "SALES_TRAILING_DAYS", default_value_t = 30)]
    pub days: u32,

    /// Kernel bandwidth rule.
    #[arg(long, value_enum, default_value_t = BandwidthRule::Scott)]
    pub bandwidth: BandwidthRule,

    /// What to do with rows whose date or sale cannot be parsed.
    #[arg(long = "on-bad-row", value_enum, default_value_t = BadRowPolicy::Strict)]
    pub on_bad_row: BadRowPolicy,
}

/// Options for a one-shot report.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the sampled density grid to CSV.
    #[arg(long = "export-grid", value_name = "CSV")]
    pub export_grid: Option<PathBuf>,

    /// Export the report (window, stats, peak, grid) to JSON.
    #[arg(long = "export-report", value_name = "JSON")]
    pub export_report: Option<PathBuf>,

    /// Export the annotated chart to SVG.
    #[arg(long = "export-svg", value_name = "SVG")]
    pub export_svg: Option<PathBuf>,

    /// SVG size in pixels, `WIDTHxHEIGHT`.
    #[arg(long = "svg-size", value_parser = parse_size, default_value = "2400x800")]
    pub svg_size: (u32, u32),

    /// Chart title (SVG export only).
    #[arg(long, default_value = "")]
    pub title: String,
}

/// Options for the interactive TUI.
#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Write logs to this file while the TUI is running.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Options for plotting a saved report.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Report JSON file produced by `salesdens report --export-report`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Also export the chart to SVG.
    #[arg(long = "export-svg", value_name = "SVG")]
    pub export_svg: Option<PathBuf>,
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("invalid width '{w}': {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("invalid height '{h}': {e}"))?;
    if w == 0 || h == 0 {
        return Err("SVG size must be non-zero".to_string());
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_size_accepts_width_by_height() {
        assert_eq!(parse_size("2400x800"), Ok((2400, 800)));
        assert_eq!(parse_size("640X480"), Ok((640, 480)));
        assert!(parse_size("640").is_err());
        assert!(parse_size("0x10").is_err());
    }

    #[test]
    fn report_args_parse() {
        let cli = Cli::try_parse_from([
            "salesdens", "report", "-f", "a.xlsx", "--days", "60", "--bandwidth", "silverman", "--on-bad-row",
            "skip",
        ])
        .unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report subcommand");
        };
        assert_eq!(args.source.file, Some(PathBuf::from("a.xlsx")));
        assert_eq!(args.source.days, 60);
        assert_eq!(args.source.bandwidth, BandwidthRule::Silverman);
        assert_eq!(args.source.on_bad_row, BadRowPolicy::Skip);
        assert_eq!(args.svg_size, (2400, 800));
    }

    #[test]
    fn verbose_flag_counts_and_is_global() {
        let cli = Cli::try_parse_from(["salesdens", "plot", "--report", "r.json", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let cli = Cli::try_parse_from(["salesdens", "-v", "tui"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }
}
