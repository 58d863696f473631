//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - resolves the source file (flag, env, or interactive picker)
//! - runs the report pipeline
//! - prints summaries/plots
//! - writes optional exports

use clap::Parser;
use tracing::debug;

use crate::cli::{Command, PlotArgs, ReportArgs, SourceArgs, TuiArgs};
use crate::domain::{ChartStyle, ReportConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `salesdens` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is fine; env-backed flags simply fall back to defaults.
    let _ = dotenvy::dotenv();

    // We want `salesdens` and `salesdens -f sales.xlsx` to behave like
    // `salesdens tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => {
            crate::logging::init_stderr(cli.verbose);
            handle_report(args)
        }
        Command::Plot(args) => {
            crate::logging::init_stderr(cli.verbose);
            handle_plot(args)
        }
        Command::Tui(args) => handle_tui(args, cli.verbose),
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = report_config_from_args(&args)?;
    debug!(?config, "resolved report config");

    let report = pipeline::run_report(&config)?;
    let file = report.to_file();

    println!("{}", crate::report::format_run_summary(&report, &config.style));

    if config.plot {
        let plot = crate::plot::render_ascii_density(&file, &config.style, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_grid {
        crate::io::export::write_grid_csv(path, &file, config.style.density_scale)?;
    }
    if let Some(path) = &config.export_report {
        crate::io::report::write_report_json(path, &file)?;
    }
    if let Some(path) = &config.export_svg {
        crate::plot::write_density_svg(path, &file, &config.style, config.svg_size)?;
    }

    Ok(())
}

fn handle_tui(args: TuiArgs, verbose: u8) -> Result<(), AppError> {
    if let Some(path) = &args.log_file {
        crate::logging::init_file(path, verbose)?;
    }
    crate::tui::run(args)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let report = crate::io::report::read_report_json(&args.report)?;
    let style = ChartStyle::default();

    let plot = crate::plot::render_ascii_density(&report, &style, args.width, args.height);
    println!("{plot}");

    if let Some(path) = &args.export_svg {
        crate::plot::write_density_svg(path, &report, &style, (2400, 800))?;
    }
    Ok(())
}

/// Resolve the source file: explicit flag/env first, then the picker.
pub fn resolve_source(args: &SourceArgs) -> Result<std::path::PathBuf, AppError> {
    match &args.file {
        Some(path) => crate::cli::picker::validate_source_path(path),
        None => crate::cli::picker::prompt_for_source_path(),
    }
}

pub fn report_config_from_args(args: &ReportArgs) -> Result<ReportConfig, AppError> {
    let source = resolve_source(&args.source)?;
    let style = ChartStyle {
        title: args.title.clone(),
        ..ChartStyle::default()
    };

    Ok(ReportConfig {
        source,
        trailing_days: args.source.days,
        bandwidth: args.source.bandwidth,
        bad_rows: args.source.on_bad_row,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_grid: args.export_grid.clone(),
        export_report: args.export_report.clone(),
        export_svg: args.export_svg.clone(),
        svg_size: args.svg_size,
        style,
    })
}

/// Rewrite argv so `salesdens` defaults to `salesdens tui`.
///
/// Rules:
/// - `salesdens`                       -> `salesdens tui`
/// - `salesdens -f sales.xlsx ...`     -> `salesdens tui -f sales.xlsx ...`
/// - `salesdens --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_launches_tui() {
        assert_eq!(rewrite_args(argv(&["salesdens"])), argv(&["salesdens", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["salesdens", "-f", "a.xlsx"])),
            argv(&["salesdens", "tui", "-f", "a.xlsx"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        let report = argv(&["salesdens", "report", "-d", "60"]);
        assert_eq!(rewrite_args(report.clone()), report);
        let help = argv(&["salesdens", "--help"]);
        assert_eq!(rewrite_args(help.clone()), help);
    }
}
