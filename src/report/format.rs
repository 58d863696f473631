//! Formatted terminal output and chart labels.
//!
//! We keep formatting code in one place so:
//! - the estimation code stays clean and testable
//! - output changes are localized (every renderer shares the same labels)

use crate::app::pipeline::DensityReport;
use crate::domain::{ChartStyle, PeakPoint};

/// Format an amount as US-style currency: `$1,234.56`, `-$12.00`.
pub fn format_currency(v: f64) -> String {
    if !v.is_finite() {
        return format!("${v}");
    }
    let sign = if v < 0.0 { "-" } else { "" };
    let cents = (v.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{frac:02}")
}

/// Density tick label, rescaled for readability.
pub fn format_axis_density(v: f64, scale: f64) -> String {
    format!("{:.1}", v * scale)
}

/// `Highest Probability: 123.45678`
pub fn peak_density_label(peak: &PeakPoint, style: &ChartStyle) -> String {
    format!("Highest Probability: {:.5}", peak.scaled_density(style.density_scale))
}

/// `Max Probability Point: $1,234.56`
pub fn peak_amount_label(peak: &PeakPoint) -> String {
    format!("Max Probability Point: {}", format_currency(peak.sale_amount))
}

/// Format the full run summary (source + window + series stats + peak).
pub fn format_run_summary(report: &DensityReport, style: &ChartStyle) -> String {
    let mut out = String::new();

    out.push_str("=== salesdens - Sales Density Report ===\n");
    out.push_str(&format!("Source: {}\n", report.source.display()));
    out.push_str(&format!(
        "Rows: read={} | used={} | skipped={}\n",
        report.rows_read,
        report.rows_used,
        report.row_errors.len()
    ));
    out.push_str(&format!(
        "Window: last {} day(s) | {} -> {} | n={}\n",
        report.window.trailing_days,
        report.window.cutoff,
        report.window.latest,
        report.window.records.len()
    ));
    out.push_str(&format!(
        "Sales: min={} | max={} | mean={} | sd={:.2} | distinct={}\n",
        format_currency(report.stats.min),
        format_currency(report.stats.max),
        format_currency(report.stats.mean),
        report.stats.std_dev,
        report.stats.distinct
    ));
    out.push_str(&format!(
        "KDE: gaussian | bandwidth={:.4} ({}) | grid={}\n",
        report.estimate.bandwidth,
        report.estimate.bandwidth_rule.display_name(),
        report.estimate.grid.len()
    ));

    out.push_str("\nPeak:\n");
    out.push_str(&format!("- {}\n", peak_amount_label(&report.peak)));
    out.push_str(&format!("- {}\n", peak_density_label(&report.peak, style)));

    if !report.row_errors.is_empty() {
        out.push_str("\nSkipped rows:\n");
        for e in report.row_errors.iter().take(10) {
            out.push_str(&format!("  line {}: {}\n", e.line, e.message));
        }
        if report.row_errors.len() > 10 {
            out.push_str(&format!("  ... and {} more\n", report.row_errors.len() - 10));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(10.0), "$10.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-42.5), "-$42.50");
    }

    #[test]
    fn peak_labels_apply_display_scale() {
        let peak = PeakPoint { sale_amount: 1520.0, density: 0.000_012_345 };
        let style = ChartStyle::default();
        assert_eq!(peak_density_label(&peak, &style), "Highest Probability: 1.23450");
        assert_eq!(peak_amount_label(&peak), "Max Probability Point: $1,520.00");
        assert_eq!(format_axis_density(0.000_02, style.density_scale), "2.0");
    }
}
