//! Spreadsheet/CSV ingest and normalization.
//!
//! This module is responsible for turning a sales sheet into a clean set of
//! `(date, sale)` records that are safe to window and estimate on.
//!
//! Design goals:
//! - **Strict schema** for required columns (`Date`, `Sale`, case-insensitive)
//! - **All-or-nothing rows by default**, with an opt-in skip policy that keeps
//!   row diagnostics
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no windowing or estimation here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use calamine::{Data, DataType, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::domain::{BadRowPolicy, RowError, SalesRecord, SalesTable};
use crate::error::AppError;

pub const DATE_COLUMN: &str = "date";
pub const SALE_COLUMN: &str = "sale";

/// File extensions handled by the spreadsheet reader.
pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Source formats understood by [`load_sales_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Spreadsheet,
    Csv,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            Some(SourceFormat::Spreadsheet)
        } else if ext == "csv" {
            Some(SourceFormat::Csv)
        } else {
            None
        }
    }
}

/// A cell reduced to the shapes the normalizer cares about.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawCell {
    Empty,
    Number(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl RawCell {
    fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn describe(&self) -> String {
        match self {
            RawCell::Empty => "<empty>".to_string(),
            RawCell::Number(v) => v.to_string(),
            RawCell::Text(s) => format!("'{s}'"),
            RawCell::DateTime(dt) => dt.to_string(),
        }
    }
}

/// Load every `(Date, Sale)` record from a spreadsheet or CSV file.
pub fn load_sales_table(path: &Path, policy: BadRowPolicy) -> Result<SalesTable, AppError> {
    let format = SourceFormat::from_path(path).ok_or_else(|| {
        AppError::load(format!(
            "Unsupported file type '{}'. Expected one of: {}, csv.",
            path.display(),
            SPREADSHEET_EXTENSIONS.join(", ")
        ))
    })?;

    if !path.is_file() {
        return Err(AppError::load(format!("Source file not found: {}", path.display())));
    }

    let rows = match format {
        SourceFormat::Spreadsheet => read_spreadsheet_rows(path)?,
        SourceFormat::Csv => read_csv_rows(path)?,
    };
    debug!(source = %path.display(), ?format, rows = rows.len(), "read raw rows");

    let mut table = normalize_rows(rows, policy)?;
    table.source = path.to_path_buf();

    info!(
        source = %path.display(),
        rows_read = table.rows_read,
        rows_used = table.rows_used(),
        skipped = table.row_errors.len(),
        "loaded sales table"
    );
    Ok(table)
}

fn read_spreadsheet_rows(path: &Path) -> Result<Vec<Vec<RawCell>>, AppError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::load(format!("Failed to open workbook '{}': {e}", path.display())))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::load(format!("Workbook '{}' has no worksheets.", path.display())))?
        .map_err(|e| AppError::load(format!("Failed to read first worksheet: {e}")))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(sheet_cell).collect())
        .collect())
}

fn sheet_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::Int(v) => RawCell::Number(*v as f64),
        Data::Float(v) => RawCell::Number(*v),
        Data::String(s) | Data::DateTimeIso(s) => RawCell::Text(s.clone()),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) => RawCell::DateTime(dt),
            None => RawCell::Text(cell.to_string()),
        },
        other => RawCell::Text(other.to_string()),
    }
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<RawCell>>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::load(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| AppError::load(format!("CSV parse error on line {}: {e}", idx + 1)))?;
        rows.push(
            record
                .iter()
                .map(|s| {
                    if s.is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(s.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(rows)
}

/// Turn raw rows (header first) into a [`SalesTable`].
pub(crate) fn normalize_rows(rows: Vec<Vec<RawCell>>, policy: BadRowPolicy) -> Result<SalesTable, AppError> {
    let mut rows = rows.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| AppError::load("Source has no header row."))?;

    let header_map = build_header_map(&header);
    let date_idx = *header_map
        .get(DATE_COLUMN)
        .ok_or_else(|| AppError::load("Missing required column: `Date`"))?;
    let sale_idx = *header_map
        .get(SALE_COLUMN)
        .ok_or_else(|| AppError::load("Missing required column: `Sale`"))?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, row) in rows.enumerate() {
        // +2: header is line 1 and lines are 1-based.
        let line = idx + 2;
        let date_cell = row.get(date_idx).unwrap_or(&RawCell::Empty);
        let sale_cell = row.get(sale_idx).unwrap_or(&RawCell::Empty);

        if date_cell.is_empty() && sale_cell.is_empty() {
            continue;
        }
        rows_read += 1;

        match parse_record(date_cell, sale_cell) {
            Ok(record) => records.push(record),
            Err(message) => match policy {
                BadRowPolicy::Strict => {
                    return Err(AppError::parse(format!("row {line}: {message}")));
                }
                BadRowPolicy::Skip => {
                    warn!(line, %message, "skipping row");
                    row_errors.push(RowError { line, message });
                }
            },
        }
    }

    Ok(SalesTable {
        source: Default::default(),
        records,
        row_errors,
        rows_read,
    })
}

fn build_header_map(header: &[RawCell]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, cell) in header.iter().enumerate() {
        if let RawCell::Text(name) = cell {
            // First occurrence wins for duplicated headers.
            map.entry(normalize_header_name(name)).or_insert(idx);
        }
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Excel-exported CSVs sometimes carry a BOM on the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_record(date_cell: &RawCell, sale_cell: &RawCell) -> Result<SalesRecord, String> {
    let date = parse_date_cell(date_cell)?;
    let sale = parse_sale_cell(sale_cell)?;
    Ok(SalesRecord { date, sale })
}

fn parse_date_cell(cell: &RawCell) -> Result<NaiveDateTime, String> {
    match cell {
        RawCell::DateTime(dt) => Ok(*dt),
        RawCell::Number(serial) => excel_serial_to_datetime(*serial)
            .ok_or_else(|| format!("Invalid date serial {serial}.")),
        RawCell::Text(s) => parse_datetime(s.trim()),
        RawCell::Empty => Err("Missing `Date` value.".to_string()),
    }
}

/// Parse a textual date or datetime.
///
/// A small set of common export formats is accepted; anything else is an
/// error rather than a guess.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    const DATETIME_FMTS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d.and_time(chrono::NaiveTime::MIN));
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY-MM-DD HH:MM:SS, YYYY/MM/DD, MM/DD/YYYY, DD-MM-YYYY."
    ))
}

/// Excel serial dates count days from 1899-12-30 (the 1900 leap-year bug is
/// folded into that epoch for every date after February 1900).
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(chrono::NaiveTime::MIN);
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

fn parse_sale_cell(cell: &RawCell) -> Result<f64, String> {
    let value = match cell {
        RawCell::Number(v) => *v,
        RawCell::Text(s) => parse_amount(s).ok_or_else(|| format!("Invalid `Sale` value '{}'.", s.trim()))?,
        RawCell::Empty => return Err("Missing `Sale` value.".to_string()),
        other => return Err(format!("Invalid `Sale` value {}.", other.describe())),
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err("Non-finite `Sale` value.".to_string())
    }
}

/// Parse a currency-like amount: `1234.5`, `$1,234.50`, ` 99 `.
fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    fn header() -> Vec<RawCell> {
        vec![text("Date"), text("Sale")]
    }

    #[test]
    fn normalize_rows_reads_dates_and_amounts() {
        let rows = vec![
            header(),
            vec![text("2024-01-01"), text("10.5")],
            vec![text("2024-01-02 13:30:00"), RawCell::Number(12.0)],
            vec![RawCell::Number(45_292.0), text("$1,000.00")],
        ];

        let table = normalize_rows(rows, BadRowPolicy::Strict).unwrap();
        assert_eq!(table.rows_read, 3);
        assert_eq!(table.rows_used(), 3);
        assert!((table.records[0].sale - 10.5).abs() < 1e-12);
        assert_eq!(table.records[1].date.to_string(), "2024-01-02 13:30:00");
        // 45292 is 2024-01-01 in Excel's calendar.
        assert_eq!(table.records[2].date.date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!((table.records[2].sale - 1000.0).abs() < 1e-12);
    }

    #[test]
    fn headers_are_case_insensitive_and_bom_tolerant() {
        let rows = vec![
            vec![text("\u{feff}DATE"), text("region"), text(" sale ")],
            vec![text("2024-03-01"), text("north"), text("7")],
        ];
        let table = normalize_rows(rows, BadRowPolicy::Strict).unwrap();
        assert_eq!(table.records.len(), 1);
        assert!((table.records[0].sale - 7.0).abs() < 1e-12);
    }

    #[test]
    fn missing_sale_column_is_a_load_error() {
        let rows = vec![vec![text("Date"), text("Amount")]];
        let err = normalize_rows(rows, BadRowPolicy::Strict).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Load);
    }

    #[test]
    fn strict_policy_fails_on_bad_date() {
        let rows = vec![
            header(),
            vec![text("2024-01-01"), text("1")],
            vec![text("yesterday"), text("2")],
        ];
        let err = normalize_rows(rows, BadRowPolicy::Strict).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
        assert!(err.message().starts_with("row 3:"));
    }

    #[test]
    fn skip_policy_records_row_errors() {
        let rows = vec![
            header(),
            vec![text("2024-01-01"), text("1")],
            vec![text("yesterday"), text("2")],
            vec![text("2024-01-03"), text("n/a")],
            vec![RawCell::Empty, RawCell::Empty],
        ];
        let table = normalize_rows(rows, BadRowPolicy::Skip).unwrap();
        assert_eq!(table.rows_used(), 1);
        assert_eq!(table.rows_read, 3);
        let lines: Vec<usize> = table.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4]);
    }

    #[test]
    fn parse_amount_strips_currency_noise() {
        assert_eq!(parse_amount("$1,234.50"), Some(1234.5));
        assert_eq!(parse_amount("  -3 "), Some(-3.0));
        assert_eq!(parse_amount("$"), None);
    }

    #[test]
    fn load_csv_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, "Date,Sale\n2024-01-01,10\n2024-01-05,20\n").unwrap();

        let table = load_sales_table(&path, BadRowPolicy::Strict).unwrap();
        assert_eq!(table.rows_used(), 2);
        assert_eq!(table.source, path);
        assert_eq!(
            table.latest().unwrap().date(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
    }

    #[test]
    fn sheet_cells_map_to_raw_cells() {
        assert_eq!(sheet_cell(&Data::Empty), RawCell::Empty);
        assert_eq!(sheet_cell(&Data::Int(42)), RawCell::Number(42.0));
        assert_eq!(sheet_cell(&Data::Float(12.5)), RawCell::Number(12.5));
        assert_eq!(
            sheet_cell(&Data::DateTimeIso("2024-02-01T08:00:00".to_string())),
            text("2024-02-01T08:00:00")
        );
        assert_eq!(sheet_cell(&Data::Bool(true)), text("true"));
    }

    fn write_xlsx_fixture(path: &Path) -> Result<(), rust_xlsxwriter::XlsxError> {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm");

        let sales = workbook.add_worksheet().set_name("Sales")?;
        sales.write_string(0, 0, "Date")?;
        sales.write_string(0, 1, "Sale")?;
        sales.write_datetime_with_format(1, 0, &ExcelDateTime::from_ymd(2024, 1, 1)?, &date_format)?;
        sales.write_number(1, 1, 10.0)?;
        let afternoon = ExcelDateTime::from_ymd(2024, 1, 5)?.and_hms(15, 30, 0)?;
        sales.write_datetime_with_format(2, 0, &afternoon, &date_format)?;
        sales.write_number(2, 1, 20.5)?;
        // Text dates and serial numbers are accepted as well.
        sales.write_string(3, 0, "2024-01-07")?;
        sales.write_string(3, 1, "$1,000.00")?;
        sales.write_number(4, 0, 45_299.0)?;
        sales.write_number(4, 1, 7.0)?;

        let other = workbook.add_worksheet().set_name("Notes")?;
        other.write_string(0, 0, "Date")?;
        other.write_string(0, 1, "Sale")?;
        other.write_string(1, 0, "not a date")?;
        other.write_number(1, 1, 1.0)?;

        workbook.save(path)
    }

    #[test]
    fn load_xlsx_reads_first_worksheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.xlsx");
        write_xlsx_fixture(&path).unwrap();

        let table = load_sales_table(&path, BadRowPolicy::Strict).unwrap();
        assert_eq!(table.source, path);
        assert_eq!(table.rows_read, 4);
        assert_eq!(table.rows_used(), 4);

        let days: Vec<String> = table.records.iter().map(|r| r.date.format("%Y-%m-%d").to_string()).collect();
        assert_eq!(days, vec!["2024-01-01", "2024-01-05", "2024-01-07", "2024-01-08"]);
        let afternoon = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(15, 30, 0).unwrap();
        assert!((table.records[1].date - afternoon).num_seconds().abs() <= 1);
        assert_eq!(table.latest().unwrap().date(), NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        let sales: Vec<f64> = table.records.iter().map(|r| r.sale).collect();
        assert_eq!(sales, vec![10.0, 20.5, 1000.0, 7.0]);
    }

    #[test]
    fn unsupported_extension_and_missing_file_are_load_errors() {
        let err = load_sales_table(Path::new("sales.txt"), BadRowPolicy::Strict).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Load);

        let err = load_sales_table(Path::new("definitely-missing.xlsx"), BadRowPolicy::Strict).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Load);
    }
}
