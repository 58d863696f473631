//! Trailing-window filter.
//!
//! The window is anchored on the latest date present in the table, not on
//! "today": `cutoff = max(date) - N days`, and a record is kept when
//! `date >= cutoff`. A window reaching past the earliest representable
//! date keeps the whole table.

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::domain::{SalesRecord, SalesTable, TrailingWindow};
use crate::error::AppError;

pub fn trailing_window(table: &SalesTable, trailing_days: u32) -> Result<TrailingWindow, AppError> {
    window_records(&table.records, trailing_days)
}

/// Filter records to the trailing window ending at their latest date.
pub fn window_records(records: &[SalesRecord], trailing_days: u32) -> Result<TrailingWindow, AppError> {
    let latest = records
        .iter()
        .map(|r| r.date)
        .max()
        .ok_or_else(|| AppError::empty_data("The sales table has no records."))?;

    let cutoff = latest
        .checked_sub_signed(Duration::days(i64::from(trailing_days)))
        .unwrap_or(NaiveDateTime::MIN);

    let kept: Vec<SalesRecord> = records.iter().filter(|r| r.date >= cutoff).copied().collect();
    if kept.is_empty() {
        return Err(AppError::empty_data(format!(
            "No records on or after {cutoff} (latest {latest})."
        )));
    }

    debug!(%latest, %cutoff, kept = kept.len(), total = records.len(), "applied trailing window");

    Ok(TrailingWindow {
        trailing_days,
        latest,
        cutoff,
        records: kept,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn records() -> Vec<SalesRecord> {
        // Deliberately unordered.
        vec![
            SalesRecord { date: day(20), sale: 5.0 },
            SalesRecord { date: day(1), sale: 1.0 },
            SalesRecord { date: day(31), sale: 9.0 },
            SalesRecord { date: day(31), sale: 8.0 },
            SalesRecord { date: day(10), sale: 3.0 },
        ]
    }

    #[test]
    fn window_keeps_records_on_or_after_cutoff() {
        let w = window_records(&records(), 21).unwrap();
        assert_eq!(w.latest, day(31));
        assert_eq!(w.cutoff, day(10));
        let mut sales = w.sales();
        sales.sort_by(f64::total_cmp);
        assert_eq!(sales, vec![3.0, 5.0, 8.0, 9.0]);
    }

    #[test]
    fn zero_days_keeps_only_latest_timestamp() {
        let w = window_records(&records(), 0).unwrap();
        assert_eq!(w.records.len(), 2);
        assert!(w.records.iter().all(|r| r.date == day(31)));
    }

    #[test]
    fn shrinking_window_never_grows_subset() {
        let recs = records();
        let mut prev = usize::MAX;
        for days in (0..=40).rev() {
            let n = window_records(&recs, days).unwrap().records.len();
            assert!(n <= prev, "days={days} grew the window");
            prev = n;
        }
    }

    #[test]
    fn subset_matches_definition() {
        let recs = records();
        for days in [0u32, 1, 9, 10, 11, 30, 60] {
            let w = window_records(&recs, days).unwrap();
            let expected = recs
                .iter()
                .filter(|r| r.date >= day(31) - Duration::days(i64::from(days)))
                .count();
            assert_eq!(w.records.len(), expected);
        }
    }

    #[test]
    fn huge_window_keeps_every_record() {
        let recs = records();
        for days in [100_000_000u32, u32::MAX] {
            let w = window_records(&recs, days).unwrap();
            assert_eq!(w.records.len(), recs.len(), "days={days}");
            assert_eq!(w.cutoff, NaiveDateTime::MIN);
            assert_eq!(w.trailing_days, days);
        }
    }

    #[test]
    fn empty_table_is_empty_data_error() {
        let err = window_records(&[], 30).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::EmptyData);
    }
}
