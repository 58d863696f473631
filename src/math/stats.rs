//! Descriptive statistics over a sale series.

use crate::domain::SeriesStats;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (`ddof = 1`).
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() as f64 - 1.0)).sqrt())
}

/// Number of distinct values under `==` after a total-order sort, so `-0.0`
/// and `0.0` count once.
pub fn distinct_count(values: &[f64]) -> usize {
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() && hi.is_finite() {
        Some((lo, hi))
    } else {
        None
    }
}

pub fn describe(values: &[f64]) -> Option<SeriesStats> {
    let (min, max) = min_max(values)?;
    Some(SeriesStats {
        n: values.len(),
        distinct: distinct_count(values),
        min,
        max,
        mean: mean(values)?,
        std_dev: sample_std_dev(values).unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_std_dev_uses_n_minus_one() {
        let sd = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        // Population sd is 2.0; sample sd is sqrt(32/7).
        assert!((sd - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn describe_counts_distinct_values() {
        let stats = describe(&[10.0, 10.0, 10.0, 1000.0]).unwrap();
        assert_eq!(stats.n, 4);
        assert_eq!(stats.distinct, 2);
        assert_eq!((stats.min, stats.max), (10.0, 1000.0));
        assert!((stats.mean - 257.5).abs() < 1e-12);
    }

    #[test]
    fn describe_empty_is_none() {
        assert!(describe(&[]).is_none());
    }

    #[test]
    fn signed_zeros_count_as_one_value() {
        assert_eq!(distinct_count(&[0.0, -0.0, 0.0]), 1);
        assert_eq!(distinct_count(&[-0.0, 1.0]), 2);
    }
}
