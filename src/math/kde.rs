//! One-dimensional Gaussian kernel density estimation.
//!
//! The estimator is
//!
//! ```text
//! f(x) = 1 / (n · h · √(2π)) · Σ exp(-½ ((x - x_i) / h)²)
//! ```
//!
//! with bandwidth `h = σ · factor(n)`, `σ` the sample standard deviation and
//! `factor` chosen by [`BandwidthRule`]:
//!
//! - Scott: `n^(-1/5)`
//! - Silverman: `(3n/4)^(-1/5)`
//!
//! Grid evaluation runs in parallel, but every point is summed sequentially
//! over the sample in input order, so output is bit-identical across runs.

use rayon::prelude::*;

use crate::domain::BandwidthRule;
use crate::math::stats::{distinct_count, sample_std_dev};

const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

#[derive(Debug, Clone)]
pub struct GaussianKde {
    samples: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    /// Fit the estimator.
    ///
    /// Returns `None` when the sample has fewer than two distinct values,
    /// where the bandwidth collapses to zero.
    pub fn fit(samples: &[f64], rule: BandwidthRule) -> Option<Self> {
        if distinct_count(samples) < 2 || samples.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let sigma = sample_std_dev(samples)?;
        let bandwidth = sigma * bandwidth_factor(samples.len(), rule);
        if !(bandwidth.is_finite() && bandwidth > 0.0) {
            return None;
        }
        Some(Self {
            samples: samples.to_vec(),
            bandwidth,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Density at a single point.
    pub fn evaluate(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let mut acc = 0.0;
        for &xi in &self.samples {
            let z = (x - xi) / h;
            acc += (-0.5 * z * z).exp();
        }
        acc * INV_SQRT_2PI / (self.samples.len() as f64 * h)
    }

    /// Density at every grid point, preserving grid order.
    pub fn evaluate_grid(&self, xs: &[f64]) -> Vec<f64> {
        xs.par_iter().map(|&x| self.evaluate(x)).collect()
    }
}

/// Multiplier applied to the sample standard deviation.
pub fn bandwidth_factor(n: usize, rule: BandwidthRule) -> f64 {
    let n = n as f64;
    match rule {
        BandwidthRule::Scott => n.powf(-0.2),
        BandwidthRule::Silverman => (n * 3.0 / 4.0).powf(-0.2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scott_and_silverman_factors() {
        assert!((bandwidth_factor(32, BandwidthRule::Scott) - 0.5).abs() < 1e-12);
        // (3·32/4)^(-1/5) = 24^(-0.2)
        let expected = 24.0_f64.powf(-0.2);
        assert!((bandwidth_factor(32, BandwidthRule::Silverman) - expected).abs() < 1e-12);
    }

    #[test]
    fn single_point_density_matches_normal_pdf() {
        // Two symmetric points: density at the midpoint is the sum of two
        // equal normal pdf contributions.
        let kde = GaussianKde::fit(&[-1.0, 1.0], BandwidthRule::Scott).unwrap();
        let h = kde.bandwidth();
        let expected = INV_SQRT_2PI / h * (-0.5 / (h * h)).exp();
        assert!((kde.evaluate(0.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn density_integrates_to_about_one() {
        let samples = [1.0, 2.0, 2.5, 3.0, 7.0, 8.0];
        let kde = GaussianKde::fit(&samples, BandwidthRule::Scott).unwrap();
        let (lo, hi) = (-20.0, 30.0);
        let n = 20_000;
        let dx = (hi - lo) / n as f64;
        let area: f64 = (0..n).map(|i| kde.evaluate(lo + (i as f64 + 0.5) * dx) * dx).sum();
        assert!((area - 1.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_samples_do_not_fit() {
        assert!(GaussianKde::fit(&[], BandwidthRule::Scott).is_none());
        assert!(GaussianKde::fit(&[4.0], BandwidthRule::Scott).is_none());
        assert!(GaussianKde::fit(&[4.0, 4.0, 4.0], BandwidthRule::Silverman).is_none());
    }

    #[test]
    fn grid_evaluation_matches_pointwise() {
        let kde = GaussianKde::fit(&[1.0, 3.0, 4.0], BandwidthRule::Silverman).unwrap();
        let xs = [0.0, 1.5, 3.5, 5.0];
        let ys = kde.evaluate_grid(&xs);
        for (x, y) in xs.iter().zip(ys) {
            assert_eq!(y.to_bits(), kde.evaluate(*x).to_bits());
        }
    }
}
