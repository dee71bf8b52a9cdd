//! Evaluation of the segment attenuation factor.
//!
//! The sweep needs `1 - exp(-tau / sin(theta_p))` for every segment,
//! polar angle and group. The direct mode calls the math library; the
//! interpolated mode precomputes a value/slope table over the optical
//! length and interpolates linearly, with the spacing chosen so the
//! interpolation error stays below 1e-5.

use crate::quadrature::PolarQuadrature;

/// Relative accuracy target of the interpolation table.
const TABLE_TOLERANCE: f64 = 1e-5;

/// Beyond this optical length the attenuation factor is 1 within the
/// table tolerance for any polar sine up to one (-ln(1e-5)).
const SATURATION_TAU: f64 = 11.512925464970229;

/// Precomputed linear-interpolation table, one column per polar angle.
#[derive(Debug, Clone)]
pub struct ExpTable {
    spacing: f64,
    inv_spacing: f64,
    max_tau: f64,
    num_polar: usize,
    values: Vec<f64>,
    slopes: Vec<f64>,
}

impl ExpTable {
    fn build(quadrature: &PolarQuadrature, max_segment_tau: f64) -> Self {
        let num_polar = quadrature.num_polar();
        // Linear interpolation of 1 - exp(-tau/s) on a grid of spacing
        // d has error bounded by d^2 / (8 s^2); solve for d at the
        // smallest sine.
        let spacing = quadrature.min_sin_theta() * (8.0 * TABLE_TOLERANCE).sqrt();
        let max_tau = max_segment_tau.max(SATURATION_TAU);
        let num_bins = (max_tau / spacing).ceil() as usize + 1;

        let mut values = vec![0.0; num_bins * num_polar];
        let mut slopes = vec![0.0; num_bins * num_polar];
        for (p, sin_theta) in quadrature.sin_thetas().iter().enumerate() {
            for bin in 0..num_bins {
                let tau0 = bin as f64 * spacing;
                let tau1 = tau0 + spacing;
                let v0 = 1.0 - (-tau0 / sin_theta).exp();
                let v1 = 1.0 - (-tau1 / sin_theta).exp();
                values[bin * num_polar + p] = v0;
                slopes[bin * num_polar + p] = (v1 - v0) / spacing;
            }
        }

        ExpTable {
            spacing,
            inv_spacing: 1.0 / spacing,
            max_tau: (num_bins - 1) as f64 * spacing,
            num_polar,
            values,
            slopes,
        }
    }

    #[inline]
    fn evaluate(&self, tau: f64, p: usize) -> f64 {
        if tau >= self.max_tau {
            return 1.0;
        }
        let bin = (tau * self.inv_spacing) as usize;
        let idx = bin * self.num_polar + p;
        self.values[idx] + self.slopes[idx] * (tau - bin as f64 * self.spacing)
    }
}

/// Evaluator for `1 - exp(-tau / sin(theta_p))`, selectable at solver
/// setup. Immutable and shared read-only across sweep threads.
#[derive(Debug, Clone)]
pub enum ExpEvaluator {
    Direct { inv_sin_thetas: Vec<f64> },
    Interpolated(ExpTable),
}

impl ExpEvaluator {
    pub fn direct(quadrature: &PolarQuadrature) -> Self {
        ExpEvaluator::Direct {
            inv_sin_thetas: quadrature.sin_thetas().iter().map(|s| 1.0 / s).collect(),
        }
    }

    /// Build the interpolated evaluator; `max_segment_tau` is the
    /// largest optical length any segment produces.
    pub fn interpolated(quadrature: &PolarQuadrature, max_segment_tau: f64) -> Self {
        ExpEvaluator::Interpolated(ExpTable::build(quadrature, max_segment_tau))
    }

    /// The attenuation factor for optical length `tau` at polar angle
    /// `p`.
    #[inline]
    pub fn evaluate(&self, tau: f64, p: usize) -> f64 {
        match self {
            ExpEvaluator::Direct { inv_sin_thetas } => 1.0 - (-tau * inv_sin_thetas[p]).exp(),
            ExpEvaluator::Interpolated(table) => table.evaluate(tau, p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_matches_closed_form() {
        let quadrature = PolarQuadrature::tabuchi_yamamoto(3).unwrap();
        let evaluator = ExpEvaluator::direct(&quadrature);
        for (p, sin_theta) in quadrature.sin_thetas().iter().enumerate() {
            let expected = 1.0 - (-0.7 / sin_theta).exp();
            assert!((evaluator.evaluate(0.7, p) - expected).abs() < 1e-15);
        }
    }

    #[test]
    fn test_interpolation_within_tolerance() {
        let quadrature = PolarQuadrature::tabuchi_yamamoto(3).unwrap();
        let direct = ExpEvaluator::direct(&quadrature);
        let table = ExpEvaluator::interpolated(&quadrature, 5.0);

        let mut tau = 0.0;
        while tau < 12.0 {
            for p in 0..quadrature.num_polar() {
                let exact = direct.evaluate(tau, p);
                let approx = table.evaluate(tau, p);
                assert!(
                    (exact - approx).abs() < 1e-5,
                    "tau = {tau}, p = {p}: {exact} vs {approx}"
                );
            }
            tau += 0.0137;
        }
    }

    #[test]
    fn test_zero_optical_length() {
        let quadrature = PolarQuadrature::tabuchi_yamamoto(2).unwrap();
        let table = ExpEvaluator::interpolated(&quadrature, 1.0);
        for p in 0..2 {
            assert!(table.evaluate(0.0, p).abs() < 1e-12);
        }
    }

    #[test]
    fn test_saturates_to_one() {
        let quadrature = PolarQuadrature::tabuchi_yamamoto(2).unwrap();
        let table = ExpEvaluator::interpolated(&quadrature, 1.0);
        for p in 0..2 {
            assert_eq!(table.evaluate(50.0, p), 1.0);
            assert_eq!(table.evaluate(12.0, p), 1.0);
        }
    }
}
