//! Polar angle quadrature.
//!
//! The 2-D characteristic equation integrates the out-of-plane angle
//! with a small quadrature in sin(theta). The Tabuchi-Yamamoto sets
//! are the standard choice for 1 to 3 polar angles; arbitrary sets can
//! be supplied for validation studies.

use neutron_types::error::{TransportError, TransportResult};

/// Quadrature over the polar angle: `sin(theta_p)` nodes and weights
/// summing to one over the upward hemisphere.
#[derive(Debug, Clone)]
pub struct PolarQuadrature {
    sin_thetas: Vec<f64>,
    weights: Vec<f64>,
}

impl PolarQuadrature {
    /// Build from explicit nodes and weights.
    pub fn new(sin_thetas: Vec<f64>, weights: Vec<f64>) -> TransportResult<Self> {
        if sin_thetas.is_empty() || sin_thetas.len() != weights.len() {
            return Err(TransportError::InvalidInput(format!(
                "polar quadrature needs matching nonempty node/weight lists, got {} and {}",
                sin_thetas.len(),
                weights.len()
            )));
        }
        if sin_thetas.iter().any(|s| !(*s > 0.0 && *s <= 1.0)) {
            return Err(TransportError::InvalidInput(
                "polar sines must lie in (0, 1]".to_string(),
            ));
        }
        if weights.iter().any(|w| !(*w > 0.0)) {
            return Err(TransportError::InvalidInput(
                "polar weights must be positive".to_string(),
            ));
        }
        Ok(PolarQuadrature {
            sin_thetas,
            weights,
        })
    }

    /// The Tabuchi-Yamamoto quadrature optimized for 2-D MOC, defined
    /// for 1, 2 or 3 polar angles.
    pub fn tabuchi_yamamoto(num_polar: usize) -> TransportResult<Self> {
        let (sin_thetas, weights) = match num_polar {
            1 => (vec![0.798184], vec![1.0]),
            2 => (vec![0.363900, 0.899900], vec![0.212854, 0.787146]),
            3 => (
                vec![0.166648, 0.537707, 0.932954],
                vec![0.046233, 0.283619, 0.670148],
            ),
            n => {
                return Err(TransportError::InvalidInput(format!(
                    "Tabuchi-Yamamoto quadrature is defined for 1-3 polar angles, not {n}"
                )))
            }
        };
        PolarQuadrature::new(sin_thetas, weights)
    }

    pub fn num_polar(&self) -> usize {
        self.sin_thetas.len()
    }

    pub fn sin_thetas(&self) -> &[f64] {
        &self.sin_thetas
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// `sin(theta_p) * w_p`, the factor each polar angle contributes
    /// to the scalar flux tally.
    pub fn multiples(&self) -> Vec<f64> {
        self.sin_thetas
            .iter()
            .zip(&self.weights)
            .map(|(s, w)| s * w)
            .collect()
    }

    /// Smallest polar sine, which controls the steepest attenuation.
    pub fn min_sin_theta(&self) -> f64 {
        self.sin_thetas.iter().copied().fold(f64::INFINITY, f64::min)
    }
}
