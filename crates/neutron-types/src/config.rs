// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{TransportError, TransportResult};

/// How the segment attenuation factor `1 - exp(-tau / sin(theta_p))`
/// is evaluated during the transport sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExponentialMode {
    /// Call the platform math library for every segment.
    Direct,
    /// Linear interpolation in a precomputed table.
    #[default]
    Interpolated,
}

/// Solver tunables. Every field has a default so partial JSON configs
/// deserialize cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverOptions {
    /// SIMD vector width the per-group arrays are padded to.
    #[serde(default = "default_vector_length")]
    pub vector_length: usize,
    /// Alignment boundary in bytes for per-group arrays.
    #[serde(default = "default_vector_alignment")]
    pub vector_alignment: usize,
    #[serde(default)]
    pub exponential_mode: ExponentialMode,
    /// Cap on outer power iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Convergence threshold on the relative source residual.
    #[serde(default = "default_source_tolerance")]
    pub source_tolerance: f64,
    /// Worker threads for the sweep; 0 uses the rayon default.
    #[serde(default)]
    pub num_threads: usize,
}

fn default_vector_length() -> usize {
    8
}

fn default_vector_alignment() -> usize {
    16
}

fn default_max_iterations() -> usize {
    1000
}

fn default_source_tolerance() -> f64 {
    1e-5
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            vector_length: default_vector_length(),
            vector_alignment: default_vector_alignment(),
            exponential_mode: ExponentialMode::default(),
            max_iterations: default_max_iterations(),
            source_tolerance: default_source_tolerance(),
            num_threads: 0,
        }
    }
}

impl SolverOptions {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> TransportResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&contents)?;
        options.validate()?;
        Ok(options)
    }

    /// Check the tunables against the ranges the solver supports.
    pub fn validate(&self) -> TransportResult<()> {
        if ![2, 4, 8, 16].contains(&self.vector_length) {
            return Err(TransportError::InvalidInput(format!(
                "vector_length must be 2, 4, 8 or 16, got {}",
                self.vector_length
            )));
        }
        if !self.vector_alignment.is_power_of_two() {
            return Err(TransportError::InvalidInput(format!(
                "vector_alignment must be a power of two, got {}",
                self.vector_alignment
            )));
        }
        if self.max_iterations == 0 {
            return Err(TransportError::InvalidInput(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.source_tolerance > 0.0) {
            return Err(TransportError::InvalidInput(format!(
                "source_tolerance must be positive, got {}",
                self.source_tolerance
            )));
        }
        Ok(())
    }
}
