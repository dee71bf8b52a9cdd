// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Material
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Multi-group macroscopic cross sections.
//!
//! A material carries per-group totals, absorption, nu-fission, the
//! fission spectrum and the full group-to-group scatter matrix. Before
//! the solver runs, [`Material::align_data`] pads every array so the
//! group count is a multiple of the SIMD vector width; the padding
//! groups carry zero cross sections (and unit Sigma_t so the source
//! ratio stays finite) and never contribute to any reaction rate.

use ndarray::{s, Array1, Array2};

use crate::error::{TransportError, TransportResult};
use crate::ids::{IdFamily, IdRegistry};

/// Read-only multi-group cross-section set for one material.
#[derive(Debug, Clone)]
pub struct Material {
    id: i32,
    num_groups: usize,
    num_groups_padded: usize,
    sigma_t: Array1<f64>,
    sigma_a: Array1<f64>,
    nu_sigma_f: Array1<f64>,
    chi: Array1<f64>,
    /// Scatter matrix, `sigma_s[[G, g]]` = scattering from group g into
    /// group G.
    sigma_s: Array2<f64>,
}

impl Material {
    /// Build a material from its per-group data. The id is resolved
    /// through the registry's material family: 0 auto-assigns from
    /// 10000, a value in [1, 9999] is accepted once.
    ///
    /// All vectors must share the same length G and `sigma_s` must be
    /// G x G. Negative or non-finite entries are rejected.
    pub fn new(
        registry: &mut IdRegistry,
        id: i32,
        sigma_t: Array1<f64>,
        sigma_a: Array1<f64>,
        nu_sigma_f: Array1<f64>,
        chi: Array1<f64>,
        sigma_s: Array2<f64>,
    ) -> TransportResult<Self> {
        let id = registry.assign(IdFamily::Material, id)?;

        let num_groups = sigma_t.len();
        if num_groups == 0 {
            return Err(TransportError::InvalidInput(format!(
                "material {id} has zero energy groups"
            )));
        }
        for (name, array) in [
            ("sigma_a", &sigma_a),
            ("nu_sigma_f", &nu_sigma_f),
            ("chi", &chi),
        ] {
            if array.len() != num_groups {
                return Err(TransportError::InvalidInput(format!(
                    "material {id}: {name} has {} groups, expected {num_groups}",
                    array.len()
                )));
            }
        }
        if sigma_s.dim() != (num_groups, num_groups) {
            return Err(TransportError::InvalidInput(format!(
                "material {id}: sigma_s has shape {:?}, expected ({num_groups}, {num_groups})",
                sigma_s.dim()
            )));
        }

        let material = Material {
            id,
            num_groups,
            num_groups_padded: num_groups,
            sigma_t,
            sigma_a,
            nu_sigma_f,
            chi,
            sigma_s,
        };
        material.check_finite_nonnegative()?;
        Ok(material)
    }

    fn check_finite_nonnegative(&self) -> TransportResult<()> {
        let vectors = [
            ("sigma_t", &self.sigma_t),
            ("sigma_a", &self.sigma_a),
            ("nu_sigma_f", &self.nu_sigma_f),
            ("chi", &self.chi),
        ];
        for (name, array) in vectors {
            if array.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(TransportError::NumericFailure {
                    iteration: 0,
                    message: format!(
                        "material {}: {name} contains a negative or non-finite entry",
                        self.id
                    ),
                });
            }
        }
        if self.sigma_s.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(TransportError::NumericFailure {
                iteration: 0,
                message: format!(
                    "material {}: sigma_s contains a negative or non-finite entry",
                    self.id
                ),
            });
        }
        Ok(())
    }

    /// Pad all per-group arrays so the group count is a multiple of
    /// `vector_length`. Padding groups are inert: every cross section
    /// is zero except `sigma_t`, which is one so that source-to-total
    /// ratios in padded groups stay finite.
    pub fn align_data(&mut self, vector_length: usize) -> TransportResult<()> {
        if vector_length == 0 {
            return Err(TransportError::InvalidInput(
                "vector_length must be nonzero".to_string(),
            ));
        }
        let padded = self.num_groups.div_ceil(vector_length) * vector_length;
        if padded == self.num_groups_padded {
            return Ok(());
        }

        let g = self.num_groups;
        let pad_vector = |src: &Array1<f64>, fill: f64| {
            let mut out = Array1::from_elem(padded, fill);
            out.slice_mut(s![..g]).assign(&src.slice(s![..g]));
            out
        };

        self.sigma_t = pad_vector(&self.sigma_t, 1.0);
        self.sigma_a = pad_vector(&self.sigma_a, 0.0);
        self.nu_sigma_f = pad_vector(&self.nu_sigma_f, 0.0);
        self.chi = pad_vector(&self.chi, 0.0);

        let mut sigma_s = Array2::zeros((padded, padded));
        sigma_s
            .slice_mut(s![..g, ..g])
            .assign(&self.sigma_s.slice(s![..g, ..g]));
        self.sigma_s = sigma_s;

        self.num_groups_padded = padded;
        Ok(())
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    /// Physical group count, before padding.
    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    /// Group count after padding; equals [`Self::num_groups`] until
    /// [`Self::align_data`] runs.
    pub fn num_groups_padded(&self) -> usize {
        self.num_groups_padded
    }

    pub fn sigma_t(&self) -> &Array1<f64> {
        &self.sigma_t
    }

    pub fn sigma_a(&self) -> &Array1<f64> {
        &self.sigma_a
    }

    pub fn nu_sigma_f(&self) -> &Array1<f64> {
        &self.nu_sigma_f
    }

    pub fn chi(&self) -> &Array1<f64> {
        &self.chi
    }

    pub fn sigma_s(&self) -> &Array2<f64> {
        &self.sigma_s
    }

    /// True if any group produces fission neutrons.
    pub fn is_fissionable(&self) -> bool {
        self.nu_sigma_f.iter().any(|v| *v > 0.0)
    }
}
