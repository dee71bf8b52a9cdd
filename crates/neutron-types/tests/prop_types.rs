// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Property-Based Tests (proptest) for neutron-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for neutron-types using proptest.
//!
//! Covers: material padding invariants and solver option serialization
//! roundtrip.

use ndarray::{Array1, Array2};
use neutron_types::config::SolverOptions;
use neutron_types::ids::IdRegistry;
use neutron_types::material::Material;
use proptest::prelude::*;

fn arbitrary_material(groups: usize, seed: f64) -> Material {
    let sigma_t = Array1::from_shape_fn(groups, |g| 0.5 + seed + g as f64 * 0.1);
    let sigma_a = Array1::from_shape_fn(groups, |g| 0.05 + 0.01 * g as f64);
    let nu_sigma_f = Array1::from_shape_fn(groups, |g| 0.02 * (g + 1) as f64);
    let chi = Array1::from_shape_fn(groups, |g| if g == 0 { 1.0 } else { 0.0 });
    let sigma_s = Array2::from_shape_fn((groups, groups), |(to, from)| {
        0.01 * (1 + to + from) as f64
    });
    Material::new(
        &mut IdRegistry::new(),
        1,
        sigma_t,
        sigma_a,
        nu_sigma_f,
        chi,
        sigma_s,
    )
    .unwrap()
}

proptest! {
    /// Padded group count is the smallest multiple of the vector length
    /// holding all physical groups.
    #[test]
    fn padded_count_is_minimal_multiple(
        groups in 1usize..24,
        width_pow in 1u32..5,
    ) {
        let vector_length = 1usize << width_pow;
        let mut material = arbitrary_material(groups, 0.0);
        material.align_data(vector_length).unwrap();

        let padded = material.num_groups_padded();
        prop_assert_eq!(padded % vector_length, 0);
        prop_assert!(padded >= groups);
        prop_assert!(padded < groups + vector_length);
    }

    /// Padding never alters the physical cross sections.
    #[test]
    fn padding_preserves_physical_data(
        groups in 1usize..16,
        seed in 0.0f64..2.0,
    ) {
        let reference = arbitrary_material(groups, seed);
        let mut material = reference.clone();
        material.align_data(8).unwrap();

        for g in 0..groups {
            prop_assert_eq!(material.sigma_t()[g], reference.sigma_t()[g]);
            prop_assert_eq!(material.sigma_a()[g], reference.sigma_a()[g]);
            prop_assert_eq!(material.nu_sigma_f()[g], reference.nu_sigma_f()[g]);
            prop_assert_eq!(material.chi()[g], reference.chi()[g]);
            for gp in 0..groups {
                prop_assert_eq!(material.sigma_s()[[g, gp]], reference.sigma_s()[[g, gp]]);
            }
        }
    }

    /// Padding groups carry no reaction rates and a unit total.
    #[test]
    fn padding_groups_are_inert(groups in 1usize..16) {
        let mut material = arbitrary_material(groups, 0.3);
        material.align_data(8).unwrap();

        for g in groups..material.num_groups_padded() {
            prop_assert_eq!(material.sigma_a()[g], 0.0);
            prop_assert_eq!(material.nu_sigma_f()[g], 0.0);
            prop_assert_eq!(material.chi()[g], 0.0);
            prop_assert_eq!(material.sigma_t()[g], 1.0);
        }
    }

    /// Solver options survive a JSON roundtrip.
    #[test]
    fn options_roundtrip(
        max_iterations in 1usize..5000,
        threads in 0usize..64,
    ) {
        let options = SolverOptions {
            max_iterations,
            num_threads: threads,
            ..SolverOptions::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        let options2: SolverOptions = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(options2.max_iterations, max_iterations);
        prop_assert_eq!(options2.num_threads, threads);
    }
}
