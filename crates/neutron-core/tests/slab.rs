// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Fixed-Source Slab Benchmark
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Pure-absorber slab with vacuum ends and a uniform unit source: the
//! flux dips toward both faces and saturates in the middle. The solver
//! is checked segment-for-segment against an independent scalar
//! reference of the same characteristic integration, plus the neutron
//! balance and the expected profile shape.

use std::f64::consts::PI;

use ndarray::{arr1, Array2};
use neutron_core::quadrature::PolarQuadrature;
use neutron_core::solver::TransportSolver;
use neutron_core::track::{BoundaryCondition, Segment, Track, TrackSet};
use neutron_geometry::fsr::FsrRegistry;
use neutron_geometry::geometry::Geometry;
use neutron_geometry::point::Point;
use neutron_geometry::surface::{BoundaryType, Shape};
use neutron_types::config::{ExponentialMode, SolverOptions};
use neutron_types::ids::IdRegistry;
use neutron_types::material::Material;

const NUM_REGIONS: usize = 16;
const AZIM_WEIGHT: f64 = 0.5;

/// Sigma_t = sigma_a = 1, no scattering, no fission.
fn absorber() -> Material {
    Material::new(
        &mut IdRegistry::new(),
        1,
        arr1(&[1.0]),
        arr1(&[1.0]),
        arr1(&[0.0]),
        arr1(&[0.0]),
        Array2::zeros((1, 1)),
    )
    .unwrap()
}

/// Sixteen 1 cm slices stacked along y, vacuum above and below,
/// traversed by one vertical chord per azimuthal half-space.
fn slab_problem() -> (FsrRegistry, TrackSet) {
    let mut geometry = Geometry::new();
    let mut planes = Vec::new();
    for i in 0..=NUM_REGIONS {
        planes.push(
            geometry
                .add_surface(1 + i as i32, Shape::YPlane { y: i as f64 })
                .unwrap(),
        );
    }
    geometry.set_boundary_type(planes[0], BoundaryType::Vacuum);
    geometry.set_boundary_type(planes[NUM_REGIONS], BoundaryType::Vacuum);

    for i in 0..NUM_REGIONS {
        let cell = geometry
            .add_material_cell(1 + i as i32, 0, 0, 0, 0)
            .unwrap();
        geometry.add_cell_surface(cell, 1, planes[i]).unwrap();
        geometry.add_cell_surface(cell, -1, planes[i + 1]).unwrap();
    }

    // Register the regions bottom to top so region i is slice i.
    let mut registry = FsrRegistry::new();
    for i in 0..NUM_REGIONS {
        let coords = geometry
            .find_cell(Point::new(0.0, i as f64 + 0.5))
            .unwrap();
        let region = registry.register(&geometry, &coords).unwrap();
        assert_eq!(region, i);
    }

    let segments: Vec<Segment> = (0..NUM_REGIONS)
        .map(|i| Segment {
            length: 1.0,
            region: i,
            material: 0,
        })
        .collect();
    let tracks: Vec<Track> = (0..2)
        .map(|uid| Track {
            uid,
            azim_index: uid,
            azim_weight: AZIM_WEIGHT,
            segments: segments.clone(),
            track_in: uid,
            track_out: uid,
            bc_in: BoundaryCondition::Vacuum,
            bc_out: BoundaryCondition::Vacuum,
            refl_in: false,
            refl_out: true,
        })
        .collect();
    let tracks = TrackSet::new(tracks).unwrap();
    tracks.register_volumes(&mut registry).unwrap();
    registry.freeze();
    (registry, tracks)
}

/// Scalar re-implementation of the converged characteristic sweep:
/// zero incoming flux at both vacuum faces, flat source 1/(4 pi).
fn discrete_reference(quadrature: &PolarQuadrature) -> (Vec<f64>, f64) {
    let ratio = 1.0 / (4.0 * PI);
    let mut tally = vec![0.0; NUM_REGIONS];
    let mut leakage = 0.0;

    for _track in 0..2 {
        for (s, w) in quadrature
            .sin_thetas()
            .iter()
            .zip(quadrature.weights().iter())
        {
            let weight = 4.0 * PI * AZIM_WEIGHT * s * w;
            let attenuation = 1.0 - (-1.0 / s).exp();

            let mut psi = 0.0;
            for slice in tally.iter_mut() {
                let delta = (psi - ratio) * attenuation;
                *slice += delta * weight;
                psi -= delta;
            }
            leakage += psi * weight;

            let mut psi = 0.0;
            for slice in tally.iter_mut().rev() {
                let delta = (psi - ratio) * attenuation;
                *slice += delta * weight;
                psi -= delta;
            }
            leakage += psi * weight;
        }
    }

    // Each slice has unit volume: two tracks of weight 1/2 and unit
    // segment length. phi = 4 pi ratio + tally / 2.
    let flux = tally.iter().map(|t| 1.0 + 0.5 * t).collect();
    (flux, 0.5 * leakage)
}

fn solve_slab() -> (TransportSolver, neutron_core::solver::SolveResult) {
    let (registry, tracks) = slab_problem();
    let options = SolverOptions {
        exponential_mode: ExponentialMode::Direct,
        source_tolerance: 1e-7,
        ..SolverOptions::default()
    };
    let mut solver = TransportSolver::new(
        &registry,
        vec![absorber()],
        tracks,
        PolarQuadrature::tabuchi_yamamoto(3).unwrap(),
        options,
    )
    .unwrap();
    let q = Array2::from_elem((NUM_REGIONS, 1), 1.0);
    let result = solver.solve_fixed_source(&q).unwrap();
    (solver, result)
}

#[test]
fn fixed_source_converges_immediately() {
    // With no scattering the source never changes, so the second
    // iteration already reports a zero residual.
    let (_, result) = solve_slab();
    assert!(result.converged);
    assert_eq!(result.iterations, 2);
    assert!((result.k_eff - 1.0).abs() < 1e-15);
}

#[test]
fn flux_matches_discrete_reference() {
    let (solver, result) = solve_slab();
    let quadrature = PolarQuadrature::tabuchi_yamamoto(3).unwrap();
    let (reference, reference_leakage) = discrete_reference(&quadrature);

    let flux = solver.scalar_flux();
    for i in 0..NUM_REGIONS {
        assert!(
            (flux[[i, 0]] - reference[i]).abs() < 1e-9,
            "slice {i}: {} vs {}",
            flux[[i, 0]],
            reference[i]
        );
    }
    assert!(
        (result.total_leakage - reference_leakage).abs() < 1e-9,
        "leakage {} vs {}",
        result.total_leakage,
        reference_leakage
    );
}

#[test]
fn flux_profile_shape() {
    let (solver, _) = solve_slab();
    let flux = solver.scalar_flux();

    for i in 0..NUM_REGIONS {
        // Bounded by the infinite-medium level q / sigma_t = 1.
        assert!(flux[[i, 0]] > 0.0 && flux[[i, 0]] < 1.0);
        // Symmetric about the midplane.
        assert!(
            (flux[[i, 0]] - flux[[NUM_REGIONS - 1 - i, 0]]).abs() < 1e-12,
            "asymmetry at slice {i}"
        );
    }
    // Monotone rise from the vacuum face to the midplane, saturating
    // near the infinite-medium level.
    for i in 0..NUM_REGIONS / 2 - 1 {
        assert!(
            flux[[i, 0]] < flux[[i + 1, 0]],
            "profile not monotone at slice {i}"
        );
    }
    assert!(flux[[0, 0]] < 0.9);
    assert!(flux[[NUM_REGIONS / 2, 0]] > 0.99);
}

#[test]
fn neutron_balance_with_leakage() {
    let (solver, result) = solve_slab();
    let flux = solver.scalar_flux();

    // Production 4 pi Q V balances removal sigma_t phi V plus leakage.
    let production = NUM_REGIONS as f64;
    let removal: f64 = (0..NUM_REGIONS).map(|i| flux[[i, 0]]).sum();
    assert!(
        (production - removal - result.total_leakage).abs() < 1e-6 * production,
        "production {production}, removal {removal}, leakage {}",
        result.total_leakage
    );
}
