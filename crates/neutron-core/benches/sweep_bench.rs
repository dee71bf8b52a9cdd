// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Transport Sweep Benchmarks
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{Array1, Array2};
use neutron_core::exponential::ExpEvaluator;
use neutron_core::quadrature::PolarQuadrature;
use neutron_core::solver::TransportSolver;
use neutron_core::track::{BoundaryCondition, Segment, Track, TrackSet};
use neutron_geometry::fsr::FsrRegistry;
use neutron_geometry::geometry::Geometry;
use neutron_geometry::point::Point;
use neutron_geometry::surface::Shape;
use neutron_types::config::SolverOptions;
use neutron_types::ids::IdRegistry;
use neutron_types::material::Material;
use std::hint::black_box;

/// Seven-group reactor-like material with enough scattering to make
/// the sweep arithmetic representative.
fn seven_group_material() -> Material {
    let groups = 7;
    let sigma_t = Array1::from_shape_fn(groups, |g| 0.3 + 0.1 * g as f64);
    let sigma_a = Array1::from_shape_fn(groups, |g| 0.02 + 0.01 * g as f64);
    let nu_sigma_f = Array1::from_shape_fn(groups, |g| 0.015 * (g + 1) as f64);
    let chi = Array1::from_shape_fn(groups, |g| if g < 2 { 0.5 } else { 0.0 });
    let sigma_s = Array2::from_shape_fn((groups, groups), |(to, from)| {
        if to >= from {
            0.04 / (1.0 + (to - from) as f64)
        } else {
            0.002
        }
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

/// A single big region crossed by `num_tracks` self-reflecting chords
/// of `num_segments` segments each.
fn homogeneous_problem(
    num_tracks: usize,
    num_segments: usize,
) -> (FsrRegistry, TrackSet) {
    let mut geometry = Geometry::new();
    let circle = geometry
        .add_surface(
            1,
            Shape::Circle {
                x0: 0.0,
                y0: 0.0,
                radius: 100.0,
            },
        )
        .unwrap();
    let cell = geometry.add_material_cell(1, 0, 0, 0, 0).unwrap();
    geometry.add_cell_surface(cell, -1, circle).unwrap();

    let mut registry = FsrRegistry::new();
    let coords = geometry.find_cell(Point::new(0.0, 0.0)).unwrap();
    registry.register(&geometry, &coords).unwrap();

    let tracks: Vec<Track> = (0..num_tracks)
        .map(|uid| Track {
            uid,
            azim_index: uid,
            azim_weight: 1.0 / num_tracks as f64,
            segments: (0..num_segments)
                .map(|_| Segment {
                    length: 0.4,
                    region: 0,
                    material: 0,
                })
                .collect(),
            track_in: uid,
            track_out: uid,
            bc_in: BoundaryCondition::Reflective,
            bc_out: BoundaryCondition::Reflective,
            refl_in: false,
            refl_out: true,
        })
        .collect();
    let tracks = TrackSet::new(tracks).unwrap();
    tracks.register_volumes(&mut registry).unwrap();
    registry.freeze();
    (registry, tracks)
}

/// Five power iterations over 64 tracks x 64 segments, 7 groups.
fn bench_power_iterations_64x64(c: &mut Criterion) {
    let (registry, tracks) = homogeneous_problem(64, 64);
    let options = SolverOptions {
        max_iterations: 5,
        ..SolverOptions::default()
    };

    c.bench_function("power_iterations_64x64_7g", |b| {
        b.iter(|| {
            let mut solver = TransportSolver::new(
                &registry,
                vec![seven_group_material()],
                tracks.clone(),
                PolarQuadrature::tabuchi_yamamoto(3).unwrap(),
                options.clone(),
            )
            .unwrap();
            let result = solver.solve().unwrap();
            black_box(result.k_eff);
        })
    });
}

/// Exponential table lookups against direct evaluation.
fn bench_exponential_modes(c: &mut Criterion) {
    let quadrature = PolarQuadrature::tabuchi_yamamoto(3).unwrap();
    let direct = ExpEvaluator::direct(&quadrature);
    let table = ExpEvaluator::interpolated(&quadrature, 10.0);
    let taus: Vec<f64> = (0..1000).map(|i| 0.01 * i as f64).collect();

    c.bench_function("exponential_direct_3000", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for &tau in &taus {
                for p in 0..3 {
                    acc += direct.evaluate(black_box(tau), p);
                }
            }
            black_box(acc);
        })
    });

    c.bench_function("exponential_interpolated_3000", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for &tau in &taus {
                for p in 0..3 {
                    acc += table.evaluate(black_box(tau), p);
                }
            }
            black_box(acc);
        })
    });
}

criterion_group!(
    sweep_benches,
    bench_power_iterations_64x64,
    bench_exponential_modes,
);
criterion_main!(sweep_benches);
