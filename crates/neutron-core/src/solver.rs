// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Transport Solver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! The MOC power iteration.
//!
//! Each outer iteration normalizes the fluxes to unit fission source,
//! rebuilds the flat region sources from the previous flux, sweeps the
//! characteristic equation along every track in both directions, folds
//! the sweep tallies back into the scalar flux, and updates k_eff from
//! the fission/absorption/leakage balance. Iteration stops when the
//! relative source residual drops below the configured tolerance.
//!
//! # Concurrency
//!
//! The sweep runs one azimuthal half-space at a time and parallelizes
//! over the tracks inside it. Scalar flux tallies go through one lock
//! per flat source region, held only for a vector add; boundary flux
//! rows carry one lock per track, taken separately for the working
//! copy and for the partner transfer, never nested. All reductions are
//! associative sums with no ordering guarantee.

use std::fs::File;
use std::sync::Mutex;
use std::time::Instant;

use log::debug;
use ndarray::{s, Array1, Array2, ArrayViewMut1};
use ndarray_npy::NpzWriter;
use rayon::prelude::*;

use neutron_geometry::fsr::FsrRegistry;
use neutron_types::config::{ExponentialMode, SolverOptions};
use neutron_types::constants::{FOUR_PI, ONE_OVER_FOUR_PI, SOURCE_RESIDUAL_FLOOR};
use neutron_types::error::{TransportError, TransportResult};
use neutron_types::material::Material;

use crate::exponential::ExpEvaluator;
use crate::quadrature::PolarQuadrature;
use crate::track::{Segment, TrackSet};

/// Outcome of a solve, converged or not.
#[derive(Debug, Clone)]
pub struct SolveResult {
    pub k_eff: f64,
    pub converged: bool,
    pub iterations: usize,
    pub residual: f64,
    pub total_leakage: f64,
    pub solve_time_ms: f64,
}

/// Per-track mutable sweep state: boundary angular flux and outgoing
/// leakage, each laid out `[direction][polar][group]`.
#[derive(Debug)]
struct TrackState {
    psi: Array1<f64>,
    leakage: Array1<f64>,
}

/// The MOC transport solver.
pub struct TransportSolver {
    options: SolverOptions,
    materials: Vec<Material>,
    fsr_volumes: Vec<f64>,
    fsr_materials: Vec<usize>,
    tracks: TrackSet,
    exp: ExpEvaluator,
    pool: Option<rayon::ThreadPool>,

    num_fsrs: usize,
    /// Padded group count; all per-group arrays use it.
    num_groups: usize,
    num_physical_groups: usize,
    num_polar: usize,
    polar_times_groups: usize,
    /// `sin(theta_p) * w_p` per polar angle.
    polar_multiples: Vec<f64>,

    phi: Array2<f64>,
    source: Array2<f64>,
    old_source: Array2<f64>,
    ratio: Array2<f64>,
    track_states: Vec<Mutex<TrackState>>,
    fsr_flux_tallies: Vec<Mutex<Array1<f64>>>,
    k_eff: f64,
    total_leakage: f64,
}

impl TransportSolver {
    /// Assemble a solver from a frozen region registry, the material
    /// table, the segmented tracks and the polar quadrature. Materials
    /// are copied and padded to the configured vector length.
    pub fn new(
        registry: &FsrRegistry,
        mut materials: Vec<Material>,
        tracks: TrackSet,
        quadrature: PolarQuadrature,
        options: SolverOptions,
    ) -> TransportResult<Self> {
        options.validate()?;
        if !registry.is_frozen() {
            return Err(TransportError::InvalidInput(
                "flat source regions must be frozen before the solver runs".to_string(),
            ));
        }
        if materials.is_empty() {
            return Err(TransportError::InvalidInput(
                "no materials supplied".to_string(),
            ));
        }

        let num_physical_groups = materials[0].num_groups();
        let mut material_ids = std::collections::HashSet::new();
        for material in &materials {
            if material.num_groups() != num_physical_groups {
                return Err(TransportError::InvalidInput(format!(
                    "material {} has {} groups, expected {num_physical_groups}",
                    material.id(),
                    material.num_groups()
                )));
            }
            if !material_ids.insert(material.id()) {
                return Err(TransportError::InvalidGeometry {
                    id: material.id(),
                    message: "duplicate material id in the material table".to_string(),
                });
            }
        }
        for material in &mut materials {
            material.align_data(options.vector_length)?;
        }
        let num_groups = materials[0].num_groups_padded();

        let fsr_materials = registry.materials().to_vec();
        let fsr_volumes = registry.volumes().to_vec();
        let num_fsrs = fsr_materials.len();
        if num_fsrs == 0 {
            return Err(TransportError::InvalidInput(
                "the registry holds no flat source regions".to_string(),
            ));
        }
        for (r, &material) in fsr_materials.iter().enumerate() {
            if material >= materials.len() {
                return Err(TransportError::InvalidInput(format!(
                    "region {r} references material handle {material} beyond the table"
                )));
            }
            if !(fsr_volumes[r] > 0.0) {
                return Err(TransportError::InvalidInput(format!(
                    "region {r} has non-positive volume {}; was it traced?",
                    fsr_volumes[r]
                )));
            }
        }
        for track in tracks.tracks() {
            for segment in &track.segments {
                if segment.region >= num_fsrs {
                    return Err(TransportError::InvalidInput(format!(
                        "track {} crosses unknown region {}",
                        track.uid, segment.region
                    )));
                }
                if segment.material >= materials.len() {
                    return Err(TransportError::InvalidInput(format!(
                        "track {} references unknown material {}",
                        track.uid, segment.material
                    )));
                }
            }
        }

        let exp = match options.exponential_mode {
            ExponentialMode::Direct => ExpEvaluator::direct(&quadrature),
            ExponentialMode::Interpolated => {
                let max_tau = max_optical_length(&tracks, &materials);
                ExpEvaluator::interpolated(&quadrature, max_tau)
            }
        };

        let pool = if options.num_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(options.num_threads)
                .build()
                .map_err(|e| {
                    TransportError::InvalidInput(format!("failed to build thread pool: {e}"))
                })?;
            Some(pool)
        } else {
            None
        };

        let num_polar = quadrature.num_polar();
        let polar_times_groups = num_polar * num_groups;
        let num_tracks = tracks.num_tracks();

        Ok(TransportSolver {
            options,
            materials,
            fsr_volumes,
            fsr_materials,
            tracks,
            exp,
            pool,
            num_fsrs,
            num_groups,
            num_physical_groups,
            num_polar,
            polar_times_groups,
            polar_multiples: quadrature.multiples(),
            phi: Array2::ones((num_fsrs, num_groups)),
            source: Array2::zeros((num_fsrs, num_groups)),
            old_source: Array2::ones((num_fsrs, num_groups)),
            ratio: Array2::zeros((num_fsrs, num_groups)),
            track_states: (0..num_tracks)
                .map(|_| {
                    Mutex::new(TrackState {
                        psi: Array1::ones(2 * polar_times_groups),
                        leakage: Array1::zeros(2 * polar_times_groups),
                    })
                })
                .collect(),
            fsr_flux_tallies: (0..num_fsrs)
                .map(|_| Mutex::new(Array1::zeros(num_groups)))
                .collect(),
            k_eff: 1.0,
            total_leakage: 0.0,
        })
    }

    // ── Power iteration ──────────────────────────────────────────────

    /// Run the k-eigenvalue power iteration to convergence or the
    /// iteration cap. Exhausting the cap is reported through the
    /// `converged` flag, not as an error.
    pub fn solve(&mut self) -> TransportResult<SolveResult> {
        let start = Instant::now();
        self.initialize_fluxes();

        let mut converged = false;
        let mut residual = f64::INFINITY;
        let mut iterations = 0;

        for iteration in 0..self.options.max_iterations {
            self.normalize_fluxes(iteration)?;
            residual = self.compute_sources(None);
            self.transport_sweep();
            self.add_source_to_scalar_flux();
            self.compute_k_eff();
            iterations = iteration + 1;

            debug!(
                "iteration {iteration}: k_eff = {:.6}, residual = {:.3e}",
                self.k_eff, residual
            );

            if iteration > 0 && residual < self.options.source_tolerance {
                converged = true;
                break;
            }
        }

        Ok(SolveResult {
            k_eff: self.k_eff,
            converged,
            iterations,
            residual,
            total_leakage: self.total_leakage,
            solve_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }

    /// Iterate the flux for a fixed isotropic volumetric source
    /// `q[region, group]` (physical groups). No normalization and no
    /// k update; the result reports `k_eff = 1`.
    pub fn solve_fixed_source(&mut self, q: &Array2<f64>) -> TransportResult<SolveResult> {
        if q.dim() != (self.num_fsrs, self.num_physical_groups) {
            return Err(TransportError::InvalidInput(format!(
                "fixed source has shape {:?}, expected ({}, {})",
                q.dim(),
                self.num_fsrs,
                self.num_physical_groups
            )));
        }
        if q.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(TransportError::NumericFailure {
                iteration: 0,
                message: "fixed source contains a negative or non-finite entry".to_string(),
            });
        }

        let start = Instant::now();
        self.initialize_fluxes();

        let mut external = Array2::zeros((self.num_fsrs, self.num_groups));
        external
            .slice_mut(s![.., ..self.num_physical_groups])
            .assign(q);

        let mut converged = false;
        let mut residual = f64::INFINITY;
        let mut iterations = 0;

        for iteration in 0..self.options.max_iterations {
            residual = self.compute_sources(Some(&external));
            self.transport_sweep();
            self.add_source_to_scalar_flux();
            self.total_leakage = self.reduce_leakage();
            iterations = iteration + 1;

            debug!("fixed-source iteration {iteration}: residual = {residual:.3e}");

            if iteration > 0 && residual < self.options.source_tolerance {
                converged = true;
                break;
            }
        }

        Ok(SolveResult {
            k_eff: self.k_eff,
            converged,
            iterations,
            residual,
            total_leakage: self.total_leakage,
            solve_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }

    fn initialize_fluxes(&mut self) {
        self.phi.fill(1.0);
        self.source.fill(0.0);
        self.old_source.fill(1.0);
        self.ratio.fill(0.0);
        for state in &self.track_states {
            let mut state = state.lock().unwrap();
            state.psi.fill(1.0);
            state.leakage.fill(0.0);
        }
        self.k_eff = 1.0;
        self.total_leakage = 0.0;
    }

    fn install<R, F>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }

    /// Scale the scalar and boundary fluxes so the volume-weighted
    /// fission source sums to one.
    fn normalize_fluxes(&mut self, iteration: usize) -> TransportResult<()> {
        let total_fission: f64 = self.install(|| {
            (0..self.num_fsrs)
                .into_par_iter()
                .map(|r| {
                    let material = &self.materials[self.fsr_materials[r]];
                    let rate: f64 = material
                        .nu_sigma_f()
                        .iter()
                        .zip(self.phi.row(r))
                        .map(|(nsf, phi)| nsf * phi)
                        .sum();
                    rate * self.fsr_volumes[r]
                })
                .sum()
        });

        if !total_fission.is_finite() || total_fission <= 0.0 {
            return Err(TransportError::NumericFailure {
                iteration,
                message: format!("total fission source is {total_fission}"),
            });
        }

        let norm = 1.0 / total_fission;
        self.phi.mapv_inplace(|v| v * norm);
        for state in &self.track_states {
            state.lock().unwrap().psi.mapv_inplace(|v| v * norm);
        }
        Ok(())
    }

    /// Rebuild the flat region sources from the current flux and
    /// return the relative residual against the previous sources.
    fn compute_sources(&mut self, external: Option<&Array2<f64>>) -> f64 {
        let k_eff = self.k_eff;
        let rows: Vec<(Array1<f64>, Array1<f64>, f64)> = self.install(|| {
            (0..self.num_fsrs)
                .into_par_iter()
                .map(|r| {
                    let material = &self.materials[self.fsr_materials[r]];
                    let phi_r = self.phi.row(r);
                    let fission: f64 = material
                        .nu_sigma_f()
                        .iter()
                        .zip(phi_r)
                        .map(|(nsf, phi)| nsf * phi)
                        .sum();

                    let mut source_row = Array1::zeros(self.num_groups);
                    let mut ratio_row = Array1::zeros(self.num_groups);
                    let mut residual_sq = 0.0;
                    for to_group in 0..self.num_groups {
                        let scatter: f64 = material
                            .sigma_s()
                            .row(to_group)
                            .iter()
                            .zip(phi_r)
                            .map(|(ss, phi)| ss * phi)
                            .sum();
                        let mut q = (fission * material.chi()[to_group] / k_eff + scatter)
                            * ONE_OVER_FOUR_PI;
                        if let Some(ext) = external {
                            q += ext[[r, to_group]] * ONE_OVER_FOUR_PI;
                        }
                        source_row[to_group] = q;
                        ratio_row[to_group] = q / material.sigma_t()[to_group];
                        if q.abs() > SOURCE_RESIDUAL_FLOOR {
                            let old = self.old_source[[r, to_group]];
                            residual_sq += ((q - old) / q).powi(2);
                        }
                    }
                    (source_row, ratio_row, residual_sq)
                })
                .collect()
        });

        let mut residual_sq = 0.0;
        for (r, (source_row, ratio_row, row_residual)) in rows.into_iter().enumerate() {
            self.source.row_mut(r).assign(&source_row);
            self.ratio.row_mut(r).assign(&ratio_row);
            residual_sq += row_residual;
        }
        self.old_source.assign(&self.source);
        (residual_sq / self.num_fsrs as f64).sqrt()
    }

    /// Sweep every track in both directions, one azimuthal half-space
    /// at a time, tallying segment flux drops into the region buffers
    /// and routing endpoint fluxes to partners or the leakage tally.
    fn transport_sweep(&self) {
        for tally in &self.fsr_flux_tallies {
            tally.lock().unwrap().fill(0.0);
        }
        for state in &self.track_states {
            state.lock().unwrap().leakage.fill(0.0);
        }

        for half in 0..2 {
            let range = self.tracks.half_range(half);
            self.install(|| {
                range.into_par_iter().for_each(|t| self.sweep_track(t));
            });
        }
    }

    fn sweep_track(&self, t: usize) {
        let track = self.tracks.track(t);
        let ptg = self.polar_times_groups;
        let mut flux = Array1::zeros(ptg);
        let mut fsr_flux = Array1::zeros(self.num_groups);

        // Forward direction.
        flux.assign(&self.track_states[t].lock().unwrap().psi.slice(s![..ptg]));
        for segment in &track.segments {
            self.tally_segment(segment, track.azim_weight, flux.view_mut(), &mut fsr_flux);
        }
        self.transfer_boundary_flux(t, true, &flux);

        // Reverse direction; the copy is taken after the forward
        // transfer so a self-coupled track sees its own reflection.
        flux.assign(&self.track_states[t].lock().unwrap().psi.slice(s![ptg..]));
        for segment in track.segments.iter().rev() {
            self.tally_segment(segment, track.azim_weight, flux.view_mut(), &mut fsr_flux);
        }
        self.transfer_boundary_flux(t, false, &flux);
    }

    /// Attenuate the track flux across one segment and add the flux
    /// drop into the segment's region tally.
    fn tally_segment(
        &self,
        segment: &Segment,
        azim_weight: f64,
        mut track_flux: ArrayViewMut1<f64>,
        fsr_flux: &mut Array1<f64>,
    ) {
        let sigma_t = self.materials[segment.material].sigma_t();
        fsr_flux.fill(0.0);

        for p in 0..self.num_polar {
            let weight = FOUR_PI * azim_weight * self.polar_multiples[p];
            let offset = p * self.num_groups;
            for g in 0..self.num_groups {
                let tau = sigma_t[g] * segment.length;
                let attenuation = self.exp.evaluate(tau, p);
                let delta =
                    (track_flux[offset + g] - self.ratio[[segment.region, g]]) * attenuation;
                fsr_flux[g] += delta * weight;
                track_flux[offset + g] -= delta;
            }
        }

        self.fsr_flux_tallies[segment.region]
            .lock()
            .unwrap()
            .scaled_add(1.0, fsr_flux);
    }

    /// Hand the outgoing flux to the partner track (reflective) or the
    /// leakage tally (vacuum). The partner's receiving direction is
    /// chosen by the reflection flag.
    fn transfer_boundary_flux(&self, t: usize, forward: bool, track_flux: &Array1<f64>) {
        let track = self.tracks.track(t);
        let ptg = self.polar_times_groups;
        let (partner, bc, refl) = if forward {
            (track.track_out, track.bc_out, track.refl_out)
        } else {
            (track.track_in, track.bc_in, track.refl_in)
        };
        let factor = bc.factor();

        if factor == 0.0 {
            let offset = if forward { 0 } else { ptg };
            let mut own = self.track_states[t].lock().unwrap();
            for p in 0..self.num_polar {
                let weight = FOUR_PI * track.azim_weight * self.polar_multiples[p];
                for g in 0..self.num_groups {
                    let idx = p * self.num_groups + g;
                    own.leakage[offset + idx] = track_flux[idx] * weight;
                }
            }
        }

        let start = if refl { ptg } else { 0 };
        let mut partner_state = self.track_states[partner].lock().unwrap();
        for idx in 0..ptg {
            partner_state.psi[start + idx] = track_flux[idx] * factor;
        }
    }

    /// Fold the sweep tallies into the scalar flux:
    /// `phi = 4 pi ratio + (phi_sweep / 2) / (sigma_t V)`, the half
    /// accounting for the two directional passes.
    fn add_source_to_scalar_flux(&mut self) {
        for r in 0..self.num_fsrs {
            let tally = self.fsr_flux_tallies[r].lock().unwrap();
            let sigma_t = self.materials[self.fsr_materials[r]].sigma_t();
            let volume = self.fsr_volumes[r];
            for g in 0..self.num_groups {
                self.phi[[r, g]] =
                    FOUR_PI * self.ratio[[r, g]] + 0.5 * tally[g] / (sigma_t[g] * volume);
            }
        }
    }

    fn reduce_leakage(&self) -> f64 {
        let total: f64 = self
            .track_states
            .iter()
            .map(|state| state.lock().unwrap().leakage.sum())
            .sum();
        0.5 * total
    }

    /// Update k_eff from the volume-weighted fission and absorption
    /// rates and the accumulated leakage.
    fn compute_k_eff(&mut self) {
        let (fission, absorption) = self.install(|| {
            (0..self.num_fsrs)
                .into_par_iter()
                .map(|r| {
                    let material = &self.materials[self.fsr_materials[r]];
                    let volume = self.fsr_volumes[r];
                    let mut fission = 0.0;
                    let mut absorption = 0.0;
                    for g in 0..self.num_groups {
                        fission += material.nu_sigma_f()[g] * self.phi[[r, g]] * volume;
                        absorption += material.sigma_a()[g] * self.phi[[r, g]] * volume;
                    }
                    (fission, absorption)
                })
                .reduce(|| (0.0, 0.0), |a, b| (a.0 + b.0, a.1 + b.1))
        });

        self.total_leakage = self.reduce_leakage();
        self.k_eff = fission / (absorption + self.total_leakage);

        debug!(
            "fission = {fission:.6e}, absorption = {absorption:.6e}, leakage = {:.6e}, \
             k_eff = {:.6}",
            self.total_leakage, self.k_eff
        );
    }

    // ── Outputs ──────────────────────────────────────────────────────

    pub fn k_eff(&self) -> f64 {
        self.k_eff
    }

    pub fn total_leakage(&self) -> f64 {
        self.total_leakage
    }

    pub fn num_fsrs(&self) -> usize {
        self.num_fsrs
    }

    /// Scalar flux per region and physical group.
    pub fn scalar_flux(&self) -> Array2<f64> {
        self.phi.slice(s![.., ..self.num_physical_groups]).to_owned()
    }

    /// Flat region sources per region and physical group.
    pub fn fsr_sources(&self) -> Array2<f64> {
        self.source
            .slice(s![.., ..self.num_physical_groups])
            .to_owned()
    }

    /// Boundary angular flux of one track, laid out
    /// `[direction][polar][group]` over padded groups.
    pub fn boundary_flux(&self, track: usize) -> Array1<f64> {
        self.track_states[track].lock().unwrap().psi.clone()
    }

    /// Volume-integrated fission rate per region,
    /// `sum_g nu sigma_f phi V`.
    pub fn fsr_fission_rates(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.num_fsrs, |r| {
            let material = &self.materials[self.fsr_materials[r]];
            let rate: f64 = material
                .nu_sigma_f()
                .iter()
                .zip(self.phi.row(r))
                .map(|(nsf, phi)| nsf * phi)
                .sum();
            rate * self.fsr_volumes[r]
        })
    }

    /// Dump the scalar flux, region volumes and fission rates into one
    /// `.npz` archive.
    pub fn write_npz(&self, path: &str) -> TransportResult<()> {
        let mut npz = NpzWriter::new(File::create(path)?);
        npz.add_array("scalar_flux", &self.scalar_flux())
            .map_err(|e| TransportError::InvalidInput(format!("npz write failed: {e}")))?;
        npz.add_array("fsr_volumes", &Array1::from_vec(self.fsr_volumes.clone()))
            .map_err(|e| TransportError::InvalidInput(format!("npz write failed: {e}")))?;
        npz.add_array("fission_rates", &self.fsr_fission_rates())
            .map_err(|e| TransportError::InvalidInput(format!("npz write failed: {e}")))?;
        npz.finish()
            .map_err(|e| TransportError::InvalidInput(format!("npz write failed: {e}")))?;
        Ok(())
    }
}

/// Largest optical length any segment produces, sizing the
/// interpolation table.
fn max_optical_length(tracks: &TrackSet, materials: &[Material]) -> f64 {
    let max_sigma_t: Vec<f64> = materials
        .iter()
        .map(|m| m.sigma_t().iter().copied().fold(0.0, f64::max))
        .collect();
    tracks
        .tracks()
        .iter()
        .flat_map(|t| t.segments.iter())
        .map(|s| s.length * max_sigma_t[s.material])
        .fold(0.0, f64::max)
}
