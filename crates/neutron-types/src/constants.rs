// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Solid angle of the full sphere.
pub const FOUR_PI: f64 = 4.0 * std::f64::consts::PI;

/// Reciprocal of the full solid angle, used in the isotropic source.
pub const ONE_OVER_FOUR_PI: f64 = 1.0 / FOUR_PI;

/// A point with |F(x, y)| below this threshold lies on the surface.
pub const ON_SURFACE_THRESH: f64 = 1e-12;

/// A ray within this distance of pi/2 is treated as vertical.
pub const VERTICAL_RAY_THRESH: f64 = 1e-10;

/// A plane whose slope matches the ray slope within this threshold is
/// treated as parallel to the ray.
pub const PARALLEL_RAY_THRESH: f64 = 1e-11;

/// First id handed out by the auto-id counters; user-defined ids must
/// stay strictly below this value.
pub const AUTO_ID_START: i32 = 10000;

/// Largest id a user may assign to a surface, cell, universe, lattice
/// or material.
pub const MAX_USER_ID: i32 = AUTO_ID_START - 1;

/// Source values with magnitude below this floor are excluded from the
/// relative source residual.
pub const SOURCE_RESIDUAL_FLOOR: f64 = 1e-10;
