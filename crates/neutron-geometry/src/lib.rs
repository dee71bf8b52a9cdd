// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Neutron Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Constructive solid geometry and flat source region identification.
//!
//! A reactor cross-section is a hierarchy of universes containing cells
//! bounded by analytic surfaces (planes and circles). [`geometry::Geometry`]
//! owns the flat arenas of surfaces, cells, universes and lattices and
//! answers point-location queries; [`fsr::FsrRegistry`] maps each distinct
//! descent chain through the hierarchy to a dense flat-source-region id.

pub mod cell;
pub mod fsr;
pub mod geometry;
pub mod point;
pub mod subdivide;
pub mod surface;
pub mod universe;

/// Dense handle into [`geometry::Geometry`]'s surface arena.
pub type SurfaceHandle = usize;
/// Dense handle into [`geometry::Geometry`]'s cell arena.
pub type CellHandle = usize;
/// Dense handle into [`geometry::Geometry`]'s universe arena.
pub type UniverseHandle = usize;
/// Dense handle into the material table supplied to the solver.
pub type MaterialHandle = usize;
