// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Neutron Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Method-of-characteristics transport solver.
//!
//! Consumes a frozen geometry (flat source regions with volumes and
//! materials) and a segmented track layout, and computes the scalar
//! flux, boundary angular flux, leakage and k_eff by power iteration
//! over vectorized transport sweeps.

pub mod exponential;
pub mod quadrature;
pub mod solver;
pub mod track;
