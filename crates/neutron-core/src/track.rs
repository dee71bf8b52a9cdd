// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Track
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Tracks: the segmented parallel chords the sweep integrates along.
//!
//! The track generator delivers each chord as an ordered list of
//! `(length, region, material)` segments plus the boundary graph: the
//! partner track at each endpoint, whether the flux enters the partner
//! in its forward or reverse direction, and whether the boundary is
//! reflective or vacuum. Tracks with uid below half the total belong
//! to the first azimuthal half-space; the two halves are swept
//! sequentially so reflective partners are never updated concurrently.

use neutron_geometry::fsr::FsrRegistry;
use neutron_geometry::MaterialHandle;
use neutron_types::error::{TransportError, TransportResult};

/// One piece of a track crossing a single flat source region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub length: f64,
    /// Flat source region the piece lies in.
    pub region: usize,
    pub material: MaterialHandle,
}

/// Boundary condition at a track endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCondition {
    Vacuum,
    Reflective,
}

impl BoundaryCondition {
    /// Transmission factor applied to the transferred flux: 1 keeps
    /// it, 0 routes it to the leakage tally instead.
    pub fn factor(self) -> f64 {
        match self {
            BoundaryCondition::Vacuum => 0.0,
            BoundaryCondition::Reflective => 1.0,
        }
    }
}

/// A parallel chord through the geometry.
#[derive(Debug, Clone)]
pub struct Track {
    pub uid: usize,
    pub azim_index: usize,
    /// Azimuthal quadrature weight times track spacing; multiplies
    /// segment lengths in volume and flux tallies.
    pub azim_weight: f64,
    pub segments: Vec<Segment>,
    /// Partner receiving the flux leaving the reverse direction.
    pub track_in: usize,
    /// Partner receiving the flux leaving the forward direction.
    pub track_out: usize,
    pub bc_in: BoundaryCondition,
    pub bc_out: BoundaryCondition,
    /// Outgoing reverse flux enters `track_in`'s reverse direction
    /// when set, its forward direction otherwise.
    pub refl_in: bool,
    /// Outgoing forward flux enters `track_out`'s reverse direction
    /// when set, its forward direction otherwise.
    pub refl_out: bool,
}

/// The complete, validated track layout of one problem.
#[derive(Debug, Clone)]
pub struct TrackSet {
    tracks: Vec<Track>,
}

impl TrackSet {
    /// Validate and adopt a track list. Uids must be dense and in
    /// order, the count even (two azimuthal half-spaces), partners in
    /// range, and every segment of positive length.
    pub fn new(tracks: Vec<Track>) -> TransportResult<Self> {
        let count = tracks.len();
        if count == 0 || count % 2 != 0 {
            return Err(TransportError::InvalidInput(format!(
                "track count must be positive and even, got {count}"
            )));
        }
        for (i, track) in tracks.iter().enumerate() {
            if track.uid != i {
                return Err(TransportError::InvalidInput(format!(
                    "track uid {} at position {i}; uids must be dense and ordered",
                    track.uid
                )));
            }
            if track.track_in >= count || track.track_out >= count {
                return Err(TransportError::InvalidInput(format!(
                    "track {i} references partner out of range"
                )));
            }
            if track.segments.is_empty() {
                return Err(TransportError::InvalidInput(format!(
                    "track {i} has no segments"
                )));
            }
            if !(track.azim_weight > 0.0) {
                return Err(TransportError::InvalidInput(format!(
                    "track {i} has non-positive weight {}",
                    track.azim_weight
                )));
            }
            if track.segments.iter().any(|s| !(s.length > 0.0)) {
                return Err(TransportError::InvalidInput(format!(
                    "track {i} has a segment of non-positive length"
                )));
            }
        }
        Ok(TrackSet { tracks })
    }

    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    pub fn track(&self, uid: usize) -> &Track {
        &self.tracks[uid]
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Uid range of one azimuthal half-space (0 or 1).
    pub fn half_range(&self, half: usize) -> std::ops::Range<usize> {
        let half_count = self.tracks.len() / 2;
        (half * half_count)..((half + 1) * half_count)
    }

    /// Accumulate `length * azim_weight` into the region volumes; run
    /// once before the registry is frozen.
    pub fn register_volumes(&self, registry: &mut FsrRegistry) -> TransportResult<()> {
        for track in &self.tracks {
            for segment in &track.segments {
                registry.add_volume(segment.region, segment.length * track.azim_weight)?;
            }
        }
        Ok(())
    }
}
