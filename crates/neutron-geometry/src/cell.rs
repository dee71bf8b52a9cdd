// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Cell
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Cells: regions bounded by surface halfspaces.
//!
//! A cell is the intersection of halfspaces of its bounding surfaces.
//! Material cells carry a material handle plus ring/sector subdivision
//! counts; fill cells are occupied by another universe.

use std::collections::BTreeMap;

use neutron_types::constants::ON_SURFACE_THRESH;
use neutron_types::error::{TransportError, TransportResult};

use crate::point::Point;
use crate::surface::Surface;
use crate::{MaterialHandle, SurfaceHandle};

/// What fills the cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellRegion {
    Material {
        material: MaterialHandle,
        num_rings: usize,
        num_sectors: usize,
    },
    Fill {
        /// User id of the filling universe or lattice.
        universe_id: i32,
    },
}

/// A bounding surface reference with its halfspace sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHalfspace {
    pub surface: SurfaceHandle,
    pub halfspace: i8,
}

/// A region of one universe, bounded by surface halfspaces.
#[derive(Debug, Clone)]
pub struct Cell {
    uid: usize,
    id: i32,
    universe_id: i32,
    surfaces: BTreeMap<i32, SurfaceHalfspace>,
    region: CellRegion,
}

impl Cell {
    pub(crate) fn new(uid: usize, id: i32, universe_id: i32, region: CellRegion) -> Self {
        let region = match region {
            // A single sector spans the whole ring, so it is recorded
            // as "no sectorization".
            CellRegion::Material {
                material,
                num_rings,
                num_sectors: 1,
            } => CellRegion::Material {
                material,
                num_rings,
                num_sectors: 0,
            },
            other => other,
        };
        Cell {
            uid,
            id,
            universe_id,
            surfaces: BTreeMap::new(),
            region,
        }
    }

    /// Deep copy used by ring/sector subdivision: new identity, same
    /// region and surface map (surfaces shared by handle).
    pub(crate) fn clone_basic(&self, uid: usize, id: i32) -> Self {
        Cell {
            uid,
            id,
            universe_id: self.universe_id,
            surfaces: self.surfaces.clone(),
            region: self.region,
        }
    }

    pub fn uid(&self) -> usize {
        self.uid
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    /// User id of the universe this cell belongs to.
    pub fn universe_id(&self) -> i32 {
        self.universe_id
    }

    pub fn region(&self) -> &CellRegion {
        &self.region
    }

    pub fn is_material(&self) -> bool {
        matches!(self.region, CellRegion::Material { .. })
    }

    pub fn material(&self) -> Option<MaterialHandle> {
        match self.region {
            CellRegion::Material { material, .. } => Some(material),
            CellRegion::Fill { .. } => None,
        }
    }

    pub fn num_rings(&self) -> usize {
        match self.region {
            CellRegion::Material { num_rings, .. } => num_rings,
            CellRegion::Fill { .. } => 0,
        }
    }

    pub fn num_sectors(&self) -> usize {
        match self.region {
            CellRegion::Material { num_sectors, .. } => num_sectors,
            CellRegion::Fill { .. } => 0,
        }
    }

    pub(crate) fn reset_subdivision(&mut self) {
        if let CellRegion::Material {
            num_rings,
            num_sectors,
            ..
        } = &mut self.region
        {
            *num_rings = 0;
            *num_sectors = 0;
        }
    }

    /// Bounding surfaces keyed by surface user id.
    pub fn surfaces(&self) -> &BTreeMap<i32, SurfaceHalfspace> {
        &self.surfaces
    }

    pub fn num_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    /// Bind a surface halfspace to this cell. The halfspace must be +1
    /// or -1.
    pub(crate) fn add_surface(
        &mut self,
        halfspace: i8,
        surface_id: i32,
        surface: SurfaceHandle,
    ) -> TransportResult<()> {
        if halfspace != 1 && halfspace != -1 {
            return Err(TransportError::InvalidGeometry {
                id: self.id,
                message: format!(
                    "halfspace {halfspace} for surface {surface_id} is not -1 or +1"
                ),
            });
        }
        self.surfaces
            .insert(surface_id, SurfaceHalfspace { surface, halfspace });
        Ok(())
    }

    /// True when the point sits in the correct halfspace of every
    /// bounding surface; points on a surface count as inside.
    pub fn contains(&self, p: &Point, surfaces: &[Surface]) -> bool {
        self.surfaces.values().all(|sh| {
            surfaces[sh.surface].evaluate(p) * f64::from(sh.halfspace) >= -ON_SURFACE_THRESH
        })
    }

    /// Nearest forward intersection with any bounding surface along the
    /// ray from `p` at `angle`, or `None` if the ray escapes them all.
    pub fn min_surface_distance(
        &self,
        p: &Point,
        angle: f64,
        surfaces: &[Surface],
    ) -> Option<(f64, Point)> {
        self.surfaces
            .values()
            .filter_map(|sh| surfaces[sh.surface].min_distance(p, angle))
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }
}
