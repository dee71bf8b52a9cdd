// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! The geometry arena.
//!
//! Surfaces, cells, universes and lattices live in flat vectors keyed
//! by dense handles; all cross-references go through handles or user
//! ids, never pointers, so cloning and subdivision stay cheap and the
//! structure has no reference cycles. The universe with user id 0 is
//! the root of the hierarchy.

use std::collections::HashMap;

use neutron_types::error::{TransportError, TransportResult};
use neutron_types::ids::{IdFamily, IdRegistry};

use crate::cell::{Cell, CellRegion};
use crate::point::{CoordLevel, LocalCoords, Point};
use crate::surface::{BoundaryType, Shape, Surface};
use crate::universe::{LatticeGrid, Universe, UniverseKind};
use crate::{CellHandle, MaterialHandle, SurfaceHandle, UniverseHandle};

/// User id of the root universe.
pub const ROOT_UNIVERSE_ID: i32 = 0;

/// Owns every geometric object of one problem.
#[derive(Debug, Default)]
pub struct Geometry {
    surfaces: Vec<Surface>,
    cells: Vec<Cell>,
    universes: Vec<Universe>,
    surface_ids: HashMap<i32, SurfaceHandle>,
    cell_ids: HashMap<i32, CellHandle>,
    universe_ids: HashMap<i32, UniverseHandle>,
    pub(crate) ids: IdRegistry,
}

impl Geometry {
    pub fn new() -> Self {
        Geometry::default()
    }

    // ── Construction ─────────────────────────────────────────────────

    /// Add a surface; `id` 0 auto-assigns.
    pub fn add_surface(&mut self, id: i32, shape: Shape) -> TransportResult<SurfaceHandle> {
        let id = self.ids.assign(IdFamily::Surface, id)?;
        let handle = self.surfaces.len();
        self.surfaces.push(Surface::new(handle, id, shape));
        self.surface_ids.insert(id, handle);
        Ok(handle)
    }

    pub fn set_boundary_type(&mut self, surface: SurfaceHandle, boundary: BoundaryType) {
        self.surfaces[surface].set_boundary(boundary);
    }

    /// Add a material-filled cell to universe `universe_id`; `id` 0
    /// auto-assigns. The universe is created on first use.
    pub fn add_material_cell(
        &mut self,
        id: i32,
        universe_id: i32,
        material: MaterialHandle,
        num_rings: usize,
        num_sectors: usize,
    ) -> TransportResult<CellHandle> {
        let region = CellRegion::Material {
            material,
            num_rings,
            num_sectors,
        };
        self.add_cell(id, universe_id, region)
    }

    /// Add a cell filled by another universe (or lattice).
    pub fn add_fill_cell(
        &mut self,
        id: i32,
        universe_id: i32,
        fill_universe_id: i32,
    ) -> TransportResult<CellHandle> {
        let region = CellRegion::Fill {
            universe_id: fill_universe_id,
        };
        self.add_cell(id, universe_id, region)
    }

    fn add_cell(
        &mut self,
        id: i32,
        universe_id: i32,
        region: CellRegion,
    ) -> TransportResult<CellHandle> {
        let id = self.ids.assign(IdFamily::Cell, id)?;
        let universe = self.ensure_universe(universe_id)?;
        let handle = self.cells.len();
        self.cells.push(Cell::new(handle, id, universe_id, region));
        self.cell_ids.insert(id, handle);
        self.universes[universe].add_cell(handle);
        Ok(handle)
    }

    /// Bind a surface halfspace to a cell.
    pub fn add_cell_surface(
        &mut self,
        cell: CellHandle,
        halfspace: i8,
        surface: SurfaceHandle,
    ) -> TransportResult<()> {
        let surface_id = self.surfaces[surface].id();
        self.cells[cell].add_surface(halfspace, surface_id, surface)
    }

    /// Add a lattice; rows of `universes` run top to bottom and hold
    /// universe user ids.
    pub fn add_lattice(
        &mut self,
        id: i32,
        width_x: f64,
        width_y: f64,
        universes: Vec<Vec<i32>>,
    ) -> TransportResult<UniverseHandle> {
        if id != 0 && self.universe_ids.contains_key(&id) {
            return Err(TransportError::InvalidGeometry {
                id,
                message: "a universe with this id already exists".to_string(),
            });
        }
        let id = self.ids.assign(IdFamily::Lattice, id)?;
        let grid = LatticeGrid::new(id, width_x, width_y, universes)?;
        let handle = self.universes.len();
        self.universes.push(Universe::lattice(handle, id, grid));
        self.universe_ids.insert(id, handle);
        Ok(handle)
    }

    /// Handle of the universe with this user id, creating an empty
    /// simple universe if it does not exist yet.
    pub fn ensure_universe(&mut self, universe_id: i32) -> TransportResult<UniverseHandle> {
        if let Some(&handle) = self.universe_ids.get(&universe_id) {
            return Ok(handle);
        }
        // The root id 0 bypasses the user range check.
        if universe_id != ROOT_UNIVERSE_ID {
            self.ids.assign(IdFamily::Universe, universe_id)?;
        }
        let handle = self.universes.len();
        self.universes.push(Universe::simple(handle, universe_id));
        self.universe_ids.insert(universe_id, handle);
        Ok(handle)
    }

    // ── Lookup ───────────────────────────────────────────────────────

    pub fn surface(&self, handle: SurfaceHandle) -> &Surface {
        &self.surfaces[handle]
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn cell(&self, handle: CellHandle) -> &Cell {
        &self.cells[handle]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut Vec<Cell> {
        &mut self.cells
    }

    pub(crate) fn register_cell_id(&mut self, id: i32, handle: CellHandle) {
        self.cell_ids.insert(id, handle);
    }

    pub fn universe(&self, handle: UniverseHandle) -> &Universe {
        &self.universes[handle]
    }

    pub(crate) fn universe_mut(&mut self, handle: UniverseHandle) -> &mut Universe {
        &mut self.universes[handle]
    }

    pub fn universes(&self) -> &[Universe] {
        &self.universes
    }

    pub fn universe_handle(&self, universe_id: i32) -> Option<UniverseHandle> {
        self.universe_ids.get(&universe_id).copied()
    }

    pub fn cell_handle(&self, cell_id: i32) -> Option<CellHandle> {
        self.cell_ids.get(&cell_id).copied()
    }

    pub fn surface_handle(&self, surface_id: i32) -> Option<SurfaceHandle> {
        self.surface_ids.get(&surface_id).copied()
    }

    fn resolve_universe(&self, universe_id: i32) -> TransportResult<UniverseHandle> {
        self.universe_ids
            .get(&universe_id)
            .copied()
            .ok_or(TransportError::InvalidGeometry {
                id: universe_id,
                message: "fill references an unknown universe".to_string(),
            })
    }

    /// Descend from the root universe to the material cell containing
    /// `point`, recording the full chain of local coordinates.
    pub fn find_cell(&self, point: Point) -> TransportResult<LocalCoords> {
        let mut universe = self.resolve_universe(ROOT_UNIVERSE_ID).map_err(|_| {
            TransportError::InvalidGeometry {
                id: ROOT_UNIVERSE_ID,
                message: "geometry has no root universe".to_string(),
            }
        })?;
        let mut coords = LocalCoords::new();
        let mut p = point;

        loop {
            // Each acyclic descent visits a universe at most once.
            if coords.depth() > self.universes.len() {
                return Err(TransportError::InvalidGeometry {
                    id: self.universes[universe].id(),
                    message: "universe hierarchy contains a cycle".to_string(),
                });
            }

            match self.universes[universe].kind() {
                UniverseKind::Simple { cells } => {
                    let found = cells
                        .iter()
                        .copied()
                        .find(|&c| self.cells[c].contains(&p, &self.surfaces));
                    let Some(cell) = found else {
                        return Err(TransportError::PointNotFound {
                            x: point.x,
                            y: point.y,
                        });
                    };
                    coords.push(CoordLevel::Universe {
                        universe,
                        cell,
                        point: p,
                    });
                    match self.cells[cell].region() {
                        CellRegion::Material { .. } => return Ok(coords),
                        CellRegion::Fill { universe_id } => {
                            universe = self.resolve_universe(*universe_id)?;
                        }
                    }
                }
                UniverseKind::Lattice(grid) => {
                    let Some((lx, ly, local, universe_id)) = grid.find_bin(&p) else {
                        return Err(TransportError::PointNotFound {
                            x: point.x,
                            y: point.y,
                        });
                    };
                    coords.push(CoordLevel::Lattice {
                        lattice: universe,
                        lx,
                        ly,
                        point: local,
                    });
                    universe = self.resolve_universe(universe_id)?;
                    p = local;
                }
            }
        }
    }
}
