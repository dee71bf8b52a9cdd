//! Ring and sector subdivision of material cells.
//!
//! Sectorization slices an annular cell into equal-angle wedges with
//! planes through the origin; ringification slices it into equal-area
//! rings with concentric circles. Sectors are built first, rings are
//! layered on top of each sector, so the final subcell list is the
//! sectors x rings product. Every subcell is a clone of the parent
//! with the synthesized surfaces added to its bound map.

use std::f64::consts::PI;

use log::{debug, warn};
use neutron_types::error::{TransportError, TransportResult};
use neutron_types::ids::IdFamily;

use crate::geometry::Geometry;
use crate::surface::Shape;
use crate::universe::UniverseKind;
use crate::CellHandle;

impl Geometry {
    /// Replace every material cell that requests rings or sectors by
    /// its subdivided children. Run once, after construction and
    /// before flat source regions are assigned.
    pub fn subdivide_cells(&mut self) -> TransportResult<()> {
        for u in 0..self.universes().len() {
            let UniverseKind::Simple { cells } = self.universe(u).kind() else {
                continue;
            };
            let old_cells = cells.clone();
            let needs_work = old_cells.iter().any(|&c| {
                let cell = self.cell(c);
                cell.num_rings() > 0 || cell.num_sectors() > 0
            });
            if !needs_work {
                continue;
            }

            let mut new_cells = Vec::with_capacity(old_cells.len());
            for c in old_cells {
                let cell = self.cell(c);
                if cell.num_rings() == 0 && cell.num_sectors() == 0 {
                    new_cells.push(c);
                } else {
                    new_cells.extend(self.subdivide_cell(c)?);
                }
            }
            self.universe_mut(u).set_cells(new_cells);
        }
        Ok(())
    }

    /// Subdivide one material cell into its ring/sector children.
    /// Returns the replacement list; on a degenerate ring request the
    /// ring step is skipped with a warning.
    pub fn subdivide_cell(&mut self, cell: CellHandle) -> TransportResult<Vec<CellHandle>> {
        let num_rings = self.cell(cell).num_rings();
        let num_sectors = self.cell(cell).num_sectors();
        if num_rings == 0 && num_sectors == 0 {
            return Ok(vec![cell]);
        }

        let sectors = self.sectorize(cell, num_sectors)?;
        let parents = if sectors.is_empty() {
            vec![cell]
        } else {
            sectors.clone()
        };

        if num_rings == 0 {
            return Ok(parents);
        }
        match self.ring_layout(cell, num_rings)? {
            Some((x0, y0, radii)) => self.ringify(&parents, x0, y0, &radii),
            // Degenerate ring request: keep whatever sectorization
            // produced.
            None => Ok(parents),
        }
    }

    /// Clone a cell for subdivision: fresh uid and auto id, subdivision
    /// counts reset, surfaces shared.
    fn clone_cell(&mut self, cell: CellHandle) -> TransportResult<CellHandle> {
        let id = self.ids.assign(IdFamily::Cell, 0)?;
        let handle = self.cells().len();
        let mut clone = self.cell(cell).clone_basic(handle, id);
        clone.reset_subdivision();
        self.cells_mut().push(clone);
        self.register_cell_id(id, handle);
        Ok(handle)
    }

    /// Build `num_sectors` wedge clones bounded by planes through the
    /// origin. Empty result when fewer than two sectors are requested.
    fn sectorize(
        &mut self,
        cell: CellHandle,
        num_sectors: usize,
    ) -> TransportResult<Vec<CellHandle>> {
        if num_sectors < 2 {
            return Ok(Vec::new());
        }
        debug!(
            "sectorizing cell {} into {} sectors",
            self.cell(cell).id(),
            num_sectors
        );

        let delta_azim = 2.0 * PI / num_sectors as f64;
        let mut planes = Vec::with_capacity(num_sectors);
        for i in 0..num_sectors {
            let azim = i as f64 * delta_azim;
            planes.push(self.add_surface(
                0,
                Shape::Plane {
                    a: azim.cos(),
                    b: azim.sin(),
                    c: 0.0,
                },
            )?);
        }

        let mut sectors = Vec::with_capacity(num_sectors);
        for i in 0..num_sectors {
            let sector = self.clone_cell(cell)?;
            self.add_cell_surface(sector, 1, planes[i])?;
            // Two sectors are complementary halfplanes; more need the
            // trailing bound as well.
            if num_sectors != 2 {
                self.add_cell_surface(sector, -1, planes[(i + 1) % num_sectors])?;
            }
            sectors.push(sector);
        }
        Ok(sectors)
    }

    /// Inspect the circle bounds of `cell` and compute the equal-area
    /// ring radii, outermost first. `Ok(None)` flags a degenerate
    /// request that should leave the cell unringed.
    fn ring_layout(
        &self,
        cell: CellHandle,
        num_rings: usize,
    ) -> TransportResult<Option<(f64, f64, Vec<f64>)>> {
        let cell_id = self.cell(cell).id();
        let mut num_circles = 0usize;
        let mut outer: Option<(f64, f64, f64)> = None;
        let mut inner: Option<(f64, f64, f64)> = None;

        for sh in self.cell(cell).surfaces().values() {
            if let Shape::Circle { x0, y0, radius } = *self.surface(sh.surface).shape() {
                num_circles += 1;
                if sh.halfspace == -1 {
                    outer = Some((x0, y0, radius));
                } else {
                    inner = Some((x0, y0, radius));
                }
            }
        }

        if num_circles == 0 {
            return Err(TransportError::InvalidGeometry {
                id: cell_id,
                message: "cannot ringify a cell without a circle bound".to_string(),
            });
        }
        if num_circles > 2 {
            warn!("cell {cell_id} has {num_circles} circle bounds, leaving it unringed");
            return Ok(None);
        }
        let Some((x0, y0, r_out)) = outer else {
            return Err(TransportError::InvalidGeometry {
                id: cell_id,
                message: "rings need the interior (-1) halfspace of a circle".to_string(),
            });
        };
        let r_in = match inner {
            Some((xi, yi, r)) => {
                if xi != x0 || yi != y0 {
                    return Err(TransportError::InvalidGeometry {
                        id: cell_id,
                        message: format!(
                            "circle centers ({x0}, {y0}) and ({xi}, {yi}) disagree"
                        ),
                    });
                }
                r
            }
            None => 0.0,
        };
        if r_out <= r_in {
            warn!(
                "cell {cell_id}: outer radius {r_out} does not exceed inner radius {r_in}, \
                 leaving it unringed"
            );
            return Ok(None);
        }

        // Equal ring areas: r_{k+1} = sqrt(r_k^2 - A/pi).
        let area = PI * (r_out * r_out - r_in * r_in) / num_rings as f64;
        let mut radii = Vec::with_capacity(num_rings);
        let mut r = r_out;
        for k in 0..num_rings {
            radii.push(r);
            if k + 1 < num_rings {
                r = (r * r - area / PI).sqrt();
            }
        }
        Ok(Some((x0, y0, radii)))
    }

    /// Layer ring bounds over each parent clone. `radii` is outermost
    /// first; ring k is bounded by `(-1, circle_k)` and, except for the
    /// innermost, `(+1, circle_{k+1})`.
    fn ringify(
        &mut self,
        parents: &[CellHandle],
        x0: f64,
        y0: f64,
        radii: &[f64],
    ) -> TransportResult<Vec<CellHandle>> {
        let mut circles = Vec::with_capacity(radii.len());
        for &radius in radii {
            circles.push(self.add_surface(0, Shape::Circle { x0, y0, radius })?);
        }

        let mut rings = Vec::with_capacity(radii.len() * parents.len());
        for (k, &circle) in circles.iter().enumerate() {
            for &parent in parents {
                let ring = self.clone_cell(parent)?;
                self.add_cell_surface(ring, -1, circle)?;
                if k + 1 < circles.len() {
                    self.add_cell_surface(ring, 1, circles[k + 1])?;
                }
                rings.push(ring);
            }
        }
        Ok(rings)
    }
}
