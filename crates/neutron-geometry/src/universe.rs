//! Universes and lattices.
//!
//! A universe is a keyed collection of cells; a lattice is a regular
//! grid of universes with O(1) point lookup. Both live in the same
//! arena and share the user-id namespace, so a fill cell can name
//! either.

use neutron_types::error::{TransportError, TransportResult};

use crate::point::Point;
use crate::CellHandle;

/// Regular rectangular grid of universes.
#[derive(Debug, Clone)]
pub struct LatticeGrid {
    nx: usize,
    ny: usize,
    width_x: f64,
    width_y: f64,
    /// Universe user ids, row 0 at the top of the grid.
    universes: Vec<Vec<i32>>,
}

impl LatticeGrid {
    pub(crate) fn new(
        id: i32,
        width_x: f64,
        width_y: f64,
        universes: Vec<Vec<i32>>,
    ) -> TransportResult<Self> {
        let ny = universes.len();
        let nx = universes.first().map_or(0, Vec::len);
        if nx == 0 || ny == 0 {
            return Err(TransportError::InvalidGeometry {
                id,
                message: "lattice grid must have at least one row and column".to_string(),
            });
        }
        if universes.iter().any(|row| row.len() != nx) {
            return Err(TransportError::InvalidGeometry {
                id,
                message: "lattice rows have unequal lengths".to_string(),
            });
        }
        if !(width_x > 0.0) || !(width_y > 0.0) {
            return Err(TransportError::InvalidGeometry {
                id,
                message: format!("lattice cell widths ({width_x}, {width_y}) must be positive"),
            });
        }
        Ok(LatticeGrid {
            nx,
            ny,
            width_x,
            width_y,
            universes,
        })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn width_x(&self) -> f64 {
        self.width_x
    }

    pub fn width_y(&self) -> f64 {
        self.width_y
    }

    /// Universe user id at bin `(lx, ly)`, with `ly` counted from the
    /// bottom of the grid.
    pub fn universe_at(&self, lx: usize, ly: usize) -> i32 {
        self.universes[self.ny - 1 - ly][lx]
    }

    /// Locate the bin containing `p` (coordinates relative to the
    /// lattice center). Returns `(lx, ly, local point, universe id)`
    /// with the local point relative to the bin center, or `None` when
    /// `p` falls outside the lattice.
    pub fn find_bin(&self, p: &Point) -> Option<(usize, usize, Point, i32)> {
        let half_w = 0.5 * self.width_x * self.nx as f64;
        let half_h = 0.5 * self.width_y * self.ny as f64;

        let fx = (p.x + half_w) / self.width_x;
        let fy = (p.y + half_h) / self.width_y;
        if fx < 0.0 || fy < 0.0 {
            return None;
        }
        // A point on the outer edge belongs to the last bin.
        let lx = (fx as usize).min(self.nx.saturating_sub(1));
        let ly = (fy as usize).min(self.ny.saturating_sub(1));
        if p.x > half_w || p.y > half_h {
            return None;
        }

        let center_x = -half_w + (lx as f64 + 0.5) * self.width_x;
        let center_y = -half_h + (ly as f64 + 0.5) * self.width_y;
        let local = Point::new(p.x - center_x, p.y - center_y);
        Some((lx, ly, local, self.universe_at(lx, ly)))
    }
}

/// What a universe arena slot holds.
#[derive(Debug, Clone)]
pub enum UniverseKind {
    Simple { cells: Vec<CellHandle> },
    Lattice(LatticeGrid),
}

/// A node of the geometry hierarchy: either a plain collection of
/// cells or a lattice.
#[derive(Debug, Clone)]
pub struct Universe {
    uid: usize,
    id: i32,
    kind: UniverseKind,
}

impl Universe {
    pub(crate) fn simple(uid: usize, id: i32) -> Self {
        Universe {
            uid,
            id,
            kind: UniverseKind::Simple { cells: Vec::new() },
        }
    }

    pub(crate) fn lattice(uid: usize, id: i32, grid: LatticeGrid) -> Self {
        Universe {
            uid,
            id,
            kind: UniverseKind::Lattice(grid),
        }
    }

    pub fn uid(&self) -> usize {
        self.uid
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn kind(&self) -> &UniverseKind {
        &self.kind
    }

    pub fn is_lattice(&self) -> bool {
        matches!(self.kind, UniverseKind::Lattice(_))
    }

    /// Cell handles of a simple universe; empty for lattices.
    pub fn cells(&self) -> &[CellHandle] {
        match &self.kind {
            UniverseKind::Simple { cells } => cells,
            UniverseKind::Lattice(_) => &[],
        }
    }

    pub(crate) fn add_cell(&mut self, cell: CellHandle) {
        if let UniverseKind::Simple { cells } = &mut self.kind {
            cells.push(cell);
        }
    }

    pub(crate) fn set_cells(&mut self, new_cells: Vec<CellHandle>) {
        if let UniverseKind::Simple { cells } = &mut self.kind {
            *cells = new_cells;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_bin_lookup() {
        // 2x2 lattice of 1.0-wide bins spanning [-1, 1] in both axes.
        let grid = LatticeGrid::new(1, 1.0, 1.0, vec![vec![3, 4], vec![1, 2]]).unwrap();

        // Bottom-left bin.
        let (lx, ly, local, id) = grid.find_bin(&Point::new(-0.5, -0.5)).unwrap();
        assert_eq!((lx, ly), (0, 0));
        assert_eq!(id, 1);
        assert!(local.x.abs() < 1e-12 && local.y.abs() < 1e-12);

        // Top-right bin: row 0 of the input grid is the top row.
        let (lx, ly, _, id) = grid.find_bin(&Point::new(0.7, 0.7)).unwrap();
        assert_eq!((lx, ly), (1, 1));
        assert_eq!(id, 4);
    }

    #[test]
    fn test_lattice_local_coordinates() {
        let grid = LatticeGrid::new(1, 2.0, 2.0, vec![vec![1, 1], vec![1, 1]]).unwrap();
        let (lx, ly, local, _) = grid.find_bin(&Point::new(1.5, -0.25)).unwrap();
        assert_eq!((lx, ly), (1, 0));
        // Bin center at (1.0, -1.0).
        assert!((local.x - 0.5).abs() < 1e-12);
        assert!((local.y - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_point_outside_lattice() {
        let grid = LatticeGrid::new(1, 1.0, 1.0, vec![vec![1]]).unwrap();
        assert!(grid.find_bin(&Point::new(2.0, 0.0)).is_none());
        assert!(grid.find_bin(&Point::new(0.0, -2.0)).is_none());
    }

    #[test]
    fn test_ragged_grid_rejected() {
        let result = LatticeGrid::new(9, 1.0, 1.0, vec![vec![1, 2], vec![3]]);
        assert!(matches!(
            result,
            Err(TransportError::InvalidGeometry { .. })
        ));
    }
}
