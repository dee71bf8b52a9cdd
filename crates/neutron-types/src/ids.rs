// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Id Registry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-family auto-id counters.
//!
//! User ids live in [1, 9999]; ids from 10000 up are reserved for
//! auto-assignment. Each id family carries its own monotonic counter so
//! several geometries can coexist without shared state. The same
//! registry hands out material ids, so it lives beside the material
//! types rather than in the geometry arena.

use std::collections::HashSet;

use crate::constants::{AUTO_ID_START, MAX_USER_ID};
use crate::error::{TransportError, TransportResult};

/// The id families tracked by a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdFamily {
    Surface,
    Cell,
    Universe,
    Lattice,
    Material,
}

const NUM_FAMILIES: usize = 5;

/// Owns the auto-id counters and the set of ids already taken, one of
/// each per family.
#[derive(Debug)]
pub struct IdRegistry {
    next_auto: [i32; NUM_FAMILIES],
    taken: [HashSet<i32>; NUM_FAMILIES],
}

impl Default for IdRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdRegistry {
    pub fn new() -> Self {
        IdRegistry {
            next_auto: [AUTO_ID_START; NUM_FAMILIES],
            taken: Default::default(),
        }
    }

    /// Resolve a requested id: 0 auto-assigns the next id >= 10000, a
    /// value in [1, 9999] is accepted once per family, anything else is
    /// rejected.
    pub fn assign(&mut self, family: IdFamily, requested: i32) -> TransportResult<i32> {
        let slot = family as usize;
        if requested == 0 {
            let id = self.next_auto[slot];
            self.next_auto[slot] += 1;
            self.taken[slot].insert(id);
            return Ok(id);
        }
        if requested < 0 || requested > MAX_USER_ID {
            return Err(TransportError::InvalidGeometry {
                id: requested,
                message: format!(
                    "user ids must lie in [1, {MAX_USER_ID}]; ids from {AUTO_ID_START} are reserved"
                ),
            });
        }
        if !self.taken[slot].insert(requested) {
            return Err(TransportError::InvalidGeometry {
                id: requested,
                message: format!("duplicate {family:?} id"),
            });
        }
        Ok(requested)
    }
}
