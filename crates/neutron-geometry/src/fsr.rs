//! Flat source region registry.
//!
//! An FSR is the equivalence class of points sharing the same descent
//! chain through the universe hierarchy. The registry hashes chains to
//! dense ids during ray tracing, accumulates track-weighted volumes,
//! and is frozen once tracing completes.

use std::collections::HashMap;

use neutron_types::error::{TransportError, TransportResult};

use crate::geometry::Geometry;
use crate::point::{KeyLevel, LocalCoords};
use crate::MaterialHandle;

/// Maps descent chains to dense flat source region ids.
#[derive(Debug, Default)]
pub struct FsrRegistry {
    ids: HashMap<Vec<KeyLevel>, usize>,
    materials: Vec<MaterialHandle>,
    volumes: Vec<f64>,
    frozen: bool,
}

impl FsrRegistry {
    pub fn new() -> Self {
        FsrRegistry::default()
    }

    /// Id of the region containing `coords`, allocating a new one on
    /// first encounter. The chain must terminate in a material cell.
    pub fn register(
        &mut self,
        geometry: &Geometry,
        coords: &LocalCoords,
    ) -> TransportResult<usize> {
        if self.frozen {
            return Err(TransportError::InvalidInput(
                "flat source regions are frozen".to_string(),
            ));
        }
        let key = coords.key();
        if let Some(&id) = self.ids.get(&key) {
            return Ok(id);
        }

        let cell = coords.leaf_cell().ok_or_else(|| {
            TransportError::InvalidInput(
                "coordinate chain does not end in a material cell".to_string(),
            )
        })?;
        let material = geometry.cell(cell).material().ok_or_else(|| {
            TransportError::InvalidInput(format!(
                "leaf cell {} is not material-filled",
                geometry.cell(cell).id()
            ))
        })?;

        let id = self.materials.len();
        self.ids.insert(key, id);
        self.materials.push(material);
        self.volumes.push(0.0);
        Ok(id)
    }

    /// Id of an already-registered chain.
    pub fn lookup(&self, coords: &LocalCoords) -> Option<usize> {
        self.ids.get(&coords.key()).copied()
    }

    /// Accumulate a track's volume contribution `length * weight` into
    /// region `fsr`.
    pub fn add_volume(&mut self, fsr: usize, contribution: f64) -> TransportResult<()> {
        if self.frozen {
            return Err(TransportError::InvalidInput(
                "flat source regions are frozen".to_string(),
            ));
        }
        let volume = self.volumes.get_mut(fsr).ok_or_else(|| {
            TransportError::InvalidInput(format!("flat source region {fsr} does not exist"))
        })?;
        *volume += contribution;
        Ok(())
    }

    /// Freeze the region map and volumes; further registration fails.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn num_regions(&self) -> usize {
        self.materials.len()
    }

    /// Material handle per region, indexed by FSR id.
    pub fn materials(&self) -> &[MaterialHandle] {
        &self.materials
    }

    /// Accumulated volume per region, indexed by FSR id.
    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// Override a region volume directly, for drivers that compute
    /// volumes analytically instead of by ray tracing.
    pub fn set_volume(&mut self, fsr: usize, volume: f64) -> TransportResult<()> {
        if self.frozen {
            return Err(TransportError::InvalidInput(
                "flat source regions are frozen".to_string(),
            ));
        }
        let slot = self.volumes.get_mut(fsr).ok_or_else(|| {
            TransportError::InvalidInput(format!("flat source region {fsr} does not exist"))
        })?;
        *slot = volume;
        Ok(())
    }
}
