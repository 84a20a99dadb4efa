//! The registry of all terrain cells in a run.

use indexmap::IndexMap;

use super::{Band, Cell, CellError};
use crate::types::{CellId, LandCoverId, RootZoneParams, SlotIndex};

/// Mapping from cell id to its padded band sequence.
///
/// Built once by [`merge_cell_input`](super::merge_cell_input) and mutated in
/// place afterwards; cells are never added or removed. Iteration follows the
/// cell order of the elevation input.
#[derive(Clone, Debug, PartialEq)]
pub struct CellRegistry {
    band_size: f64,
    cells: IndexMap<CellId, Cell>,
}

impl CellRegistry {
    pub(crate) fn from_cells(band_size: f64, cells: IndexMap<CellId, Cell>) -> Self {
        Self { band_size, cells }
    }

    /// Band width shared by every cell (m).
    pub fn band_size(&self) -> f64 {
        self.band_size
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the registry holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True if the registry holds `cell_id`.
    pub fn contains(&self, cell_id: &CellId) -> bool {
        self.cells.contains_key(cell_id)
    }

    /// Iterate cell ids in registry order.
    pub fn cell_ids(&self) -> impl Iterator<Item = &CellId> {
        self.cells.keys()
    }

    /// Iterate cells in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&CellId, &Cell)> {
        self.cells.iter()
    }

    /// Iterate cells mutably in registry order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&CellId, &mut Cell)> {
        self.cells.iter_mut()
    }

    /// Look up a cell.
    pub fn cell(&self, cell_id: &CellId) -> Option<&Cell> {
        self.cells.get(cell_id)
    }

    /// Look up a cell, failing with `UnknownCell`.
    pub fn get(&self, cell_id: &CellId) -> Result<&Cell, CellError> {
        self.cells.get(cell_id).ok_or_else(|| CellError::UnknownCell {
            cell_id: cell_id.clone(),
        })
    }

    /// Mutable lookup, failing with `UnknownCell`.
    pub fn get_mut(&mut self, cell_id: &CellId) -> Result<&mut Cell, CellError> {
        self.cells
            .get_mut(cell_id)
            .ok_or_else(|| CellError::UnknownCell {
                cell_id: cell_id.clone(),
            })
    }

    /// Mutable access to one live band of a cell.
    pub fn band_mut(&mut self, cell_id: &CellId, slot: SlotIndex) -> Result<&mut Band, CellError> {
        self.get_mut(cell_id)?.band_mut(slot)
    }

    /// See [`Cell::create_band`].
    pub fn create_band(&mut self, cell_id: &CellId, pixel_elev: f64) -> Result<SlotIndex, CellError> {
        self.get_mut(cell_id)?.create_band(pixel_elev)
    }

    /// See [`Cell::delete_band`].
    pub fn delete_band(&mut self, cell_id: &CellId, slot: SlotIndex) -> Result<Band, CellError> {
        self.get_mut(cell_id)?.delete_band(slot)
    }

    /// See [`Band::create_sub_area`].
    pub fn create_sub_area(
        &mut self,
        cell_id: &CellId,
        slot: SlotIndex,
        id: LandCoverId,
        area_frac: f64,
        root_zone: RootZoneParams,
    ) -> Result<(), CellError> {
        self.band_mut(cell_id, slot)?
            .create_sub_area(id, area_frac, root_zone)
    }

    /// See [`Band::delete_sub_area`].
    pub fn delete_sub_area(
        &mut self,
        cell_id: &CellId,
        slot: SlotIndex,
        id: LandCoverId,
    ) -> Result<(), CellError> {
        self.band_mut(cell_id, slot)?.delete_sub_area(id).map(|_| ())
    }
}
