//! Error types for the band / sub-area data model.

use thiserror::Error;

use crate::types::{CellId, LandCoverId, SlotIndex};

/// Broad classification of a [`CellError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller asked for something the structure cannot do
    /// (interior delete, duplicate or missing key, bad index).
    Usage,
    /// A new band would need padding that is not available.
    Range,
    /// Two inputs disagree, or a derived quantity is impossible.
    Consistency,
}

/// Which end of a cell's live band run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Low-elevation end.
    Low,
    /// High-elevation end.
    High,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Low => f.write_str("low"),
            Side::High => f.write_str("high"),
        }
    }
}

/// Errors raised by cells, bands and the merge builder.
#[derive(Debug, Error, PartialEq)]
pub enum CellError {
    /// Sub-area id already present in the band
    #[error("Sub-area {id} already exists in band")]
    DuplicateSubArea { id: LandCoverId },

    /// Sub-area id not present in the band
    #[error("Sub-area {id} not found in band")]
    SubAreaNotFound { id: LandCoverId },

    /// Slot outside `[0, capacity)`
    #[error("Slot {slot} is outside the cell capacity of {capacity}")]
    SlotOutOfBounds { slot: usize, capacity: usize },

    /// Slot is reserved padding, not a live band
    #[error("Slot {slot} is padding, not a live band")]
    EmptySlot { slot: SlotIndex },

    /// Band deletion requested away from either end of the live run
    #[error("Cannot delete band {slot}: only the lowest or highest live band may be removed")]
    InteriorBand { slot: SlotIndex },

    /// Elevation passed to band creation is NaN or infinite
    #[error("Elevation {elevation} is not finite")]
    NonFiniteElevation { elevation: f64 },

    /// Band size must be strictly positive
    #[error("Band size must be positive, got {band_size}")]
    InvalidBandSize { band_size: f64 },

    /// Cell id not present in the registry
    #[error("Unknown cell {cell_id}")]
    UnknownCell { cell_id: CellId },

    /// Target slot already holds a live band
    #[error("Slot {slot} already holds a live band")]
    SlotOccupied { slot: SlotIndex },

    /// Target slot is not adjacent to the live run
    #[error("Target slot {target} leaves a gap next to live bands [{lowest}, {highest}]")]
    BandGap { target: i64, lowest: i64, highest: i64 },

    /// Required padding on one side has been used up
    #[error("No {side} padding left to create band at slot {target}")]
    PaddingExhausted { side: Side, target: i64 },

    /// Cell present in only one of the two merge inputs
    #[error("Cell ID mismatch: cell {cell_id} is missing from the {missing_from} input")]
    CellIdMismatch { cell_id: CellId, missing_from: &'static str },

    /// Live band counts disagree between the merge inputs
    #[error(
        "Band count mismatch for cell {cell_id}: {elevation_bands} live bands in elevation input, {land_cover_bands} in land-cover input"
    )]
    BandCountMismatch {
        cell_id: CellId,
        elevation_bands: usize,
        land_cover_bands: usize,
    },

    /// A zero placeholder sits between live bands
    #[error("Cell {cell_id} has a placeholder at position {position} inside its live bands")]
    NonContiguousBands { cell_id: CellId, position: usize },

    /// Elevation input holds only placeholders for this cell
    #[error("Cell {cell_id} has no live bands")]
    NoLiveBands { cell_id: CellId },

    /// A computed area fraction came out negative
    #[error("Negative area fraction {area_frac} computed for cell {cell_id}, band {slot}")]
    NegativeAreaFraction {
        cell_id: CellId,
        slot: SlotIndex,
        area_frac: f64,
    },
}

impl CellError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CellError::DuplicateSubArea { .. }
            | CellError::SubAreaNotFound { .. }
            | CellError::SlotOutOfBounds { .. }
            | CellError::EmptySlot { .. }
            | CellError::InteriorBand { .. }
            | CellError::NonFiniteElevation { .. }
            | CellError::InvalidBandSize { .. }
            | CellError::UnknownCell { .. } => ErrorKind::Usage,
            CellError::SlotOccupied { .. }
            | CellError::BandGap { .. }
            | CellError::PaddingExhausted { .. } => ErrorKind::Range,
            CellError::CellIdMismatch { .. }
            | CellError::BandCountMismatch { .. }
            | CellError::NonContiguousBands { .. }
            | CellError::NoLiveBands { .. }
            | CellError::NegativeAreaFraction { .. } => ErrorKind::Consistency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let usage = CellError::InteriorBand { slot: SlotIndex::new(2) };
        assert_eq!(usage.kind(), ErrorKind::Usage);

        let range = CellError::PaddingExhausted { side: Side::High, target: 5 };
        assert_eq!(range.kind(), ErrorKind::Range);
        assert_eq!(range.to_string(), "No high padding left to create band at slot 5");

        let consistency = CellError::NoLiveBands { cell_id: CellId::from("1") };
        assert_eq!(consistency.kind(), ErrorKind::Consistency);
    }
}
