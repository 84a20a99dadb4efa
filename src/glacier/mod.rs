//! Coupling between the glacier model grid and the VIC band registry.
//!
//! Each coupling iteration:
//! 1. translates VIC's per-cell mass-balance polynomials into a mass-balance
//!    grid for the glacier model ([`mass_balances_to_rgm_grid`]),
//! 2. derives a glacier mask from the glacier model's new surface DEM and the
//!    bed DEM ([`update_glacier_mask`]),
//! 3. rebins every pixel into elevation bands and recomputes band and
//!    sub-area fractions ([`update_band_areas`]).

mod band_areas;
mod mask;
mod mass_balance;

pub use band_areas::{BandAreaSummary, SubAreaRoots, update_band_areas};
pub use mask::{GlacierMask, update_glacier_mask};
pub use mass_balance::{MassBalancePolynomial, mass_balances_to_rgm_grid};

use thiserror::Error;

use crate::cells::CellError;
use crate::types::CellId;

/// Errors raised while coupling glacier model output to the band registry.
#[derive(Debug, Error, PartialEq)]
pub enum GlacierError {
    /// A grid's shape differs from the reference grid
    #[error("{what} is {actual:?} (rows, cols), expected {expected:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Surface lies below bed
    #[error("Negative ice thickness {thickness} at row {row}, column {col}")]
    NegativeIceThickness { row: usize, col: usize, thickness: f64 },

    /// Pixel map or mass-balance input names a cell that is not registered
    #[error("Cell {cell_id} is not in the registry")]
    UnknownCell { cell_id: CellId },

    /// Band or sub-area operation failed for a cell
    #[error("Cell {cell_id}: {source}")]
    Cell {
        cell_id: CellId,
        #[source]
        source: CellError,
    },

    /// Band area fractions of a cell no longer sum to one
    #[error("Area fractions of cell {cell_id} sum to {sum}, expected 1")]
    AreaFractionSum { cell_id: CellId, sum: f64 },
}

impl GlacierError {
    pub(crate) fn cell(cell_id: &CellId) -> impl FnOnce(CellError) -> GlacierError + '_ {
        move |source| GlacierError::Cell {
            cell_id: cell_id.clone(),
            source,
        }
    }
}
