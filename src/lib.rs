//! # hydro-conductor
//!
//! Couples the VIC hydrology model with the Regional Glacier Model (RGM).
//!
//! VIC represents each grid cell as a stack of fixed-height elevation bands,
//! each split into land-cover sub-areas (one of them glacier). As glaciers
//! thicken and retreat, this crate rebins the glacier model's pixels into
//! bands, growing or shrinking each cell's band run inside its fixed slot
//! capacity and recomputing band and sub-area fractions.
//!
//! This crate provides:
//! - Strongly typed identifiers and root-zone parameters ([`types`])
//! - The band / sub-area data model and its padded band sequence ([`cells`])
//! - Row-major rasters ([`grid`])
//! - VIC and RGM file formats ([`io`])
//! - Glacier mask, mass-balance grid and band-area updates ([`glacier`])
//! - The coupled run loop ([`simulation`])

pub mod cells;
pub mod glacier;
pub mod grid;
pub mod io;
pub mod simulation;
pub mod types;

// Re-export main types for convenience
pub use cells::{
    Band, Cell, CellError, CellRegistry, ElevationInput, ErrorKind, LandCoverInput, Side,
    SubArea, merge_cell_input,
};
pub use glacier::{
    BandAreaSummary, GlacierError, GlacierMask, MassBalancePolynomial, SubAreaRoots,
    mass_balances_to_rgm_grid, update_band_areas, update_glacier_mask,
};
pub use grid::{Grid2D, GridShapeError};
pub use simulation::{
    Conductor, ConductorConfig, ConductorError, ExternalModels, ProcessModels, RunRange,
    RunRanges,
};
pub use types::{CellId, LandCoverId, RootZoneParams, SlotIndex};
