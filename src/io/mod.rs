//! Readers and writers for the files exchanged with VIC and the glacier model.
//!
//! This module provides:
//! - **Snow-band files**: per-cell band area fractions and median elevations
//! - **Vegetation parameter files**: per-cell, per-band land-cover tiles
//! - **GSA grids**: Surfer DSAA rasters for DEMs, glacier masks and mass balance
//! - **Pixel maps**: glacier-model pixel to VIC cell assignment
//! - **Global parameter files**: VIC run control, rewritten between iterations
//! - **Root-zone files**: one-line root-zone overrides
//! - **State files**: mass-balance polynomials (requires `netcdf` feature)
//!
//! Each format module documents its layout. Readers come in pairs:
//! `read_*_file(path)` for files and `parse_*(content)` for strings.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use hydro_conductor::cells::merge_cell_input;
//! use hydro_conductor::io::{read_snb_file, read_veg_param_file, write_veg_param_file};
//!
//! let snb = read_snb_file(Path::new("snb.txt"), 12)?;
//! let vpf = read_veg_param_file(Path::new("vpf.txt"))?;
//! let elevations = snb.elevation_input();
//! let land_cover = vpf.land_cover_input(&elevations)?;
//! let registry = merge_cell_input(elevations, land_cover, 100.0)?;
//! write_veg_param_file(Path::new("vpf_next.txt"), &registry)?;
//! ```

mod global_params;
mod gsa_grid;
mod pixel_map;
mod root_zone;
mod snb_params;
mod state_file;
mod veg_params;

pub use global_params::{
    GlobalParams, GlobalParamsError, parse_global_params, read_global_params_file,
};
pub use gsa_grid::{
    GsaExtent, GsaFileError, GsaGrid, GsaHeader, format_gsa_grid, parse_gsa_grid,
    read_gsa_file, read_gsa_header, write_gsa_file,
};
pub use pixel_map::{
    PixelAssignment, PixelMap, PixelMapError, parse_pixel_map, read_pixel_map_file,
};
pub use root_zone::{RootZoneFileError, parse_root_zone, read_root_zone_file};
pub use snb_params::{
    SnbFileError, SnowBandFile, SnowBandRecord, format_snb_params, parse_snb_params,
    read_snb_file, write_snb_file,
};
pub use state_file::{
    MASS_BALANCE_VARIABLE, MassBalances, StateFileError, mass_balances_from_rows,
    read_mass_balance_polynomials,
};
pub use veg_params::{
    VegParamFile, VegParamFileError, VegTile, format_veg_params, parse_veg_params,
    read_veg_param_file, write_veg_param_file,
};
