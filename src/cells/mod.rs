//! Per-cell elevation band and land-cover sub-area model.
//!
//! This is the state the coupling loop carries between the hydrology and
//! glacier models:
//! - [`SubArea`]: one land cover's share of a band plus its root-zone parameters
//! - [`Band`]: one elevation slice, keyed sub-areas, derived area aggregates
//! - [`Cell`]: fixed-capacity padded run of bands that grows and shrinks only at its ends
//! - [`CellRegistry`]: all cells of the run
//! - [`merge_cell_input`]: builds the registry from the elevation and land-cover inputs
//!
//! # Example
//!
//! ```
//! use hydro_conductor::cells::{Band, Cell};
//! use hydro_conductor::types::{LandCoverId, RootZoneParams, SlotIndex};
//!
//! // Two live bands (2000-2100 m, 2100-2200 m) with one padding slot above
//! let bands = vec![Band::new(2050.0), Band::new(2150.0)];
//! let mut cell = Cell::new(2000.0, 100.0, 0, bands, 1).unwrap();
//!
//! // The glacier surface reaches a new, higher band
//! let slot = cell.create_band(2230.0).unwrap();
//! assert_eq!(slot, SlotIndex::new(2));
//! cell.band_mut(slot)
//!     .unwrap()
//!     .create_sub_area(LandCoverId::GLACIER, 0.05, RootZoneParams::default())
//!     .unwrap();
//!
//! // No padding left above
//! assert!(cell.create_band(2330.0).is_err());
//! assert_eq!(cell.right_padding(), 0);
//! ```

mod band;
mod cell;
mod error;
mod merge;
mod registry;
mod sub_area;

pub use band::Band;
pub use cell::Cell;
pub use error::{CellError, ErrorKind, Side};
pub use merge::{ElevationInput, LandCoverInput, SlotLayout, merge_cell_input, slot_layout};
pub use registry::CellRegistry;
pub use sub_area::SubArea;
