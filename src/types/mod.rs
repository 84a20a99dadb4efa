//! Strongly-typed identifiers and parameter vectors.
//!
//! These types keep the two key spaces of the coupling apart: terrain cell ids
//! (opaque tokens from the input files) and land-cover ids (small integers that
//! name a vegetation class / HRU type), plus absolute band slot numbers.
//!
//! # Example
//!
//! ```
//! use hydro_conductor::types::{CellId, LandCoverId, SlotIndex};
//!
//! let cell = CellId::from("369560");
//! assert_eq!(cell.as_str(), "369560");
//!
//! assert!(LandCoverId::GLACIER.is_glacier());
//! assert_eq!(SlotIndex::new(3).to_string(), "B3");
//! ```

mod ids;
mod indices;
mod root_zone;

pub use ids::{CellId, LandCoverId};
pub use indices::SlotIndex;
pub use root_zone::{ParseRootZoneError, ROOT_ZONE_LEN, RootZoneParams};
