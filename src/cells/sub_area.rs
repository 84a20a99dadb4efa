//! Land-cover sub-area records.

use crate::types::RootZoneParams;

/// One land-cover type's share of an elevation band (a hydrologic response unit).
///
/// The area fraction is reassigned every coupling iteration; the root-zone
/// parameters are fixed once the record exists. Neither is range-checked.
#[derive(Clone, Debug, PartialEq)]
pub struct SubArea {
    /// Fraction of the cell area covered by this land cover within the band
    pub area_frac: f64,
    root_zone: RootZoneParams,
}

impl SubArea {
    /// Create a new sub-area record.
    pub fn new(area_frac: f64, root_zone: RootZoneParams) -> Self {
        Self { area_frac, root_zone }
    }

    /// Root-zone parameters of this land cover.
    #[inline]
    pub fn root_zone_parms(&self) -> &RootZoneParams {
        &self.root_zone
    }
}
