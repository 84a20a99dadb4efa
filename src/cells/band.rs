//! Elevation bands and their derived area aggregates.

use std::collections::BTreeMap;

use super::{CellError, SubArea};
use crate::types::{LandCoverId, RootZoneParams};

/// A fixed-width elevation slice of a cell, holding its land-cover sub-areas.
///
/// Every area quantity on a band is computed from the current sub-areas on
/// each call; nothing is cached.
///
/// # Example
///
/// ```
/// use hydro_conductor::cells::Band;
/// use hydro_conductor::types::{LandCoverId, RootZoneParams};
///
/// let mut band = Band::new(2035.0);
/// band.create_sub_area(LandCoverId::GLACIER, 0.25, RootZoneParams::default()).unwrap();
/// band.create_sub_area(LandCoverId::OPEN_GROUND, 0.125, RootZoneParams::default()).unwrap();
///
/// assert_eq!(band.area_frac(), 0.375);
/// assert_eq!(band.area_frac_glacier(), 0.25);
/// assert_eq!(band.area_frac_non_glacier(), 0.125);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Band {
    /// Median elevation of the band (m)
    pub median_elev: f64,
    sub_areas: BTreeMap<LandCoverId, SubArea>,
}

impl Band {
    /// Create a band with no sub-areas.
    pub fn new(median_elev: f64) -> Self {
        Self {
            median_elev,
            sub_areas: BTreeMap::new(),
        }
    }

    /// Create a band from an existing set of sub-areas.
    pub fn with_sub_areas(median_elev: f64, sub_areas: BTreeMap<LandCoverId, SubArea>) -> Self {
        Self {
            median_elev,
            sub_areas,
        }
    }

    /// Add a sub-area.
    ///
    /// # Errors
    /// `DuplicateSubArea` if `id` is already present.
    pub fn create_sub_area(
        &mut self,
        id: LandCoverId,
        area_frac: f64,
        root_zone: RootZoneParams,
    ) -> Result<(), CellError> {
        if self.sub_areas.contains_key(&id) {
            return Err(CellError::DuplicateSubArea { id });
        }
        self.sub_areas.insert(id, SubArea::new(area_frac, root_zone));
        Ok(())
    }

    /// Remove a sub-area, returning it.
    ///
    /// # Errors
    /// `SubAreaNotFound` if `id` is absent.
    pub fn delete_sub_area(&mut self, id: LandCoverId) -> Result<SubArea, CellError> {
        self.sub_areas
            .remove(&id)
            .ok_or(CellError::SubAreaNotFound { id })
    }

    /// Look up a sub-area.
    pub fn sub_area(&self, id: LandCoverId) -> Option<&SubArea> {
        self.sub_areas.get(&id)
    }

    /// Look up a sub-area for area-fraction reassignment.
    pub fn sub_area_mut(&mut self, id: LandCoverId) -> Option<&mut SubArea> {
        self.sub_areas.get_mut(&id)
    }

    /// True if the band holds a sub-area of this land cover.
    pub fn contains(&self, id: LandCoverId) -> bool {
        self.sub_areas.contains_key(&id)
    }

    /// Iterate sub-areas in ascending land-cover order.
    pub fn sub_areas(&self) -> impl Iterator<Item = (LandCoverId, &SubArea)> {
        self.sub_areas.iter().map(|(&id, sa)| (id, sa))
    }

    /// Iterate sub-areas mutably in ascending land-cover order.
    pub fn sub_areas_mut(&mut self) -> impl Iterator<Item = (LandCoverId, &mut SubArea)> {
        self.sub_areas.iter_mut().map(|(&id, sa)| (id, sa))
    }

    /// Number of sub-areas.
    pub fn num_sub_areas(&self) -> usize {
        self.sub_areas.len()
    }

    /// Total area fraction: sum over all sub-areas, `+0.0` when there are none.
    pub fn area_frac(&self) -> f64 {
        self.sub_areas
            .values()
            .fold(0.0, |acc, sa| acc + sa.area_frac)
    }

    /// Area fraction of the glacier sub-area, 0 if absent.
    pub fn area_frac_glacier(&self) -> f64 {
        self.area_frac_of(LandCoverId::GLACIER)
    }

    /// Area fraction of the open-ground sub-area, 0 if absent.
    pub fn area_frac_open_ground(&self) -> f64 {
        self.area_frac_of(LandCoverId::OPEN_GROUND)
    }

    /// Area fraction of everything except glacier.
    pub fn area_frac_non_glacier(&self) -> f64 {
        self.sub_areas
            .iter()
            .filter(|(id, _)| !id.is_glacier())
            .fold(0.0, |acc, (_, sa)| acc + sa.area_frac)
    }

    fn area_frac_of(&self, id: LandCoverId) -> f64 {
        self.sub_areas.get(&id).map_or(0.0, |sa| sa.area_frac)
    }
}
