//! Rebinning of glacier model pixels into elevation bands.
//!
//! After each glacier model run every mapped pixel has a new surface
//! elevation. Pixels are assigned to the band slot containing that elevation,
//! bands are grown or shrunk at either end of each cell's live run, and band
//! and sub-area fractions are recomputed from pixel counts.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use tracing::{debug, info};

use super::{GlacierError, GlacierMask};
use crate::cells::{Band, Cell, CellError, CellRegistry};
use crate::grid::Grid2D;
use crate::io::PixelMap;
use crate::types::{CellId, LandCoverId, RootZoneParams, SlotIndex};

/// Tolerance on the per-cell sum of band area fractions.
const AREA_SUM_TOL: f64 = 1e-6;

/// Root-zone parameters for sub-areas created by the band update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SubAreaRoots {
    /// Used for new glacier sub-areas
    pub glacier: RootZoneParams,
    /// Used for new open-ground sub-areas
    pub open_ground: RootZoneParams,
}

/// Bands created and deleted by one call to [`update_band_areas`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BandAreaSummary {
    pub created: Vec<(CellId, SlotIndex)>,
    pub deleted: Vec<(CellId, SlotIndex)>,
    /// Cells with at least one mapped pixel
    pub cells_updated: usize,
}

#[derive(Debug, Default)]
struct SlotTally {
    elevations: Vec<f64>,
    glacier_pixels: usize,
}

impl SlotTally {
    fn median(&self) -> f64 {
        let mut z = self.elevations.clone();
        z.sort_by(f64::total_cmp);
        let n = z.len();
        if n % 2 == 1 {
            z[n / 2]
        } else {
            0.5 * (z[n / 2 - 1] + z[n / 2])
        }
    }
}

/// Recompute bands and sub-area fractions from a new surface DEM.
///
/// Every mapped pixel takes its elevation from `surface_dem` (the pixel map is
/// updated in place) and is binned into the slot containing it. Missing bands
/// are created outward from the live run; empty bands at either end are
/// deleted. Interior bands that lost all their pixels are kept with zero
/// area. Cells without mapped pixels are left untouched.
///
/// Within each band the glacier sub-area tracks the glacier pixel fraction and
/// the remaining area is shared among the other sub-areas in proportion to
/// their previous fractions. When none of them had area, an open-ground
/// sub-area takes it all. A band with no pixels keeps a zero-area open-ground
/// sub-area.
///
/// # Errors
/// - `DimensionMismatch` if the DEM or mask shape differs from the pixel map
/// - `UnknownCell` if a pixel belongs to a cell not in the registry
/// - `Cell` if a band cannot be created (padding exhausted or a gap would
///   open) or a fraction comes out negative
/// - `AreaFractionSum` if a cell's band fractions do not sum to one
pub fn update_band_areas(
    registry: &mut CellRegistry,
    pixel_map: &mut PixelMap,
    surface_dem: &Grid2D,
    glacier_mask: &GlacierMask,
    roots: &SubAreaRoots,
) -> Result<BandAreaSummary, GlacierError> {
    let shape = pixel_map.shape();
    if surface_dem.shape() != shape {
        return Err(GlacierError::DimensionMismatch {
            what: "surface DEM",
            expected: shape,
            actual: surface_dem.shape(),
        });
    }
    if glacier_mask.shape() != shape {
        return Err(GlacierError::DimensionMismatch {
            what: "glacier mask",
            expected: shape,
            actual: glacier_mask.shape(),
        });
    }

    let mapped: Vec<(usize, usize, CellId)> = pixel_map
        .iter_mapped()
        .map(|(row, col, p)| (row, col, p.cell_id.clone()))
        .collect();

    let mut tallies: IndexMap<CellId, BTreeMap<i64, SlotTally>> = IndexMap::new();
    for (row, col, cell_id) in mapped {
        let z = surface_dem.get(row, col);
        pixel_map.set_elevation(row, col, z);

        let cell = registry
            .cell(&cell_id)
            .ok_or_else(|| GlacierError::UnknownCell {
                cell_id: cell_id.clone(),
            })?;
        let slot = cell.slot_for_elevation(z);
        let tally = tallies
            .entry(cell_id)
            .or_default()
            .entry(slot)
            .or_default();
        tally.elevations.push(z);
        if glacier_mask.is_glacier(row, col) {
            tally.glacier_pixels += 1;
        }
    }

    let mut summary = BandAreaSummary::default();
    for (cell_id, bins) in &tallies {
        let cell_area = pixel_map.cell_area(cell_id) as f64;
        let cell = registry
            .get_mut(cell_id)
            .map_err(GlacierError::cell(cell_id))?;

        // Grow outward from the live run so each new band is adjacent to it.
        let lowest = cell.left_padding() as i64;
        let highest = (cell.capacity() - cell.right_padding()) as i64 - 1;
        let below = bins.range(..lowest).rev();
        let above = bins.range(highest + 1..);
        for (_, tally) in below.chain(above) {
            let slot = cell
                .create_band(tally.median())
                .map_err(GlacierError::cell(cell_id))?;
            summary.created.push((cell_id.clone(), slot));
        }

        let is_empty = |slot: Option<SlotIndex>| {
            slot.filter(|s| !bins.contains_key(&(s.get() as i64)))
        };
        while let Some(slot) = is_empty(cell.lowest_slot()) {
            cell.delete_band(slot).map_err(GlacierError::cell(cell_id))?;
            summary.deleted.push((cell_id.clone(), slot));
        }
        while let Some(slot) = is_empty(cell.highest_slot()) {
            cell.delete_band(slot).map_err(GlacierError::cell(cell_id))?;
            summary.deleted.push((cell_id.clone(), slot));
        }

        for (slot, band) in cell.bands_mut() {
            let (band_frac, glacier_frac) = match bins.get(&(slot.get() as i64)) {
                Some(tally) => {
                    band.median_elev = tally.median();
                    (
                        tally.elevations.len() as f64 / cell_area,
                        tally.glacier_pixels as f64 / cell_area,
                    )
                }
                None => (0.0, 0.0),
            };

            let residual = band_frac - glacier_frac;
            check_non_negative(cell_id, slot, [band_frac, glacier_frac, residual])?;

            apply_fractions(band, glacier_frac, residual, roots)
                .map_err(GlacierError::cell(cell_id))?;
            debug!(
                cell = %cell_id,
                %slot,
                median_elev = band.median_elev,
                band_frac,
                glacier_frac,
                "updated band"
            );
        }

        check_area_sum(cell_id, cell)?;
        summary.cells_updated += 1;
    }

    info!(
        cells = summary.cells_updated,
        created = summary.created.len(),
        deleted = summary.deleted.len(),
        "updated band areas"
    );
    Ok(summary)
}

// Fractions derived from pixel counts always pass these two checks; they
// hold the band and cell invariants against any other source of fractions.

fn check_non_negative(
    cell_id: &CellId,
    slot: SlotIndex,
    fractions: [f64; 3],
) -> Result<(), GlacierError> {
    match fractions.into_iter().find(|&f| f < 0.0) {
        Some(area_frac) => Err(GlacierError::Cell {
            cell_id: cell_id.clone(),
            source: CellError::NegativeAreaFraction {
                cell_id: cell_id.clone(),
                slot,
                area_frac,
            },
        }),
        None => Ok(()),
    }
}

fn check_area_sum(cell_id: &CellId, cell: &Cell) -> Result<(), GlacierError> {
    let sum = cell.area_frac();
    if (sum - 1.0).abs() > AREA_SUM_TOL {
        return Err(GlacierError::AreaFractionSum {
            cell_id: cell_id.clone(),
            sum,
        });
    }
    Ok(())
}

/// Set a band's glacier sub-area and rescale its other sub-areas.
fn apply_fractions(
    band: &mut Band,
    glacier_frac: f64,
    residual: f64,
    roots: &SubAreaRoots,
) -> Result<(), CellError> {
    if glacier_frac > 0.0 {
        match band.sub_area_mut(LandCoverId::GLACIER) {
            Some(sub_area) => sub_area.area_frac = glacier_frac,
            None => band.create_sub_area(LandCoverId::GLACIER, glacier_frac, roots.glacier)?,
        }
    } else if band.contains(LandCoverId::GLACIER) {
        band.delete_sub_area(LandCoverId::GLACIER)?;
    }

    if residual > 0.0 {
        let previous = band.area_frac_non_glacier();
        if previous > 0.0 {
            let scale = residual / previous;
            for (id, sub_area) in band.sub_areas_mut() {
                if !id.is_glacier() {
                    sub_area.area_frac *= scale;
                }
            }
        } else {
            match band.sub_area_mut(LandCoverId::OPEN_GROUND) {
                Some(sub_area) => sub_area.area_frac = residual,
                None => {
                    band.create_sub_area(LandCoverId::OPEN_GROUND, residual, roots.open_ground)?
                }
            }
        }
    } else {
        // A live band keeps at least one sub-area so it still writes a tile.
        let keep_open_ground = glacier_frac <= 0.0;
        let others: Vec<LandCoverId> = band
            .sub_areas()
            .map(|(id, _)| id)
            .filter(|id| !id.is_glacier())
            .filter(|id| !(keep_open_ground && id.is_open_ground()))
            .collect();
        for id in others {
            band.delete_sub_area(id)?;
        }
        if keep_open_ground {
            match band.sub_area_mut(LandCoverId::OPEN_GROUND) {
                Some(sub_area) => sub_area.area_frac = 0.0,
                None => band.create_sub_area(LandCoverId::OPEN_GROUND, 0.0, roots.open_ground)?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::{merge_cell_input, ElevationInput, LandCoverInput, SubArea};
    use crate::io::parse_pixel_map;
    use approx::assert_relative_eq;

    const VEG: LandCoverId = LandCoverId::new(11);

    fn sub_areas(entries: &[(LandCoverId, f64)]) -> BTreeMap<LandCoverId, SubArea> {
        entries
            .iter()
            .map(|&(id, af)| (id, SubArea::new(af, RootZoneParams::default())))
            .collect()
    }

    /// One cell, slots 1900..2400 by 100 m, live bands at 2000 and 2100.
    fn registry() -> CellRegistry {
        let mut elevs = ElevationInput::new();
        elevs.insert(CellId::from("7"), vec![0.0, 2050.0, 2150.0, 0.0, 0.0]);
        let mut lc = LandCoverInput::new();
        lc.insert(
            CellId::from("7"),
            vec![
                sub_areas(&[(VEG, 0.3), (LandCoverId::OPEN_GROUND, 0.1)]),
                sub_areas(&[(LandCoverId::GLACIER, 0.4), (VEG, 0.2)]),
            ],
        );
        merge_cell_input(elevs, lc, 100.0).unwrap()
    }

    /// Four pixels in one row, all in cell 7.
    fn pixel_map() -> PixelMap {
        parse_pixel_map(
            "NCOLS 4\nNROWS 1\nheader\n\
             0 0 0 1 2040 7\n1 0 1 1 2060 7\n2 0 2 2 2140 7\n3 0 3 2 2160 7\n",
        )
        .unwrap()
    }

    fn surface(z: [f64; 4]) -> Grid2D {
        Grid2D::from_vec(1, 4, z.to_vec()).unwrap()
    }

    fn mask(g: [bool; 4]) -> GlacierMask {
        let mut mask = GlacierMask::ice_free(1, 4);
        for (col, &is_glacier) in g.iter().enumerate() {
            mask.set_glacier(0, col, is_glacier);
        }
        mask
    }

    #[test]
    fn test_same_bins_rescale_sub_areas() {
        let mut reg = registry();
        let mut map = pixel_map();
        let summary = update_band_areas(
            &mut reg,
            &mut map,
            &surface([2010.0, 2030.0, 2110.0, 2190.0]),
            &mask([false, false, true, false]),
            &SubAreaRoots::default(),
        )
        .unwrap();
        assert!(summary.created.is_empty());
        assert!(summary.deleted.is_empty());

        let cell = reg.cell(&CellId::from("7")).unwrap();
        let low = cell.get(SlotIndex::new(1)).unwrap().unwrap();
        assert_relative_eq!(low.median_elev, 2020.0);
        assert_relative_eq!(low.area_frac(), 0.5);
        assert_relative_eq!(low.sub_area(VEG).unwrap().area_frac, 0.375);
        assert_relative_eq!(low.area_frac_open_ground(), 0.125);

        let high = cell.get(SlotIndex::new(2)).unwrap().unwrap();
        assert_relative_eq!(high.area_frac_glacier(), 0.25);
        assert_relative_eq!(high.sub_area(VEG).unwrap().area_frac, 0.25);
        assert_eq!(map.get(0, 3).unwrap().median_elev, 2190.0);
    }

    #[test]
    fn test_growth_creates_band_above() {
        let mut reg = registry();
        let mut map = pixel_map();
        let summary = update_band_areas(
            &mut reg,
            &mut map,
            &surface([2010.0, 2130.0, 2250.0, 2260.0]),
            &mask([false, true, true, true]),
            &SubAreaRoots::default(),
        )
        .unwrap();
        assert_eq!(summary.created, vec![(CellId::from("7"), SlotIndex::new(3))]);

        let cell = reg.cell(&CellId::from("7")).unwrap();
        assert_eq!(cell.right_padding(), 1);
        let top = cell.get(SlotIndex::new(3)).unwrap().unwrap();
        assert_relative_eq!(top.median_elev, 2255.0);
        assert_relative_eq!(top.area_frac_glacier(), 0.5);
        assert_eq!(top.num_sub_areas(), 1);

        // Fully glaciated: non-glacier sub-areas removed
        let mid = cell.get(SlotIndex::new(2)).unwrap().unwrap();
        assert_relative_eq!(mid.area_frac_glacier(), 0.25);
        assert!(!mid.contains(VEG));
        assert_relative_eq!(cell.area_frac(), 1.0);
    }

    #[test]
    fn test_shrink_deletes_empty_end_band() {
        let mut reg = registry();
        let mut map = pixel_map();
        let summary = update_band_areas(
            &mut reg,
            &mut map,
            &surface([2110.0, 2120.0, 2130.0, 2140.0]),
            &mask([false; 4]),
            &SubAreaRoots::default(),
        )
        .unwrap();
        assert_eq!(summary.deleted, vec![(CellId::from("7"), SlotIndex::new(1))]);

        let cell = reg.cell(&CellId::from("7")).unwrap();
        assert_eq!(cell.len(), 1);
        assert_eq!(cell.left_padding(), 2);
        let band = cell.get(SlotIndex::new(2)).unwrap().unwrap();
        assert!(!band.contains(LandCoverId::GLACIER));
        assert_relative_eq!(band.sub_area(VEG).unwrap().area_frac, 1.0);
    }

    #[test]
    fn test_open_ground_takes_bare_remainder() {
        let mut reg = registry();
        let mut map = pixel_map();
        let roots = SubAreaRoots {
            glacier: RootZoneParams::default(),
            open_ground: RootZoneParams::new([0.2, 0.5, 0.2, 0.5, 0.0, 0.0]),
        };
        // All glacier first, then ice retreats from the upper band
        update_band_areas(
            &mut reg,
            &mut map,
            &surface([2010.0, 2030.0, 2110.0, 2190.0]),
            &mask([true; 4]),
            &roots,
        )
        .unwrap();
        update_band_areas(
            &mut reg,
            &mut map,
            &surface([2010.0, 2030.0, 2110.0, 2190.0]),
            &mask([true, true, false, true]),
            &roots,
        )
        .unwrap();

        let cell = reg.cell(&CellId::from("7")).unwrap();
        let high = cell.get(SlotIndex::new(2)).unwrap().unwrap();
        let og = high.sub_area(LandCoverId::OPEN_GROUND).unwrap();
        assert_relative_eq!(og.area_frac, 0.25);
        assert_eq!(og.root_zone_parms(), &roots.open_ground);
        assert_relative_eq!(high.area_frac_glacier(), 0.25);
    }

    #[test]
    fn test_exhausted_padding_fails() {
        let mut reg = registry();
        let mut map = pixel_map();
        let err = update_band_areas(
            &mut reg,
            &mut map,
            &surface([1850.0, 1950.0, 2110.0, 2190.0]),
            &mask([false; 4]),
            &SubAreaRoots::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GlacierError::Cell {
                source: CellError::PaddingExhausted { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_shape_checked() {
        let mut reg = registry();
        let mut map = pixel_map();
        let err = update_band_areas(
            &mut reg,
            &mut map,
            &Grid2D::zeros(2, 2),
            &mask([false; 4]),
            &SubAreaRoots::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GlacierError::DimensionMismatch { what: "surface DEM", .. }
        ));
    }

    #[test]
    fn test_empty_interior_band_keeps_open_ground_tile() {
        let mut reg = registry();
        let mut map = pixel_map();
        let summary = update_band_areas(
            &mut reg,
            &mut map,
            &surface([2010.0, 2030.0, 2210.0, 2230.0]),
            &mask([false; 4]),
            &SubAreaRoots::default(),
        )
        .unwrap();
        assert_eq!(summary.created, vec![(CellId::from("7"), SlotIndex::new(3))]);
        assert!(summary.deleted.is_empty());

        let cell = reg.cell(&CellId::from("7")).unwrap();
        assert_eq!(cell.len(), 3);
        let mid = cell.get(SlotIndex::new(2)).unwrap().unwrap();
        assert_eq!(mid.num_sub_areas(), 1);
        assert!(mid.contains(LandCoverId::OPEN_GROUND));
        assert_eq!(mid.area_frac(), 0.0);
        assert_relative_eq!(cell.area_frac(), 1.0);

        // Pixels come back: open ground takes the whole band
        update_band_areas(
            &mut reg,
            &mut map,
            &surface([2010.0, 2130.0, 2210.0, 2230.0]),
            &mask([false; 4]),
            &SubAreaRoots::default(),
        )
        .unwrap();
        let cell = reg.cell(&CellId::from("7")).unwrap();
        let mid = cell.get(SlotIndex::new(2)).unwrap().unwrap();
        assert_relative_eq!(mid.area_frac_open_ground(), 0.25);
        assert_eq!(mid.num_sub_areas(), 1);
    }

    #[test]
    fn test_negative_fraction_rejected() {
        let id = CellId::from("7");
        assert!(check_non_negative(&id, SlotIndex::new(1), [0.5, 0.0, 0.5]).is_ok());

        let err = check_non_negative(&id, SlotIndex::new(1), [0.25, 0.5, -0.25]).unwrap_err();
        assert_eq!(
            err,
            GlacierError::Cell {
                cell_id: id.clone(),
                source: CellError::NegativeAreaFraction {
                    cell_id: id,
                    slot: SlotIndex::new(1),
                    area_frac: -0.25,
                },
            }
        );
    }

    #[test]
    fn test_area_sum_drift_rejected() {
        let id = CellId::from("7");
        let mut reg = registry();
        assert!(check_area_sum(&id, reg.cell(&id).unwrap()).is_ok());

        reg.band_mut(&id, SlotIndex::new(1))
            .unwrap()
            .sub_area_mut(VEG)
            .unwrap()
            .area_frac = 0.2;
        let err = check_area_sum(&id, reg.cell(&id).unwrap()).unwrap_err();
        assert!(matches!(err, GlacierError::AreaFractionSum { sum, .. } if (sum - 0.9).abs() < 1e-12));
    }
}
