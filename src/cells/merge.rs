//! One-time construction of the registry from the two input datasets.
//!
//! The elevation input gives, per cell, one median elevation per declared band
//! slot, with zero entries marking padding at either end. The land-cover input
//! gives, per cell, one sub-area map per live band, in band order. The two
//! are zipped by position.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::{Band, Cell, CellError, CellRegistry, SubArea};
use crate::types::{CellId, LandCoverId};

/// Per-cell slot elevations, zero for padding.
pub type ElevationInput = IndexMap<CellId, Vec<f64>>;

/// Per-cell, per-live-band sub-area maps.
pub type LandCoverInput = IndexMap<CellId, Vec<BTreeMap<LandCoverId, SubArea>>>;

/// Padding counts and live range of a cell's elevation entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotLayout {
    /// Leading placeholder count
    pub left_padding: usize,
    /// Number of live entries
    pub live: usize,
    /// Trailing placeholder count
    pub right_padding: usize,
}

/// Split a cell's elevation entries into padding and live bands.
///
/// # Errors
/// `NoLiveBands` if every entry is a placeholder, `NonContiguousBands` if a
/// placeholder appears between live entries.
pub fn slot_layout(cell_id: &CellId, median_elevs: &[f64]) -> Result<SlotLayout, CellError> {
    let left_padding = median_elevs.iter().take_while(|&&z| z == 0.0).count();
    if left_padding == median_elevs.len() {
        return Err(CellError::NoLiveBands {
            cell_id: cell_id.clone(),
        });
    }
    let right_padding = median_elevs.iter().rev().take_while(|&&z| z == 0.0).count();
    let live_end = median_elevs.len() - right_padding;

    if let Some(offset) = median_elevs[left_padding..live_end]
        .iter()
        .position(|&z| z == 0.0)
    {
        return Err(CellError::NonContiguousBands {
            cell_id: cell_id.clone(),
            position: left_padding + offset,
        });
    }

    Ok(SlotLayout {
        left_padding,
        live: live_end - left_padding,
        right_padding,
    })
}

/// Build the cell registry from the elevation and land-cover inputs.
///
/// # Errors
/// - `InvalidBandSize` for a non-positive band size
/// - `CellIdMismatch` if a cell appears in only one input
/// - `BandCountMismatch` if the live band counts disagree
/// - `NoLiveBands` / `NonContiguousBands` for malformed elevation entries
pub fn merge_cell_input(
    elevations: ElevationInput,
    mut land_cover: LandCoverInput,
    band_size: f64,
) -> Result<CellRegistry, CellError> {
    if !(band_size.is_finite() && band_size > 0.0) {
        return Err(CellError::InvalidBandSize { band_size });
    }

    let mut cells = IndexMap::with_capacity(elevations.len());

    for (cell_id, median_elevs) in elevations {
        let sub_area_maps = land_cover.shift_remove(&cell_id).ok_or_else(|| {
            CellError::CellIdMismatch {
                cell_id: cell_id.clone(),
                missing_from: "land-cover",
            }
        })?;

        let layout = slot_layout(&cell_id, &median_elevs)?;
        if layout.live != sub_area_maps.len() {
            return Err(CellError::BandCountMismatch {
                cell_id,
                elevation_bands: layout.live,
                land_cover_bands: sub_area_maps.len(),
            });
        }

        let live_elevs = &median_elevs[layout.left_padding..layout.left_padding + layout.live];
        let bands: Vec<Band> = live_elevs
            .iter()
            .zip(sub_area_maps)
            .map(|(&z, sub_areas)| Band::with_sub_areas(z, sub_areas))
            .collect();

        let origin = (live_elevs[0] / band_size).floor() * band_size
            - layout.left_padding as f64 * band_size;
        let cell = Cell::new(
            origin,
            band_size,
            layout.left_padding,
            bands,
            layout.right_padding,
        )?;

        for (slot, band) in cell.bands() {
            if cell.slot_for_elevation(band.median_elev) != slot.get() as i64 {
                warn!(
                    cell = %cell_id,
                    %slot,
                    median_elev = band.median_elev,
                    "band median elevation lies outside its slot range"
                );
            }
        }

        debug!(
            cell = %cell_id,
            left_padding = layout.left_padding,
            live = layout.live,
            right_padding = layout.right_padding,
            "merged cell"
        );
        cells.insert(cell_id, cell);
    }

    if let Some(cell_id) = land_cover.keys().next() {
        return Err(CellError::CellIdMismatch {
            cell_id: cell_id.clone(),
            missing_from: "elevation",
        });
    }

    Ok(CellRegistry::from_cells(band_size, cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::ErrorKind;
    use crate::types::{RootZoneParams, SlotIndex};

    fn sub_areas(entries: &[(u32, f64)]) -> BTreeMap<LandCoverId, SubArea> {
        entries
            .iter()
            .map(|&(id, af)| (LandCoverId::new(id), SubArea::new(af, RootZoneParams::default())))
            .collect()
    }

    fn single_cell_inputs(
        elevs: Vec<f64>,
        bands: Vec<BTreeMap<LandCoverId, SubArea>>,
    ) -> (ElevationInput, LandCoverInput) {
        let id = CellId::from("12345");
        let mut e = IndexMap::new();
        e.insert(id.clone(), elevs);
        let mut l = IndexMap::new();
        l.insert(id, bands);
        (e, l)
    }

    #[test]
    fn test_slot_layout() {
        let id = CellId::from("1");
        let layout = slot_layout(&id, &[0.0, 1950.0, 2050.0, 0.0, 0.0]).unwrap();
        assert_eq!(
            layout,
            SlotLayout {
                left_padding: 1,
                live: 2,
                right_padding: 2
            }
        );

        assert!(matches!(
            slot_layout(&id, &[0.0, 0.0]),
            Err(CellError::NoLiveBands { .. })
        ));
        assert!(matches!(
            slot_layout(&id, &[1950.0, 0.0, 2150.0]),
            Err(CellError::NonContiguousBands { position: 1, .. })
        ));
    }

    #[test]
    fn test_merge_single_cell() {
        let (e, l) = single_cell_inputs(
            vec![0.0, 1935.0, 2075.0, 2185.0, 0.0],
            vec![
                sub_areas(&[(11, 0.1), (19, 0.2)]),
                sub_areas(&[(19, 0.3), (22, 0.1)]),
                sub_areas(&[(22, 0.3)]),
            ],
        );
        let registry = merge_cell_input(e, l, 100.0).unwrap();
        assert_eq!(registry.len(), 1);

        let cell = registry.cell(&CellId::from("12345")).unwrap();
        assert_eq!(cell.capacity(), 5);
        assert_eq!((cell.left_padding(), cell.len(), cell.right_padding()), (1, 3, 1));
        assert_eq!(cell.origin(), 1800.0);

        let band = cell.get(SlotIndex::new(2)).unwrap().unwrap();
        assert_eq!(band.median_elev, 2075.0);
        assert_eq!(band.num_sub_areas(), 2);
        assert_eq!(band.area_frac_glacier(), 0.1);
    }

    #[test]
    fn test_merge_band_count_mismatch() {
        let (e, l) = single_cell_inputs(
            vec![1935.0, 2075.0, 0.0],
            vec![sub_areas(&[(11, 0.5)])],
        );
        let err = merge_cell_input(e, l, 100.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Consistency);
        assert!(matches!(
            err,
            CellError::BandCountMismatch {
                elevation_bands: 2,
                land_cover_bands: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_merge_cell_missing_from_land_cover() {
        let (mut e, l) = single_cell_inputs(vec![1935.0], vec![sub_areas(&[(11, 1.0)])]);
        e.insert(CellId::from("99999"), vec![2000.0]);
        let err = merge_cell_input(e, l, 100.0).unwrap_err();
        assert_eq!(
            err,
            CellError::CellIdMismatch {
                cell_id: CellId::from("99999"),
                missing_from: "land-cover"
            }
        );
    }

    #[test]
    fn test_merge_cell_missing_from_elevation() {
        let (e, mut l) = single_cell_inputs(vec![1935.0], vec![sub_areas(&[(11, 1.0)])]);
        l.insert(CellId::from("99999"), vec![sub_areas(&[(11, 1.0)])]);
        let err = merge_cell_input(e, l, 100.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Consistency);
        assert!(matches!(err, CellError::CellIdMismatch { missing_from: "elevation", .. }));
    }

    #[test]
    fn test_merge_rejects_bad_band_size() {
        let (e, l) = single_cell_inputs(vec![1935.0], vec![sub_areas(&[(11, 1.0)])]);
        assert!(matches!(
            merge_cell_input(e, l, -100.0),
            Err(CellError::InvalidBandSize { .. })
        ));
    }
}
