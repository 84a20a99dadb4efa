//! VIC vegetation parameter file with elevation-band specific tiles.
//!
//! # File Format
//!
//! ```text
//! 12345 3                                  <- cell_id num_tiles
//!     11 0.1 0.10 1.00 0.10 0.00 0.10 0.00 1
//!     19 0.2 0.10 1.00 0.10 0.00 0.10 0.00 1
//!     22 0.7 0.10 1.00 0.10 0.00 0.10 0.00 2
//! ```
//!
//! Each tile line is `land_cover_id area_frac rd1 rf1 rd2 rf2 rd3 rf3 band_index`.
//! `band_index` is the absolute slot the tile lives in, counting padding, so it
//! lines up with the snow-band columns. Tiles of a cell are grouped by band
//! index in ascending order to give one land-cover map per live band.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

use crate::cells::{CellRegistry, ElevationInput, LandCoverInput, SubArea, slot_layout};
use crate::types::{CellId, LandCoverId, RootZoneParams};

/// Error type for vegetation parameter files.
#[derive(Debug, Error)]
pub enum VegParamFileError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Parse error with line number
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// A cell header appears more than once
    #[error("Cell {cell_id} appears more than once (line {line})")]
    DuplicateCell { cell_id: CellId, line: usize },

    /// Two tiles of the same land cover in one band
    #[error("Cell {cell_id} lists land cover {land_cover} twice in band {band_index}")]
    DuplicateTile {
        cell_id: CellId,
        band_index: usize,
        land_cover: LandCoverId,
    },

    /// A tile names a slot that is padding in the elevation layout
    #[error(
        "Cell {cell_id} has a tile in band {band_index}, outside its live bands {first_live}..={last_live}"
    )]
    TileOutsideLiveBands {
        cell_id: CellId,
        band_index: usize,
        first_live: usize,
        last_live: usize,
    },

    /// A live slot of the elevation layout has no tile
    #[error("Cell {cell_id} has no tiles for live band {band_index}")]
    BandWithoutTiles { cell_id: CellId, band_index: usize },
}

/// One land-cover tile of a cell.
#[derive(Clone, Debug, PartialEq)]
pub struct VegTile {
    pub land_cover: LandCoverId,
    pub area_frac: f64,
    pub root_zone: RootZoneParams,
    pub band_index: usize,
}

/// Parsed vegetation parameter file.
#[derive(Clone, Debug, Default)]
pub struct VegParamFile {
    /// Tiles per cell, in file order
    pub cells: IndexMap<CellId, Vec<VegTile>>,
}

impl VegParamFile {
    /// Ids of the cells in file order.
    pub fn cell_ids(&self) -> impl Iterator<Item = &CellId> {
        self.cells.keys()
    }

    /// Group tiles by band index into per-band land-cover maps.
    ///
    /// Tile band indices are absolute slots. For every cell that also appears
    /// in `elevations` with a valid layout, the band indices must cover
    /// exactly the live slots of that layout. Cells missing from `elevations`
    /// are grouped unchecked and left for the registry builder to report.
    ///
    /// # Errors
    /// - `DuplicateTile` if a band lists the same land cover twice
    /// - `TileOutsideLiveBands` if a tile names a padding slot
    /// - `BandWithoutTiles` if a live slot has no tile
    pub fn land_cover_input(
        &self,
        elevations: &ElevationInput,
    ) -> Result<LandCoverInput, VegParamFileError> {
        let mut input = LandCoverInput::with_capacity(self.cells.len());
        for (cell_id, tiles) in &self.cells {
            let mut by_band: BTreeMap<usize, BTreeMap<LandCoverId, SubArea>> = BTreeMap::new();
            for tile in tiles {
                let band = by_band.entry(tile.band_index).or_default();
                if band.contains_key(&tile.land_cover) {
                    return Err(VegParamFileError::DuplicateTile {
                        cell_id: cell_id.clone(),
                        band_index: tile.band_index,
                        land_cover: tile.land_cover,
                    });
                }
                band.insert(tile.land_cover, SubArea::new(tile.area_frac, tile.root_zone));
            }

            let layout = elevations
                .get(cell_id)
                .and_then(|z| slot_layout(cell_id, z).ok());
            if let Some(layout) = layout {
                let live = layout.left_padding..layout.left_padding + layout.live;
                if let Some(&band_index) = by_band.keys().find(|i| !live.contains(*i)) {
                    return Err(VegParamFileError::TileOutsideLiveBands {
                        cell_id: cell_id.clone(),
                        band_index,
                        first_live: live.start,
                        last_live: live.end - 1,
                    });
                }
                if let Some(band_index) = live.clone().find(|i| !by_band.contains_key(i)) {
                    return Err(VegParamFileError::BandWithoutTiles {
                        cell_id: cell_id.clone(),
                        band_index,
                    });
                }
            }

            input.insert(cell_id.clone(), by_band.into_values().collect());
        }
        Ok(input)
    }
}

/// Read a vegetation parameter file.
pub fn read_veg_param_file(path: &Path) -> Result<VegParamFile, VegParamFileError> {
    let content = fs::read_to_string(path)?;
    parse_veg_params(&content)
}

/// Parse a vegetation parameter file from a string.
pub fn parse_veg_params(content: &str) -> Result<VegParamFile, VegParamFileError> {
    let mut file = VegParamFile::default();
    // (cell, header line, tiles still expected)
    let mut current: Option<(CellId, usize, usize)> = None;

    for (line_idx, line) in content.lines().enumerate() {
        let line_num = line_idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();

        match current.take() {
            Some((cell_id, header_line, remaining)) if remaining > 0 => {
                let tile = parse_tile(&parts, line_num)?;
                if let Some(tiles) = file.cells.get_mut(&cell_id) {
                    tiles.push(tile);
                }
                current = Some((cell_id, header_line, remaining - 1));
            }
            _ => {
                if parts.len() != 2 {
                    return Err(VegParamFileError::ParseError {
                        line: line_num,
                        message: "Expected cell header: cell_id num_tiles".into(),
                    });
                }
                let cell_id = CellId::from(parts[0]);
                let num_tiles: usize =
                    parts[1].parse().map_err(|_| VegParamFileError::ParseError {
                        line: line_num,
                        message: format!("Invalid tile count '{}'", parts[1]),
                    })?;
                if file.cells.contains_key(&cell_id) {
                    return Err(VegParamFileError::DuplicateCell {
                        cell_id,
                        line: line_num,
                    });
                }
                file.cells.insert(cell_id.clone(), Vec::with_capacity(num_tiles));
                current = Some((cell_id, line_num, num_tiles));
            }
        }
    }

    if let Some((cell_id, header_line, remaining)) = current {
        if remaining > 0 {
            return Err(VegParamFileError::ParseError {
                line: header_line,
                message: format!(
                    "Cell {} ends before its last {} tile(s)",
                    cell_id, remaining
                ),
            });
        }
    }

    Ok(file)
}

fn parse_tile(parts: &[&str], line: usize) -> Result<VegTile, VegParamFileError> {
    if parts.len() != 9 {
        return Err(VegParamFileError::ParseError {
            line,
            message: format!(
                "Expected 9 tile columns (id, area_frac, 6 root values, band), found {}",
                parts.len()
            ),
        });
    }
    let invalid = |what: &str, tok: &str| VegParamFileError::ParseError {
        line,
        message: format!("Invalid {} '{}'", what, tok),
    };

    let land_cover: LandCoverId = parts[0]
        .parse()
        .map_err(|_| invalid("land cover id", parts[0]))?;
    let area_frac: f64 = parts[1]
        .parse()
        .map_err(|_| invalid("area fraction", parts[1]))?;
    let root_zone: RootZoneParams = parts[2..8].join(" ").parse().map_err(|e| {
        VegParamFileError::ParseError {
            line,
            message: format!("{}", e),
        }
    })?;
    let band_index: usize = parts[8]
        .parse()
        .map_err(|_| invalid("band index", parts[8]))?;

    Ok(VegTile {
        land_cover,
        area_frac,
        root_zone,
        band_index,
    })
}

/// Format the registry as vegetation parameter text.
pub fn format_veg_params(registry: &CellRegistry) -> String {
    let mut out = String::new();
    for (cell_id, cell) in registry.iter() {
        let num_tiles: usize = cell.bands().map(|(_, b)| b.num_sub_areas()).sum();
        out.push_str(&format!("{} {}\n", cell_id, num_tiles));
        for (slot, band) in cell.bands() {
            for (id, sub_area) in band.sub_areas() {
                let roots: Vec<String> = sub_area
                    .root_zone_parms()
                    .values()
                    .iter()
                    .map(|v| v.to_string())
                    .collect();
                out.push_str(&format!(
                    "    {} {} {} {}\n",
                    id,
                    sub_area.area_frac,
                    roots.join(" "),
                    slot.get()
                ));
            }
        }
    }
    out
}

/// Write the registry to a vegetation parameter file.
pub fn write_veg_param_file(path: &Path, registry: &CellRegistry) -> Result<(), VegParamFileError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(format_veg_params(registry).as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
12345 3
    11 0.1 0.10 1.00 0.10 0.00 0.10 0.00 1
    19 0.2 0.10 1.00 0.10 0.00 0.10 0.00 1
    22 0.7 0.20 0.80 0.10 0.20 0.10 0.00 2
23456 1
    19 1.0 0.10 1.00 0.10 0.00 0.10 0.00 0
";

    #[test]
    fn test_parse_veg_params() {
        let vpf = parse_veg_params(SAMPLE).unwrap();
        assert_eq!(vpf.cells.len(), 2);
        let tiles = &vpf.cells[&CellId::from("12345")];
        assert_eq!(tiles.len(), 3);
        assert_eq!(tiles[2].land_cover, LandCoverId::GLACIER);
        assert_eq!(tiles[2].band_index, 2);
        assert_eq!(tiles[2].root_zone.values()[1], 0.80);
    }

    /// Slot layouts matching `SAMPLE`: one padding slot before 12345's bands.
    fn sample_elevations() -> ElevationInput {
        let mut elevs = ElevationInput::new();
        elevs.insert(CellId::from("12345"), vec![0.0, 2035.0, 2120.0, 0.0]);
        elevs.insert(CellId::from("23456"), vec![1855.0, 0.0, 0.0, 0.0]);
        elevs
    }

    #[test]
    fn test_land_cover_input_groups_by_band() {
        let input = parse_veg_params(SAMPLE)
            .unwrap()
            .land_cover_input(&sample_elevations())
            .unwrap();
        let bands = &input[&CellId::from("12345")];
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].len(), 2);
        assert!(bands[1].contains_key(&LandCoverId::GLACIER));
        assert_eq!(input[&CellId::from("23456")].len(), 1);
    }

    #[test]
    fn test_band_index_must_match_live_slots() {
        let vpf = parse_veg_params(SAMPLE).unwrap();

        // Same tiles against a layout shifted one slot down
        let mut shifted = sample_elevations();
        shifted.insert(CellId::from("12345"), vec![2035.0, 2120.0, 0.0, 0.0]);
        assert!(matches!(
            vpf.land_cover_input(&shifted),
            Err(VegParamFileError::TileOutsideLiveBands {
                band_index: 2,
                first_live: 0,
                last_live: 1,
                ..
            })
        ));

        // A third live band with no tiles
        let mut wider = sample_elevations();
        wider.insert(CellId::from("12345"), vec![0.0, 2035.0, 2120.0, 2250.0]);
        assert!(matches!(
            vpf.land_cover_input(&wider),
            Err(VegParamFileError::BandWithoutTiles { band_index: 3, .. })
        ));

        // Cells unknown to the elevation input are grouped unchecked
        let input = vpf.land_cover_input(&ElevationInput::new()).unwrap();
        assert_eq!(input.len(), 2);
    }

    #[test]
    fn test_duplicate_tile_is_error() {
        let content = "\
1 2
    19 0.5 0.10 1.00 0.10 0.00 0.10 0.00 0
    19 0.5 0.10 1.00 0.10 0.00 0.10 0.00 0
";
        let vpf = parse_veg_params(content).unwrap();
        assert!(matches!(
            vpf.land_cover_input(&ElevationInput::new()),
            Err(VegParamFileError::DuplicateTile { band_index: 0, .. })
        ));
    }

    #[test]
    fn test_truncated_cell() {
        let content = "1 2\n    19 0.5 0.10 1.00 0.10 0.00 0.10 0.00 0\n";
        assert!(matches!(
            parse_veg_params(content),
            Err(VegParamFileError::ParseError { line: 1, .. })
        ));
    }

    #[test]
    fn test_bad_tile_width() {
        let content = "1 1\n    19 0.5 0.10 1.00 0\n";
        assert!(matches!(
            parse_veg_params(content),
            Err(VegParamFileError::ParseError { line: 2, .. })
        ));
    }

    #[test]
    fn test_read_veg_param_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), SAMPLE).unwrap();
        let vpf = read_veg_param_file(file.path()).unwrap();
        assert_eq!(vpf.cell_ids().count(), 2);
    }
}
