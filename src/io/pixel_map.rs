//! Reader for the glacier-model pixel to VIC cell mapping file.
//!
//! # File Format
//!
//! ```text
//! NCOLS 4
//! NROWS 2
//! "PIXEL_ID" "ROW" "COL" "BAND" "MEDIAN_ELEV" "CELL_ID"
//! 0 0 0 0 2010 12345
//! 1 0 1 0 2060 12345
//! 2 0 2 0 2155 23456
//! 3 0 3 0 2190 NA
//! ```
//!
//! The two dimension lines may appear in either order. The third line is a
//! column header and is skipped. A cell id of `NA` marks a pixel that belongs
//! to no VIC cell; pixels not listed at all are treated the same way.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

use crate::types::CellId;

/// Error type for pixel map parsing.
#[derive(Debug, Error)]
pub enum PixelMapError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Parse error with line number
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// NCOLS or NROWS header missing
    #[error("Missing {0} header")]
    MissingHeader(&'static str),

    /// Pixel listed twice
    #[error("Pixel at row {row}, column {col} is listed more than once (line {line})")]
    DuplicatePixel { row: usize, col: usize, line: usize },
}

/// The VIC cell a glacier-model pixel belongs to, and its current elevation.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelAssignment {
    /// Owning VIC cell
    pub cell_id: CellId,
    /// Most recent surface elevation of the pixel (m)
    pub median_elev: f64,
}

/// Mapping of every glacier-model pixel to a VIC cell.
#[derive(Clone, Debug)]
pub struct PixelMap {
    n_rows: usize,
    n_cols: usize,
    pixels: Vec<Option<PixelAssignment>>,
    cell_areas: IndexMap<CellId, usize>,
}

impl PixelMap {
    /// Empty map where no pixel belongs to a cell.
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            pixels: vec![None; n_rows * n_cols],
            cell_areas: IndexMap::new(),
        }
    }

    /// Assign a pixel to a cell. Returns false if it was already assigned.
    ///
    /// Panics outside the grid.
    pub fn assign(&mut self, row: usize, col: usize, cell_id: CellId, median_elev: f64) -> bool {
        let idx = row * self.n_cols + col;
        if self.pixels[idx].is_some() {
            return false;
        }
        *self.cell_areas.entry(cell_id.clone()).or_insert(0) += 1;
        self.pixels[idx] = Some(PixelAssignment {
            cell_id,
            median_elev,
        });
        true
    }

    /// `(n_rows, n_cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Assignment of a pixel, `None` if it lies outside every cell.
    pub fn get(&self, row: usize, col: usize) -> Option<&PixelAssignment> {
        self.pixels
            .get(row * self.n_cols + col)
            .and_then(Option::as_ref)
    }

    /// Record a new elevation for an assigned pixel. Returns false if the
    /// pixel is unassigned or outside the grid.
    pub fn set_elevation(&mut self, row: usize, col: usize, elevation: f64) -> bool {
        match self
            .pixels
            .get_mut(row * self.n_cols + col)
            .and_then(Option::as_mut)
        {
            Some(p) => {
                p.median_elev = elevation;
                true
            }
            None => false,
        }
    }

    /// Iterate assigned pixels as `(row, col, assignment)`, row-major.
    pub fn iter_mapped(&self) -> impl Iterator<Item = (usize, usize, &PixelAssignment)> {
        let n_cols = self.n_cols;
        self.pixels
            .iter()
            .enumerate()
            .filter_map(move |(i, p)| p.as_ref().map(|p| (i / n_cols, i % n_cols, p)))
    }

    /// Number of pixels assigned to a cell (its area in pixels).
    pub fn cell_area(&self, cell_id: &CellId) -> usize {
        self.cell_areas.get(cell_id).copied().unwrap_or(0)
    }

    /// Pixel counts per cell, in order of first appearance.
    pub fn cell_areas(&self) -> &IndexMap<CellId, usize> {
        &self.cell_areas
    }
}

/// Read a pixel map file.
pub fn read_pixel_map_file(path: &Path) -> Result<PixelMap, PixelMapError> {
    let content = fs::read_to_string(path)?;
    parse_pixel_map(&content)
}

/// Parse a pixel map from a string.
pub fn parse_pixel_map(content: &str) -> Result<PixelMap, PixelMapError> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let mut n_cols = None;
    let mut n_rows = None;
    for _ in 0..2 {
        let Some((line, text)) = lines.next() else {
            break;
        };
        let (key, value) = text
            .split_once(char::is_whitespace)
            .ok_or_else(|| PixelMapError::ParseError {
                line,
                message: "Expected: KEY value".into(),
            })?;
        let value: usize = value.trim().parse().map_err(|_| PixelMapError::ParseError {
            line,
            message: format!("Invalid {} value", key),
        })?;
        match key.to_ascii_uppercase().as_str() {
            "NCOLS" => n_cols = Some(value),
            "NROWS" => n_rows = Some(value),
            _ => {
                return Err(PixelMapError::ParseError {
                    line,
                    message: format!("Unexpected header key '{}'", key),
                })
            }
        }
    }
    let n_cols = n_cols.ok_or(PixelMapError::MissingHeader("NCOLS"))?;
    let n_rows = n_rows.ok_or(PixelMapError::MissingHeader("NROWS"))?;

    // Column headers
    lines.next();

    let mut map = PixelMap::new(n_rows, n_cols);
    for (line, text) in lines {
        let parts: Vec<&str> = text.split_whitespace().collect();
        if parts.len() < 6 {
            return Err(PixelMapError::ParseError {
                line,
                message: "Expected: pixel_id row col band median_elev cell_id".into(),
            });
        }

        let parse_index = |s: &str, name: &str, bound: usize| -> Result<usize, PixelMapError> {
            s.parse::<usize>()
                .ok()
                .filter(|&v| v < bound)
                .ok_or_else(|| PixelMapError::ParseError {
                    line,
                    message: format!("Invalid {} '{}'", name, s),
                })
        };
        let row = parse_index(parts[1], "row", n_rows)?;
        let col = parse_index(parts[2], "col", n_cols)?;

        let cell = parts[5];
        if cell.eq_ignore_ascii_case("NA") {
            continue;
        }
        let median_elev: f64 = parts[4].parse().map_err(|_| PixelMapError::ParseError {
            line,
            message: "Invalid median elevation".into(),
        })?;

        if !map.assign(row, col, CellId::from(cell), median_elev) {
            return Err(PixelMapError::DuplicatePixel { row, col, line });
        }
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"NCOLS 3
NROWS 2
"PIXEL_ID" "ROW" "COL" "BAND" "MEDIAN_ELEV" "CELL_ID"
0 0 0 0 2010 12345
1 0 1 0 2060 12345
2 0 2 0 2155 23456
3 1 0 0 2190 NA
4 1 1 0 2120.5 23456
"#;

    #[test]
    fn test_parse_pixel_map() {
        let map = parse_pixel_map(SAMPLE).unwrap();
        assert_eq!(map.shape(), (2, 3));
        assert_eq!(map.get(0, 1).unwrap().cell_id, CellId::from("12345"));
        assert_eq!(map.get(1, 1).unwrap().median_elev, 2120.5);
        assert!(map.get(1, 0).is_none());
        assert!(map.get(1, 2).is_none());
        assert_eq!(map.cell_area(&CellId::from("12345")), 2);
        assert_eq!(map.cell_area(&CellId::from("23456")), 2);
        assert_eq!(map.cell_area(&CellId::from("nope")), 0);
        assert_eq!(map.iter_mapped().count(), 4);
    }

    #[test]
    fn test_headers_any_order() {
        let content = "NROWS 1\nNCOLS 2\nheader\n0 0 1 0 100 7\n";
        let map = parse_pixel_map(content).unwrap();
        assert_eq!(map.shape(), (1, 2));
        assert!(map.get(0, 1).is_some());
    }

    #[test]
    fn test_out_of_range_row() {
        let content = "NCOLS 2\nNROWS 1\nheader\n0 3 0 0 100 7\n";
        assert!(matches!(
            parse_pixel_map(content),
            Err(PixelMapError::ParseError { line: 4, .. })
        ));
    }

    #[test]
    fn test_duplicate_pixel() {
        let content = "NCOLS 2\nNROWS 1\nheader\n0 0 0 0 100 7\n1 0 0 0 110 7\n";
        assert!(matches!(
            parse_pixel_map(content),
            Err(PixelMapError::DuplicatePixel { row: 0, col: 0, line: 5 })
        ));
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            parse_pixel_map("NCOLS 2\n"),
            Err(PixelMapError::MissingHeader("NROWS"))
        ));
    }

    #[test]
    fn test_set_elevation() {
        let mut map = parse_pixel_map(SAMPLE).unwrap();
        assert!(map.set_elevation(0, 0, 2222.0));
        assert_eq!(map.get(0, 0).unwrap().median_elev, 2222.0);
        assert!(!map.set_elevation(1, 0, 1.0));
    }

    #[test]
    fn test_read_pixel_map_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let map = read_pixel_map_file(file.path()).unwrap();
        assert_eq!(map.cell_areas().len(), 2);
    }
}
