//! Golden Software ASCII (GSA, "DSAA") grid reader and writer.
//!
//! Surface DEMs, bed DEMs and glacier masks exchanged with the glacier model
//! all use this format.
//!
//! # File Format
//!
//! ```text
//! DSAA
//! 3 2              <- n_cols n_rows
//! 0.0 200.0        <- x_min x_max
//! 0.0 100.0        <- y_min y_max
//! 1900.0 2150.0    <- z_min z_max
//! 1900.0 2000.0 2100.0
//! 1950.0 2050.0 2150.0
//! ```
//!
//! Each data line holds one grid row of `n_cols` values.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::grid::Grid2D;

/// Error type for GSA grid files.
#[derive(Debug, Error)]
pub enum GsaFileError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Parse error with line number
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// First line is not `DSAA`
    #[error("Not a GSA grid: expected DSAA on first line, found '{0}'")]
    NotDsaa(String),

    /// Data rows disagree with the header dimensions
    #[error("Grid is {actual_rows} rows, header declares {expected_rows}")]
    RowCountMismatch {
        expected_rows: usize,
        actual_rows: usize,
    },
}

/// Horizontal extent of a grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GsaExtent {
    /// Minimum x coordinate
    pub x_min: f64,
    /// Maximum x coordinate
    pub x_max: f64,
    /// Minimum y coordinate
    pub y_min: f64,
    /// Maximum y coordinate
    pub y_max: f64,
}

/// The five header lines of a GSA file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GsaHeader {
    /// Number of columns
    pub n_cols: usize,
    /// Number of rows
    pub n_rows: usize,
    /// Horizontal extent
    pub extent: GsaExtent,
    /// Minimum data value
    pub z_min: f64,
    /// Maximum data value
    pub z_max: f64,
}

/// A GSA grid: header plus row-major values.
#[derive(Clone, Debug)]
pub struct GsaGrid {
    pub header: GsaHeader,
    pub grid: Grid2D,
}

/// Read only the header of a GSA file.
pub fn read_gsa_header(path: &Path) -> Result<GsaHeader, GsaFileError> {
    let reader = BufReader::new(File::open(path)?);
    let mut head = String::new();
    for line in reader.lines().take(5) {
        head.push_str(&line?);
        head.push('\n');
    }
    let mut lines = head.lines().enumerate().map(|(i, l)| (i + 1, l));
    parse_header(&mut lines)
}

/// Read a GSA grid file.
pub fn read_gsa_file(path: &Path) -> Result<GsaGrid, GsaFileError> {
    let content = fs::read_to_string(path)?;
    parse_gsa_grid(&content)
}

/// Parse a GSA grid from a string.
pub fn parse_gsa_grid(content: &str) -> Result<GsaGrid, GsaFileError> {
    let mut lines = content.lines().enumerate().map(|(i, l)| (i + 1, l));
    let header = parse_header(&mut lines)?;

    let mut values = Vec::with_capacity(header.n_rows * header.n_cols);
    let mut rows = 0;
    for (line, text) in lines {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let row = parse_floats(text, line)?;
        if row.len() != header.n_cols {
            return Err(GsaFileError::ParseError {
                line,
                message: format!("Expected {} values, found {}", header.n_cols, row.len()),
            });
        }
        values.extend(row);
        rows += 1;
    }

    if rows != header.n_rows {
        return Err(GsaFileError::RowCountMismatch {
            expected_rows: header.n_rows,
            actual_rows: rows,
        });
    }

    let grid = Grid2D::from_vec(header.n_rows, header.n_cols, values).map_err(|e| {
        GsaFileError::ParseError {
            line: 0,
            message: e.to_string(),
        }
    })?;
    Ok(GsaGrid { header, grid })
}

fn parse_header<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
) -> Result<GsaHeader, GsaFileError> {
    let mut next = |what: &str| {
        lines.next().ok_or_else(|| GsaFileError::ParseError {
            line: 0,
            message: format!("Unexpected end of file reading {}", what),
        })
    };

    let (_, tag) = next("DSAA tag")?;
    if tag.trim() != "DSAA" {
        return Err(GsaFileError::NotDsaa(tag.trim().to_string()));
    }

    let (line, dims) = next("dimensions")?;
    let dims: Vec<&str> = dims.split_whitespace().collect();
    if dims.len() != 2 {
        return Err(GsaFileError::ParseError {
            line,
            message: "Expected: n_cols n_rows".into(),
        });
    }
    let parse_dim = |s: &str| {
        s.parse::<usize>().map_err(|_| GsaFileError::ParseError {
            line,
            message: format!("Invalid dimension '{}'", s),
        })
    };
    let n_cols = parse_dim(dims[0])?;
    let n_rows = parse_dim(dims[1])?;

    let mut pair = |what: &str| -> Result<(f64, f64), GsaFileError> {
        let (line, text) = next(what)?;
        match parse_floats(text, line)?.as_slice() {
            &[lo, hi] => Ok((lo, hi)),
            _ => Err(GsaFileError::ParseError {
                line,
                message: format!("Expected two values for {}", what),
            }),
        }
    };
    let (x_min, x_max) = pair("x range")?;
    let (y_min, y_max) = pair("y range")?;
    let (z_min, z_max) = pair("z range")?;

    Ok(GsaHeader {
        n_cols,
        n_rows,
        extent: GsaExtent {
            x_min,
            x_max,
            y_min,
            y_max,
        },
        z_min,
        z_max,
    })
}

fn parse_floats(text: &str, line: usize) -> Result<Vec<f64>, GsaFileError> {
    text.split_whitespace()
        .map(|tok| {
            tok.parse::<f64>().map_err(|_| GsaFileError::ParseError {
                line,
                message: format!("Invalid number '{}'", tok),
            })
        })
        .collect()
}

/// Format a grid as GSA text. The z range is recomputed from the values.
pub fn format_gsa_grid(grid: &Grid2D, extent: &GsaExtent) -> String {
    let (z_min, z_max) = grid.min_max();
    let mut out = String::with_capacity(64 + grid.values().len() * 8);
    out.push_str("DSAA\n");
    out.push_str(&format!("{} {}\n", grid.n_cols(), grid.n_rows()));
    out.push_str(&format!("{} {}\n", extent.x_min, extent.x_max));
    out.push_str(&format!("{} {}\n", extent.y_min, extent.y_max));
    out.push_str(&format!("{} {}\n", z_min, z_max));
    for row in grid.rows() {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

/// Write a grid to a GSA file.
pub fn write_gsa_file(path: &Path, grid: &Grid2D, extent: &GsaExtent) -> Result<(), GsaFileError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(format_gsa_grid(grid, extent).as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "DSAA
3 2
0.0 200.0
0.0 100.0
1900.0 2150.0
1900.0 2000.0 2100.0
1950.0 2050.0 2150.0
";

    #[test]
    fn test_parse_gsa_grid() {
        let gsa = parse_gsa_grid(SAMPLE).unwrap();
        assert_eq!(gsa.header.n_cols, 3);
        assert_eq!(gsa.header.n_rows, 2);
        assert_eq!(gsa.header.extent.x_max, 200.0);
        assert_eq!(gsa.header.z_min, 1900.0);
        assert_eq!(gsa.grid.shape(), (2, 3));
        assert_eq!(gsa.grid.get(1, 2), 2150.0);
    }

    #[test]
    fn test_not_dsaa() {
        assert!(matches!(
            parse_gsa_grid("DSBB\n1 1\n0 1\n0 1\n0 1\n5\n"),
            Err(GsaFileError::NotDsaa(_))
        ));
    }

    #[test]
    fn test_wrong_row_length() {
        let content = "DSAA\n2 1\n0 1\n0 1\n0 1\n1 2 3\n";
        assert!(matches!(
            parse_gsa_grid(content),
            Err(GsaFileError::ParseError { line: 6, .. })
        ));
    }

    #[test]
    fn test_missing_rows() {
        let content = "DSAA\n2 2\n0 1\n0 1\n0 1\n1 2\n";
        assert!(matches!(
            parse_gsa_grid(content),
            Err(GsaFileError::RowCountMismatch {
                expected_rows: 2,
                actual_rows: 1
            })
        ));
    }

    #[test]
    fn test_write_recomputes_z_range() {
        let gsa = parse_gsa_grid(SAMPLE).unwrap();
        let mut grid = gsa.grid.clone();
        grid.set(0, 0, -1.5);

        let file = NamedTempFile::new().unwrap();
        write_gsa_file(file.path(), &grid, &gsa.header.extent).unwrap();

        let header = read_gsa_header(file.path()).unwrap();
        assert_eq!(header.z_min, -1.5);
        assert_eq!(header.z_max, 2150.0);
        assert_eq!(header.extent, gsa.header.extent);

        let back = read_gsa_file(file.path()).unwrap();
        assert_eq!(back.grid, grid);
    }
}
