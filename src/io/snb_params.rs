//! VIC snow-band (elevation band) parameter file.
//!
//! # File Format
//!
//! One line per cell, with `N` the number of band slots declared in the
//! global parameter file:
//!
//! ```text
//! cell_id  af_0 .. af_{N-1}  elev_0 .. elev_{N-1}  pf_0 .. pf_{N-1}
//! ```
//!
//! `af` is the area fraction of each band, `elev` its median elevation and
//! `pf` its precipitation fraction. Slots holding zero in both the area and
//! elevation columns are padding.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::cells::{CellRegistry, ElevationInput};
use crate::types::CellId;

/// Error type for snow-band files.
#[derive(Debug, Error)]
pub enum SnbFileError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Parse error with line number
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// A cell appears on more than one line
    #[error("Cell {cell_id} appears more than once (line {line})")]
    DuplicateCell { cell_id: CellId, line: usize },
}

/// One line of a snow-band file.
#[derive(Clone, Debug, PartialEq)]
pub struct SnowBandRecord {
    /// Cell the bands belong to
    pub cell_id: CellId,
    /// Area fraction per slot
    pub area_fracs: Vec<f64>,
    /// Median elevation per slot (m), zero for padding
    pub median_elevs: Vec<f64>,
    /// Precipitation fraction per slot
    pub prec_fracs: Vec<f64>,
}

/// Parsed snow-band file.
#[derive(Clone, Debug)]
pub struct SnowBandFile {
    /// Slots per cell
    pub num_bands: usize,
    /// Cell records in file order
    pub records: Vec<SnowBandRecord>,
}

impl SnowBandFile {
    /// Median elevations keyed by cell, ready for the registry builder.
    pub fn elevation_input(&self) -> ElevationInput {
        self.records
            .iter()
            .map(|r| (r.cell_id.clone(), r.median_elevs.clone()))
            .collect()
    }
}

/// Read a snow-band file with `num_bands` slots per cell.
pub fn read_snb_file(path: &Path, num_bands: usize) -> Result<SnowBandFile, SnbFileError> {
    let content = fs::read_to_string(path)?;
    parse_snb_params(&content, num_bands)
}

/// Parse a snow-band file from a string.
pub fn parse_snb_params(content: &str, num_bands: usize) -> Result<SnowBandFile, SnbFileError> {
    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for (line_idx, line) in content.lines().enumerate() {
        let line_num = line_idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let expected = 1 + 3 * num_bands;
        if parts.len() != expected {
            return Err(SnbFileError::ParseError {
                line: line_num,
                message: format!("Expected {} columns, found {}", expected, parts.len()),
            });
        }

        let values = parts[1..]
            .iter()
            .map(|tok| {
                tok.parse::<f64>().map_err(|_| SnbFileError::ParseError {
                    line: line_num,
                    message: format!("Invalid number '{}'", tok),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;

        let cell_id = CellId::from(parts[0]);
        if !seen.insert(cell_id.clone()) {
            return Err(SnbFileError::DuplicateCell {
                cell_id,
                line: line_num,
            });
        }

        records.push(SnowBandRecord {
            cell_id,
            area_fracs: values[..num_bands].to_vec(),
            median_elevs: values[num_bands..2 * num_bands].to_vec(),
            prec_fracs: values[2 * num_bands..].to_vec(),
        });
    }

    Ok(SnowBandFile { num_bands, records })
}

/// Format the registry as snow-band text.
///
/// Every slot is written, padding as zeros. The precipitation fraction of a
/// band equals its area fraction.
pub fn format_snb_params(registry: &CellRegistry) -> String {
    let mut out = String::new();
    for (cell_id, cell) in registry.iter() {
        let mut area_fracs = Vec::with_capacity(cell.capacity());
        let mut elevs = Vec::with_capacity(cell.capacity());
        for slot in cell.slots() {
            match slot {
                Some(band) => {
                    area_fracs.push(band.area_frac());
                    elevs.push(band.median_elev);
                }
                None => {
                    area_fracs.push(0.0);
                    elevs.push(0.0);
                }
            }
        }

        out.push_str(cell_id.as_str());
        for v in area_fracs.iter().chain(&elevs).chain(&area_fracs) {
            out.push(' ');
            out.push_str(&v.to_string());
        }
        out.push('\n');
    }
    out
}

/// Write the registry to a snow-band file.
pub fn write_snb_file(path: &Path, registry: &CellRegistry) -> Result<(), SnbFileError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(format_snb_params(registry).as_bytes())?;
    writer.flush()?;
    Ok(())
}
