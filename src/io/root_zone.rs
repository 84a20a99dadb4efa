//! One-line root-zone parameter override files.
//!
//! The file holds the six root-zone values of a vegetation tile line, e.g.
//! `0.10 1.00 0.10 0.00 0.10 0.00`. Anything after the first non-empty line
//! is ignored.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::types::{ParseRootZoneError, RootZoneParams};

/// Error type for root-zone files.
#[derive(Debug, Error)]
pub enum RootZoneFileError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Parse error with line number
    #[error("Parse error at line {line}: {source}")]
    ParseError {
        line: usize,
        #[source]
        source: ParseRootZoneError,
    },

    /// No values in the file
    #[error("Root zone file is empty")]
    Empty,
}

/// Read root-zone parameters from a file.
pub fn read_root_zone_file(path: &Path) -> Result<RootZoneParams, RootZoneFileError> {
    let content = fs::read_to_string(path)?;
    parse_root_zone(&content)
}

/// Parse the first non-empty line of `content`.
pub fn parse_root_zone(content: &str) -> Result<RootZoneParams, RootZoneFileError> {
    let (idx, line) = content
        .lines()
        .enumerate()
        .find(|(_, l)| !l.trim().is_empty())
        .ok_or(RootZoneFileError::Empty)?;
    line.parse()
        .map_err(|source| RootZoneFileError::ParseError {
            line: idx + 1,
            source,
        })
}
