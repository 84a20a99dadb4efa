//! Root-zone parameter vectors attached to every sub-area.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of values in a root-zone parameter vector (depth/fraction pairs
/// for three soil layers).
pub const ROOT_ZONE_LEN: usize = 6;

/// Error parsing a root-zone parameter line.
#[derive(Debug, Error, PartialEq)]
pub enum ParseRootZoneError {
    /// Wrong number of values
    #[error("Expected 6 root zone values, found {0}")]
    WrongLength(usize),

    /// Value is not a number
    #[error("Invalid root zone value '{0}'")]
    InvalidValue(String),
}

/// Root-zone parameters of a sub-area: `[depth1, frac1, depth2, frac2, depth3, frac3]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootZoneParams(pub [f64; ROOT_ZONE_LEN]);

impl RootZoneParams {
    /// Create from an array of values.
    pub const fn new(values: [f64; ROOT_ZONE_LEN]) -> Self {
        Self(values)
    }

    /// Build from a slice, which must hold exactly [`ROOT_ZONE_LEN`] values.
    pub fn from_slice(values: &[f64]) -> Result<Self, ParseRootZoneError> {
        let arr: [f64; ROOT_ZONE_LEN] = values
            .try_into()
            .map_err(|_| ParseRootZoneError::WrongLength(values.len()))?;
        Ok(Self(arr))
    }

    /// Borrow the raw values.
    #[inline]
    pub fn values(&self) -> &[f64; ROOT_ZONE_LEN] {
        &self.0
    }
}

/// `0.10 1.00 0.10 0.00 0.10 0.00`: used for glacier and open ground unless
/// overridden.
impl Default for RootZoneParams {
    fn default() -> Self {
        Self([0.10, 1.00, 0.10, 0.00, 0.10, 0.00])
    }
}

impl FromStr for RootZoneParams {
    type Err = ParseRootZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>()
                    .map_err(|_| ParseRootZoneError::InvalidValue(tok.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_slice(&values)
    }
}

impl fmt::Display for RootZoneParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:.2}", v)?;
        }
        Ok(())
    }
}
