//! Identifier newtypes for terrain cells and land-cover classes.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of a terrain (VIC grid) cell.
///
/// Cell ids are opaque tokens in every input file, so they are kept as text
/// rather than parsed into integers.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(String);

impl CellId {
    /// Create a new cell id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CellId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CellId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for CellId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Land-cover (vegetation class) identifier of a sub-area.
///
/// Two values are reserved: [`LandCoverId::GLACIER`] and
/// [`LandCoverId::OPEN_GROUND`] (bare soil).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct LandCoverId(u32);

impl LandCoverId {
    /// Glacier land cover.
    pub const GLACIER: Self = Self(22);

    /// Open ground (bare soil) land cover.
    pub const OPEN_GROUND: Self = Self(19);

    /// Create a new land-cover id.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// True for the reserved glacier id.
    #[inline]
    pub fn is_glacier(self) -> bool {
        self == Self::GLACIER
    }

    /// True for the reserved open-ground id.
    #[inline]
    pub fn is_open_ground(self) -> bool {
        self == Self::OPEN_GROUND
    }
}

impl fmt::Display for LandCoverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for LandCoverId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl FromStr for LandCoverId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}
