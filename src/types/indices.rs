//! Absolute slot numbers within a padded band sequence.

use std::fmt;

/// Absolute slot number within a cell's padded band sequence.
///
/// Slot numbers are stable: slot `i` always covers the elevation range
/// `[origin + i * band_size, origin + (i + 1) * band_size)` for its cell,
/// whatever the current padding looks like.
///
/// # Example
///
/// ```
/// use hydro_conductor::types::SlotIndex;
///
/// let slot = SlotIndex::new(4);
/// assert_eq!(slot.get(), 4);
/// assert_eq!(slot.next().get(), 5);
/// assert_eq!(SlotIndex::ZERO.prev(), SlotIndex::ZERO);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SlotIndex(usize);

impl SlotIndex {
    /// First slot (0).
    pub const ZERO: Self = Self(0);

    /// Create a new slot index.
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw slot number.
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Increment by one.
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Decrement by one, saturating at zero.
    #[inline]
    pub fn prev(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

impl From<usize> for SlotIndex {
    #[inline]
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl From<SlotIndex> for usize {
    #[inline]
    fn from(idx: SlotIndex) -> usize {
        idx.0
    }
}
