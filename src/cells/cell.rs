//! Padded band sequence of a single terrain cell.
//!
//! A cell owns a fixed number of band slots. The live bands form one
//! contiguous run; the slots on either side are reserved padding that glacier
//! advance or retreat can later claim, one slot at a time, at the ends of the
//! run only.
//!
//! ```text
//!  slot:   0     1     2     3     4     5
//!        [pad] [B1]  [B2]  [B3]  [pad] [pad]
//!         ^^^   ^^^^^^^^^^^^^^^   ^^^^^^^^^
//!       left=1     live = 3        right=2
//! ```
//!
//! Slot `i` always covers elevations `[origin + i*band_size, origin + (i+1)*band_size)`.

use tracing::debug;

use super::error::Side;
use super::{Band, CellError};
use crate::types::SlotIndex;

/// Fixed-capacity, padded, contiguous sequence of elevation bands.
///
/// Invariant: `left_padding + len() + right_padding == capacity()`, and the
/// live bands occupy exactly the slots `left_padding .. capacity - right_padding`.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    origin: f64,
    band_size: f64,
    left_padding: usize,
    right_padding: usize,
    slots: Vec<Option<Band>>,
}

impl Cell {
    /// Create a cell from its live bands and padding counts.
    ///
    /// `origin` is the lower elevation bound of slot 0.
    ///
    /// # Errors
    /// `InvalidBandSize` if `band_size` is not a positive finite number,
    /// `NonFiniteElevation` if `origin` is not finite.
    pub fn new(
        origin: f64,
        band_size: f64,
        left_padding: usize,
        bands: Vec<Band>,
        right_padding: usize,
    ) -> Result<Self, CellError> {
        if !(band_size.is_finite() && band_size > 0.0) {
            return Err(CellError::InvalidBandSize { band_size });
        }
        if !origin.is_finite() {
            return Err(CellError::NonFiniteElevation { elevation: origin });
        }

        let capacity = left_padding + bands.len() + right_padding;
        let mut slots = Vec::with_capacity(capacity);
        slots.extend((0..left_padding).map(|_| None));
        slots.extend(bands.into_iter().map(Some));
        slots.extend((0..right_padding).map(|_| None));

        Ok(Self {
            origin,
            band_size,
            left_padding,
            right_padding,
            slots,
        })
    }

    /// Lower elevation bound of slot 0.
    #[inline]
    pub fn origin(&self) -> f64 {
        self.origin
    }

    /// Vertical width of every band (m).
    #[inline]
    pub fn band_size(&self) -> f64 {
        self.band_size
    }

    /// Total number of slots, live or padding.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of unused slots below the live run.
    #[inline]
    pub fn left_padding(&self) -> usize {
        self.left_padding
    }

    /// Number of unused slots above the live run.
    #[inline]
    pub fn right_padding(&self) -> usize {
        self.right_padding
    }

    /// Number of live bands.
    #[inline]
    pub fn len(&self) -> usize {
        self.capacity() - self.left_padding - self.right_padding
    }

    /// True when no band is live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot of the lowest live band.
    pub fn lowest_slot(&self) -> Option<SlotIndex> {
        (!self.is_empty()).then(|| SlotIndex::new(self.left_padding))
    }

    /// Slot of the highest live band.
    pub fn highest_slot(&self) -> Option<SlotIndex> {
        (!self.is_empty()).then(|| SlotIndex::new(self.capacity() - self.right_padding - 1))
    }

    /// Read a slot.
    ///
    /// Returns `Ok(Some(band))` for a live slot and `Ok(None)` for padding.
    ///
    /// # Errors
    /// `SlotOutOfBounds` if `slot >= capacity()`.
    pub fn get(&self, slot: SlotIndex) -> Result<Option<&Band>, CellError> {
        self.slots
            .get(slot.get())
            .map(Option::as_ref)
            .ok_or(CellError::SlotOutOfBounds {
                slot: slot.get(),
                capacity: self.capacity(),
            })
    }

    /// Mutable access to a live band.
    ///
    /// # Errors
    /// `SlotOutOfBounds` outside the capacity, `EmptySlot` for padding.
    pub fn band_mut(&mut self, slot: SlotIndex) -> Result<&mut Band, CellError> {
        let capacity = self.capacity();
        match self.slots.get_mut(slot.get()) {
            Some(Some(band)) => Ok(band),
            Some(None) => Err(CellError::EmptySlot { slot }),
            None => Err(CellError::SlotOutOfBounds {
                slot: slot.get(),
                capacity,
            }),
        }
    }

    /// Iterate live bands in slot order.
    pub fn bands(&self) -> impl Iterator<Item = (SlotIndex, &Band)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|b| (SlotIndex::new(i), b)))
    }

    /// Iterate live bands mutably in slot order.
    pub fn bands_mut(&mut self) -> impl Iterator<Item = (SlotIndex, &mut Band)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.as_mut().map(|b| (SlotIndex::new(i), b)))
    }

    /// Iterate every slot, padding included, in slot order.
    pub fn slots(&self) -> impl Iterator<Item = Option<&Band>> {
        self.slots.iter().map(Option::as_ref)
    }

    /// Sum of the live bands' area fractions.
    pub fn area_frac(&self) -> f64 {
        self.bands().fold(0.0, |acc, (_, b)| acc + b.area_frac())
    }

    /// Absolute slot whose elevation range contains `elevation`.
    ///
    /// May be negative or beyond the capacity.
    pub fn slot_for_elevation(&self, elevation: f64) -> i64 {
        ((elevation - self.origin) / self.band_size).floor() as i64
    }

    /// Lower elevation bound of a slot.
    pub fn slot_floor_elevation(&self, slot: SlotIndex) -> f64 {
        self.origin + slot.get() as f64 * self.band_size
    }

    /// Live slot whose elevation range contains `elevation`, if any.
    pub fn live_slot_for_elevation(&self, elevation: f64) -> Option<SlotIndex> {
        let target = self.slot_for_elevation(elevation);
        let slot = usize::try_from(target).ok()?;
        matches!(self.slots.get(slot), Some(Some(_))).then_some(SlotIndex::new(slot))
    }

    /// Create an empty band for `pixel_elev` directly below or above the live run.
    ///
    /// The new band takes `pixel_elev` as its median elevation and consumes one
    /// padding slot on that side. Slots of existing bands are unchanged.
    ///
    /// # Errors
    /// - `NonFiniteElevation` for NaN or infinite input
    /// - `SlotOccupied` if the target slot is already live
    /// - `PaddingExhausted` if the required side has no padding left
    /// - `BandGap` if the target is not adjacent to the live run
    pub fn create_band(&mut self, pixel_elev: f64) -> Result<SlotIndex, CellError> {
        if !pixel_elev.is_finite() {
            return Err(CellError::NonFiniteElevation {
                elevation: pixel_elev,
            });
        }

        let target = self.slot_for_elevation(pixel_elev);
        let lowest = self.left_padding as i64;
        let highest = (self.capacity() - self.right_padding) as i64 - 1;

        let side = if target < lowest {
            if self.left_padding == 0 {
                return Err(CellError::PaddingExhausted {
                    side: Side::Low,
                    target,
                });
            }
            if target != lowest - 1 {
                return Err(CellError::BandGap {
                    target,
                    lowest,
                    highest,
                });
            }
            Side::Low
        } else if target > highest {
            if self.right_padding == 0 {
                return Err(CellError::PaddingExhausted {
                    side: Side::High,
                    target,
                });
            }
            if target != highest + 1 {
                return Err(CellError::BandGap {
                    target,
                    lowest,
                    highest,
                });
            }
            Side::High
        } else {
            return Err(CellError::SlotOccupied {
                slot: SlotIndex::new(target as usize),
            });
        };

        // target is adjacent to the run and padding exists on that side, so it
        // lies inside [0, capacity)
        let slot = target as usize;
        self.slots[slot] = Some(Band::new(pixel_elev));
        match side {
            Side::Low => self.left_padding -= 1,
            Side::High => self.right_padding -= 1,
        }
        debug!(slot, pixel_elev, %side, "created band");

        Ok(SlotIndex::new(slot))
    }

    /// Remove the lowest or highest live band, releasing its slot to padding.
    ///
    /// A band that is both lowest and highest is released to the low side.
    ///
    /// # Errors
    /// - `SlotOutOfBounds` outside the capacity
    /// - `EmptySlot` if the slot is padding
    /// - `InteriorBand` if the slot is live but not at either end
    pub fn delete_band(&mut self, slot: SlotIndex) -> Result<Band, CellError> {
        let s = slot.get();
        if s >= self.capacity() {
            return Err(CellError::SlotOutOfBounds {
                slot: s,
                capacity: self.capacity(),
            });
        }

        let side = match (self.lowest_slot(), self.highest_slot()) {
            (Some(lo), _) if lo == slot => Side::Low,
            (_, Some(hi)) if hi == slot => Side::High,
            (Some(lo), Some(hi)) if lo < slot && slot < hi => {
                return Err(CellError::InteriorBand { slot });
            }
            _ => return Err(CellError::EmptySlot { slot }),
        };

        let band = self.slots[s].take().ok_or(CellError::EmptySlot { slot })?;
        match side {
            Side::Low => self.left_padding += 1,
            Side::High => self.right_padding += 1,
        }
        debug!(slot = s, %side, "deleted band");

        Ok(band)
    }
}
