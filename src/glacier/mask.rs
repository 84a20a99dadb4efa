//! Glacier masks derived from the glacier model's surface and bed DEMs.
//!
//! A pixel is glaciated when the ice surface lies strictly above the bed.
//!
//! # Example
//!
//! ```
//! use hydro_conductor::grid::Grid2D;
//! use hydro_conductor::glacier::update_glacier_mask;
//!
//! let bed = Grid2D::from_vec(1, 3, vec![2000.0, 2010.0, 2020.0]).unwrap();
//! let surface = Grid2D::from_vec(1, 3, vec![2000.0, 2045.0, 2020.0]).unwrap();
//!
//! let mask = update_glacier_mask(&surface, &bed).unwrap();
//! assert!(!mask.is_glacier(0, 0));
//! assert!(mask.is_glacier(0, 1));
//! assert_eq!(mask.glacier_count(), 1);
//! ```

use super::GlacierError;
use crate::grid::Grid2D;

/// Per-pixel glacier / ice-free classification on the glacier model grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GlacierMask {
    /// True if pixel is glaciated, row-major
    pub glacier: Vec<bool>,
    /// Number of rows
    pub n_rows: usize,
    /// Number of columns
    pub n_cols: usize,
}

impl GlacierMask {
    /// Mask with no glacier anywhere.
    pub fn ice_free(n_rows: usize, n_cols: usize) -> Self {
        Self {
            glacier: vec![false; n_rows * n_cols],
            n_rows,
            n_cols,
        }
    }

    /// Read a mask from a grid: any non-zero value is glacier.
    pub fn from_grid(grid: &Grid2D) -> Self {
        Self {
            glacier: grid.values().iter().map(|&v| v != 0.0).collect(),
            n_rows: grid.n_rows(),
            n_cols: grid.n_cols(),
        }
    }

    /// Convert to a 1/0 grid for writing.
    pub fn to_grid(&self) -> Grid2D {
        let mut grid = Grid2D::zeros(self.n_rows, self.n_cols);
        for (idx, &g) in self.glacier.iter().enumerate() {
            if g {
                grid.set(idx / self.n_cols, idx % self.n_cols, 1.0);
            }
        }
        grid
    }

    /// `(n_rows, n_cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Check if a pixel is glaciated.
    #[inline]
    pub fn is_glacier(&self, row: usize, col: usize) -> bool {
        self.glacier[row * self.n_cols + col]
    }

    /// Set the glacier status of a pixel.
    pub fn set_glacier(&mut self, row: usize, col: usize, is_glacier: bool) {
        self.glacier[row * self.n_cols + col] = is_glacier;
    }

    /// Number of glaciated pixels.
    pub fn glacier_count(&self) -> usize {
        self.glacier.iter().filter(|&&g| g).count()
    }
}

/// Derive a glacier mask from surface and bed elevations.
///
/// # Errors
/// - `DimensionMismatch` if the grids differ in shape
/// - `NegativeIceThickness` if the surface lies below the bed anywhere
pub fn update_glacier_mask(surface: &Grid2D, bed: &Grid2D) -> Result<GlacierMask, GlacierError> {
    if surface.shape() != bed.shape() {
        return Err(GlacierError::DimensionMismatch {
            what: "bed DEM",
            expected: surface.shape(),
            actual: bed.shape(),
        });
    }

    let n_cols = surface.n_cols();
    let mut glacier = Vec::with_capacity(surface.values().len());
    for (idx, (&s, &b)) in surface.values().iter().zip(bed.values()).enumerate() {
        let thickness = s - b;
        if thickness < 0.0 {
            return Err(GlacierError::NegativeIceThickness {
                row: idx / n_cols.max(1),
                col: idx % n_cols.max(1),
                thickness,
            });
        }
        glacier.push(thickness > 0.0);
    }

    Ok(GlacierMask {
        glacier,
        n_rows: surface.n_rows(),
        n_cols,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ice_free() {
        let mask = GlacierMask::ice_free(3, 4);
        assert_eq!(mask.glacier_count(), 0);
        assert!(!mask.is_glacier(2, 3));
    }

    #[test]
    fn test_set_glacier() {
        let mut mask = GlacierMask::ice_free(2, 2);
        mask.set_glacier(1, 0, true);
        assert!(mask.is_glacier(1, 0));
        assert!(!mask.is_glacier(0, 1));
        assert_eq!(mask.to_grid().values(), &[0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_from_grid() {
        let grid = Grid2D::from_vec(1, 3, vec![0.0, 1.0, 0.5]).unwrap();
        let mask = GlacierMask::from_grid(&grid);
        assert_eq!(mask.glacier, vec![false, true, true]);
    }

    #[test]
    fn test_negative_thickness_rejected() {
        let bed = Grid2D::from_vec(2, 2, vec![10.0; 4]).unwrap();
        let surface = Grid2D::from_vec(2, 2, vec![10.0, 12.0, 9.5, 10.0]).unwrap();
        let err = update_glacier_mask(&surface, &bed).unwrap_err();
        assert!(matches!(
            err,
            GlacierError::NegativeIceThickness { row: 1, col: 0, .. }
        ));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let bed = Grid2D::zeros(2, 2);
        let surface = Grid2D::zeros(2, 3);
        assert!(matches!(
            update_glacier_mask(&surface, &bed),
            Err(GlacierError::DimensionMismatch { .. })
        ));
    }
}
