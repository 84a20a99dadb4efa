//! Row-major raster grids shared by the glacier model inputs and outputs.

use thiserror::Error;

/// Data length does not match the declared grid shape.
#[derive(Debug, Error, PartialEq)]
#[error("Grid of {n_rows}x{n_cols} needs {expected} values, got {actual}")]
pub struct GridShapeError {
    pub n_rows: usize,
    pub n_cols: usize,
    pub expected: usize,
    pub actual: usize,
}

/// A 2D raster of `f64` values stored row-major (row 0 first).
#[derive(Clone, Debug, PartialEq)]
pub struct Grid2D {
    n_rows: usize,
    n_cols: usize,
    values: Vec<f64>,
}

impl Grid2D {
    /// Grid filled with zeros.
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            values: vec![0.0; n_rows * n_cols],
        }
    }

    /// Wrap row-major values.
    pub fn from_vec(n_rows: usize, n_cols: usize, values: Vec<f64>) -> Result<Self, GridShapeError> {
        let expected = n_rows * n_cols;
        if values.len() != expected {
            return Err(GridShapeError {
                n_rows,
                n_cols,
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            n_rows,
            n_cols,
            values,
        })
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// `(n_rows, n_cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    #[inline]
    pub fn flat_index(&self, row: usize, col: usize) -> usize {
        row * self.n_cols + col
    }

    /// Value at `(row, col)`. Panics outside the grid.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[self.flat_index(row, col)]
    }

    /// Set the value at `(row, col)`. Panics outside the grid.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        let idx = self.flat_index(row, col);
        self.values[idx] = value;
    }

    /// Raw row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.n_cols.max(1))
    }

    /// `(min, max)` over all values, `(0, 0)` for an empty grid.
    pub fn min_max(&self) -> (f64, f64) {
        if self.values.is_empty() {
            return (0.0, 0.0);
        }
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}
