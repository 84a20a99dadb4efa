//! Mass-balance polynomials and their translation onto the glacier model grid.

use indexmap::IndexMap;

use super::GlacierError;
use crate::grid::Grid2D;
use crate::io::PixelMap;
use crate::types::CellId;

/// Quadratic fit of glacier mass balance against elevation for one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MassBalancePolynomial {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
}

impl MassBalancePolynomial {
    pub fn new(b0: f64, b1: f64, b2: f64) -> Self {
        Self { b0, b1, b2 }
    }

    /// `b0 + b1*z + b2*z^2`
    #[inline]
    pub fn eval(&self, z: f64) -> f64 {
        self.b0 + z * (self.b1 + z * self.b2)
    }
}

/// Evaluate each mapped pixel's cell polynomial at the pixel's elevation.
///
/// Pixels outside every cell stay at zero.
///
/// # Errors
/// `UnknownCell` if a pixel belongs to a cell without a polynomial.
pub fn mass_balances_to_rgm_grid(
    polys: &IndexMap<CellId, MassBalancePolynomial>,
    pixel_map: &PixelMap,
) -> Result<Grid2D, GlacierError> {
    let (n_rows, n_cols) = pixel_map.shape();
    let mut grid = Grid2D::zeros(n_rows, n_cols);
    for (row, col, pixel) in pixel_map.iter_mapped() {
        let poly = polys
            .get(&pixel.cell_id)
            .ok_or_else(|| GlacierError::UnknownCell {
                cell_id: pixel.cell_id.clone(),
            })?;
        grid.set(row, col, poly.eval(pixel.median_elev));
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parse_pixel_map;
    use approx::assert_relative_eq;

    #[test]
    fn test_eval() {
        let p = MassBalancePolynomial::new(-2.0, 0.001, 1e-6);
        assert_relative_eq!(p.eval(0.0), -2.0);
        assert_relative_eq!(p.eval(2000.0), -2.0 + 2.0 + 4.0);
    }

    #[test]
    fn test_grid_translation() {
        let map = parse_pixel_map(
            "NCOLS 2\nNROWS 2\nheader\n0 0 0 0 1000 1\n1 0 1 0 2000 1\n2 1 1 0 1500 2\n",
        )
        .unwrap();
        let mut polys = IndexMap::new();
        polys.insert(CellId::from("1"), MassBalancePolynomial::new(1.0, 0.001, 0.0));
        polys.insert(CellId::from("2"), MassBalancePolynomial::new(-1.0, 0.0, 0.0));

        let grid = mass_balances_to_rgm_grid(&polys, &map).unwrap();
        assert_relative_eq!(grid.get(0, 0), 2.0);
        assert_relative_eq!(grid.get(0, 1), 3.0);
        assert_eq!(grid.get(1, 0), 0.0);
        assert_relative_eq!(grid.get(1, 1), -1.0);
    }

    #[test]
    fn test_unknown_cell() {
        let map = parse_pixel_map("NCOLS 1\nNROWS 1\nheader\n0 0 0 0 1000 9\n").unwrap();
        let polys = IndexMap::new();
        assert!(matches!(
            mass_balances_to_rgm_grid(&polys, &map),
            Err(GlacierError::UnknownCell { .. })
        ));
    }
}
