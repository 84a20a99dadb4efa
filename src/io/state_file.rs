//! Glacier mass-balance polynomials from VIC state files.
//!
//! VIC writes, per cell, the coefficients of a quadratic fit of glacier mass
//! balance against elevation into the `GLAC_MASS_BALANCE_INFO` state variable
//! as rows of `[cell_id, b0, b1, b2]`. Reading NetCDF requires the `netcdf`
//! feature; the row validation does not.

use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

use crate::cells::CellRegistry;
use crate::glacier::MassBalancePolynomial;
use crate::types::CellId;

/// Name of the state variable holding the polynomial rows.
pub const MASS_BALANCE_VARIABLE: &str = "GLAC_MASS_BALANCE_INFO";

/// Mass-balance polynomials keyed by cell, in state file order.
pub type MassBalances = IndexMap<CellId, MassBalancePolynomial>;

/// Error type for state file reading.
#[derive(Debug, Error)]
pub enum StateFileError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// NetCDF library error
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    /// Missing variable
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// Invalid data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Row count differs from the registry
    #[error("State file holds {found} cells, registry holds {expected}")]
    CellCountMismatch { expected: usize, found: usize },

    /// Row names a cell the registry does not know
    #[error("State file cell {0} is not in the registry")]
    UnknownCell(CellId),

    /// Feature not enabled
    #[error("NetCDF feature not enabled")]
    FeatureDisabled,
}

/// Validate `[cell_id, b0, b1, b2]` rows against the registry.
pub fn mass_balances_from_rows(
    rows: &[[f64; 4]],
    registry: &CellRegistry,
) -> Result<MassBalances, StateFileError> {
    if rows.len() != registry.len() {
        return Err(StateFileError::CellCountMismatch {
            expected: registry.len(),
            found: rows.len(),
        });
    }

    let mut polys = MassBalances::with_capacity(rows.len());
    for &[id, b0, b1, b2] in rows {
        if !id.is_finite() || id.fract() != 0.0 {
            return Err(StateFileError::InvalidData(format!(
                "cell id {} is not an integer",
                id
            )));
        }
        let cell_id = CellId::new((id as i64).to_string());
        if !registry.contains(&cell_id) {
            return Err(StateFileError::UnknownCell(cell_id));
        }
        polys.insert(cell_id, MassBalancePolynomial::new(b0, b1, b2));
    }
    Ok(polys)
}

/// Read the mass-balance polynomials of the first state record.
#[cfg(feature = "netcdf")]
pub fn read_mass_balance_polynomials(
    path: &Path,
    registry: &CellRegistry,
) -> Result<MassBalances, StateFileError> {
    let file = netcdf::open(path)?;
    let var = file
        .variable(MASS_BALANCE_VARIABLE)
        .ok_or_else(|| StateFileError::MissingVariable(MASS_BALANCE_VARIABLE.into()))?;

    let dims = var.dimensions();
    let (n_rows, n_coef) = match dims.len() {
        2 => (dims[0].len(), dims[1].len()),
        3 => (dims[1].len(), dims[2].len()),
        n => {
            return Err(StateFileError::InvalidData(format!(
                "{} has {} dimensions, expected 2 or 3",
                MASS_BALANCE_VARIABLE, n
            )))
        }
    };
    if n_coef != 4 {
        return Err(StateFileError::InvalidData(format!(
            "{} rows hold {} values, expected 4",
            MASS_BALANCE_VARIABLE, n_coef
        )));
    }

    let flat: Vec<f64> = var.get_values(..)?;
    let rows: Vec<[f64; 4]> = flat
        .chunks_exact(4)
        .take(n_rows)
        .map(|c| [c[0], c[1], c[2], c[3]])
        .collect();
    mass_balances_from_rows(&rows, registry)
}

/// Read the mass-balance polynomials of the first state record.
#[cfg(not(feature = "netcdf"))]
pub fn read_mass_balance_polynomials(
    _path: &Path,
    _registry: &CellRegistry,
) -> Result<MassBalances, StateFileError> {
    Err(StateFileError::FeatureDisabled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::merge_cell_input;
    use crate::cells::{ElevationInput, LandCoverInput, SubArea};
    use crate::types::{LandCoverId, RootZoneParams};
    use std::collections::BTreeMap;

    fn registry() -> CellRegistry {
        let mut elevs = ElevationInput::new();
        let mut lc = LandCoverInput::new();
        for id in ["101", "102"] {
            elevs.insert(CellId::from(id), vec![1950.0, 0.0]);
            let mut band = BTreeMap::new();
            band.insert(
                LandCoverId::OPEN_GROUND,
                SubArea::new(1.0, RootZoneParams::default()),
            );
            lc.insert(CellId::from(id), vec![band]);
        }
        merge_cell_input(elevs, lc, 100.0).unwrap()
    }

    #[test]
    fn test_rows_to_polynomials() {
        let reg = registry();
        let rows = [[102.0, -5.0, 0.002, 0.0], [101.0, -4.0, 0.001, 1e-7]];
        let polys = mass_balances_from_rows(&rows, &reg).unwrap();
        assert_eq!(polys.len(), 2);
        assert_eq!(polys[&CellId::from("101")].b2, 1e-7);
        assert_eq!(polys.keys().next().unwrap().as_str(), "102");
    }

    #[test]
    fn test_count_mismatch() {
        let reg = registry();
        assert!(matches!(
            mass_balances_from_rows(&[[101.0, 0.0, 0.0, 0.0]], &reg),
            Err(StateFileError::CellCountMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_unknown_cell() {
        let reg = registry();
        let rows = [[101.0, 0.0, 0.0, 0.0], [999.0, 0.0, 0.0, 0.0]];
        assert!(matches!(
            mass_balances_from_rows(&rows, &reg),
            Err(StateFileError::UnknownCell(id)) if id.as_str() == "999"
        ));
    }

    #[cfg(not(feature = "netcdf"))]
    #[test]
    fn test_feature_disabled() {
        let reg = registry();
        assert!(matches!(
            read_mass_balance_polynomials(Path::new("state.nc"), &reg),
            Err(StateFileError::FeatureDisabled)
        ));
    }
}
