//! The external models driven by the conductor.
//!
//! [`ExternalModels`] is the seam between the coupling loop and the VIC and
//! glacier model executables, so the loop can be exercised without them.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::info;

use crate::cells::CellRegistry;
use crate::io::{read_mass_balance_polynomials, MassBalances, StateFileError};

/// File the glacier model writes its new surface DEM to, inside its output
/// directory.
pub const RGM_SURFACE_DEM_OUTPUT: &str = "s_out_00001.grd";

/// Errors from running or reading the external models.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Executable could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Executable exited unsuccessfully
    #[error("{program} exited with {status}")]
    Failed { program: PathBuf, status: ExitStatus },

    /// Expected output file was not produced
    #[error("Expected model output {0} was not written")]
    MissingOutput(PathBuf),

    /// State file could not be read
    #[error(transparent)]
    State(#[from] StateFileError),
}

/// Arguments of one glacier model run.
#[derive(Clone, Copy, Debug)]
pub struct RgmInvocation<'a> {
    pub params_file: &'a Path,
    pub bed_dem: &'a Path,
    pub surface_dem: &'a Path,
    pub mass_balance_grid: &'a Path,
    pub output_dir: &'a Path,
}

/// VIC and the glacier model, as seen by the coupling loop.
pub trait ExternalModels {
    /// Run VIC with a global parameter file.
    fn run_vic(&mut self, global_file: &Path) -> Result<(), ModelError>;

    /// Run the glacier model for one year. Returns the new surface DEM file.
    fn run_rgm(&mut self, invocation: &RgmInvocation<'_>) -> Result<PathBuf, ModelError>;

    /// Mass-balance polynomials VIC wrote to a state file.
    fn read_mass_balances(
        &mut self,
        state_file: &Path,
        registry: &CellRegistry,
    ) -> Result<MassBalances, ModelError>;
}

/// Runs the real executables as child processes.
#[derive(Clone, Debug)]
pub struct ProcessModels {
    pub vic_path: PathBuf,
    pub rgm_path: PathBuf,
}

impl ProcessModels {
    pub fn new(vic_path: impl Into<PathBuf>, rgm_path: impl Into<PathBuf>) -> Self {
        Self {
            vic_path: vic_path.into(),
            rgm_path: rgm_path.into(),
        }
    }
}

fn run_command(command: &mut Command, program: &Path) -> Result<(), ModelError> {
    let status = command.status().map_err(|source| ModelError::Spawn {
        program: program.to_path_buf(),
        source,
    })?;
    if !status.success() {
        return Err(ModelError::Failed {
            program: program.to_path_buf(),
            status,
        });
    }
    Ok(())
}

impl ExternalModels for ProcessModels {
    fn run_vic(&mut self, global_file: &Path) -> Result<(), ModelError> {
        info!(global_file = %global_file.display(), "invoking VIC");
        run_command(
            Command::new(&self.vic_path).arg("-g").arg(global_file),
            &self.vic_path,
        )
    }

    fn run_rgm(&mut self, inv: &RgmInvocation<'_>) -> Result<PathBuf, ModelError> {
        info!(
            surface_dem = %inv.surface_dem.display(),
            mass_balance_grid = %inv.mass_balance_grid.display(),
            "invoking glacier model"
        );
        run_command(
            Command::new(&self.rgm_path)
                .arg("-p")
                .arg(inv.params_file)
                .arg("-b")
                .arg(inv.bed_dem)
                .arg("-d")
                .arg(inv.surface_dem)
                .arg("-m")
                .arg(inv.mass_balance_grid)
                .arg("-o")
                .arg(inv.output_dir)
                .args(["-s", "0", "-e", "0"]),
            &self.rgm_path,
        )?;

        let output = inv.output_dir.join(RGM_SURFACE_DEM_OUTPUT);
        if !output.is_file() {
            return Err(ModelError::MissingOutput(output));
        }
        Ok(output)
    }

    fn read_mass_balances(
        &mut self,
        state_file: &Path,
        registry: &CellRegistry,
    ) -> Result<MassBalances, ModelError> {
        info!(state_file = %state_file.display(), "reading mass balance polynomials");
        Ok(read_mass_balance_polynomials(state_file, registry)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executable() {
        let mut models = ProcessModels::new("/nonexistent/vicNl", "/nonexistent/rgm");
        assert!(matches!(
            models.run_vic(Path::new("global.txt")),
            Err(ModelError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_exit_status() {
        let mut models = ProcessModels::new("false", "false");
        assert!(matches!(
            models.run_vic(Path::new("global.txt")),
            Err(ModelError::Failed { .. })
        ));
    }
}
