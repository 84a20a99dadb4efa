//! Configuration of a coupled VIC / glacier model run.

use std::path::PathBuf;

use crate::glacier::SubAreaRoots;
use crate::io::{read_root_zone_file, RootZoneFileError};

/// Default elevation band height (m).
pub const DEFAULT_BAND_SIZE: f64 = 100.0;

/// Input files, executables and options of a coupled run.
#[derive(Clone, Debug)]
pub struct ConductorConfig {
    /// VIC global parameter file
    pub vic_global_file: PathBuf,
    /// Glacier model parameter file
    pub rgm_params_file: PathBuf,
    /// Initial surface DEM (GSA)
    pub surface_dem_file: PathBuf,
    /// Bed DEM (GSA)
    pub bed_dem_file: PathBuf,
    /// Pixel to VIC cell map
    pub pixel_map_file: PathBuf,
    /// Initial glacier mask (GSA)
    pub glacier_mask_file: PathBuf,
    /// Keep mass-balance grids and write glacier masks for each iteration.
    pub trace_files: bool,
    /// Root-zone override for new open-ground sub-areas
    pub bare_soil_root_file: Option<PathBuf>,
    /// Root-zone override for new glacier sub-areas
    pub glacier_root_file: Option<PathBuf>,
    /// Elevation band height (m)
    pub band_size: f64,
    /// VIC executable
    pub vic_path: PathBuf,
    /// Glacier model executable
    pub rgm_path: PathBuf,
    /// Directory for per-iteration files
    pub temp_dir: PathBuf,
}

impl ConductorConfig {
    /// Configuration with the required input files and default options.
    pub fn new(
        vic_global_file: impl Into<PathBuf>,
        rgm_params_file: impl Into<PathBuf>,
        surface_dem_file: impl Into<PathBuf>,
        bed_dem_file: impl Into<PathBuf>,
        pixel_map_file: impl Into<PathBuf>,
        glacier_mask_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            vic_global_file: vic_global_file.into(),
            rgm_params_file: rgm_params_file.into(),
            surface_dem_file: surface_dem_file.into(),
            bed_dem_file: bed_dem_file.into(),
            pixel_map_file: pixel_map_file.into(),
            glacier_mask_file: glacier_mask_file.into(),
            trace_files: false,
            bare_soil_root_file: None,
            glacier_root_file: None,
            band_size: DEFAULT_BAND_SIZE,
            vic_path: PathBuf::from("vicNl"),
            rgm_path: PathBuf::from("rgm"),
            temp_dir: std::env::temp_dir(),
        }
    }

    pub fn with_trace_files(mut self, trace_files: bool) -> Self {
        self.trace_files = trace_files;
        self
    }

    pub fn with_band_size(mut self, band_size: f64) -> Self {
        self.band_size = band_size;
        self
    }

    pub fn with_bare_soil_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.bare_soil_root_file = Some(path.into());
        self
    }

    pub fn with_glacier_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.glacier_root_file = Some(path.into());
        self
    }

    pub fn with_executables(mut self, vic: impl Into<PathBuf>, rgm: impl Into<PathBuf>) -> Self {
        self.vic_path = vic.into();
        self.rgm_path = rgm.into();
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Path of a per-iteration file inside the temp directory.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.join(name)
    }

    /// Root-zone parameters for new sub-areas, read from the override files
    /// when given.
    pub fn sub_area_roots(&self) -> Result<SubAreaRoots, RootZoneFileError> {
        let read = |path: &Option<PathBuf>| -> Result<_, RootZoneFileError> {
            path.as_deref()
                .map(read_root_zone_file)
                .transpose()
                .map(Option::unwrap_or_default)
        };
        Ok(SubAreaRoots {
            glacier: read(&self.glacier_root_file)?,
            open_ground: read(&self.bare_soil_root_file)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RootZoneParams;
    use tempfile::tempdir;

    fn config() -> ConductorConfig {
        ConductorConfig::new("g.txt", "rgm.params", "s.gsa", "b.gsa", "map.txt", "mask.gsa")
    }

    #[test]
    fn test_defaults() {
        let c = config();
        assert_eq!(c.band_size, DEFAULT_BAND_SIZE);
        assert!(!c.trace_files);
        assert_eq!(c.sub_area_roots().unwrap(), SubAreaRoots::default());
    }

    #[test]
    fn test_root_overrides() {
        let dir = tempdir().unwrap();
        let glacier = dir.path().join("glacier_root.txt");
        std::fs::write(&glacier, "0.30 0.70 0.20 0.30 0.00 0.00\n").unwrap();

        let c = config().with_glacier_root(&glacier).with_temp_dir(dir.path());
        let roots = c.sub_area_roots().unwrap();
        assert_eq!(roots.glacier, RootZoneParams::new([0.30, 0.70, 0.20, 0.30, 0.00, 0.00]));
        assert_eq!(roots.open_ground, RootZoneParams::default());
        assert_eq!(c.temp_file("x.txt"), dir.path().join("x.txt"));
    }

    #[test]
    fn test_missing_root_file() {
        let c = config().with_bare_soil_root("/nonexistent/root.txt");
        assert!(matches!(c.sub_area_roots(), Err(RootZoneFileError::IoError(_))));
    }
}
