//! The coupled VIC / glacier model loop.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::{ConductorConfig, ExternalModels, ModelError, RgmInvocation, RunRange, RunRanges};
use crate::cells::{merge_cell_input, CellError, CellRegistry};
use crate::glacier::{
    mass_balances_to_rgm_grid, update_band_areas, update_glacier_mask, BandAreaSummary,
    GlacierError, GlacierMask, SubAreaRoots,
};
use crate::grid::Grid2D;
use crate::io::{
    read_global_params_file, read_gsa_file, read_pixel_map_file, read_snb_file,
    read_veg_param_file, write_gsa_file, write_snb_file, write_veg_param_file, GlobalParams,
    GlobalParamsError, GsaExtent, GsaFileError, GsaGrid, PixelMap, PixelMapError,
    RootZoneFileError, SnbFileError, VegParamFileError,
};

// =============================================================================
// Errors
// =============================================================================

/// Errors that stop a coupled run.
#[derive(Debug, Error)]
pub enum ConductorError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    GlobalParams(#[from] GlobalParamsError),

    #[error(transparent)]
    VegParams(#[from] VegParamFileError),

    #[error(transparent)]
    SnowBands(#[from] SnbFileError),

    #[error(transparent)]
    Gsa(#[from] GsaFileError),

    #[error(transparent)]
    PixelMap(#[from] PixelMapError),

    #[error(transparent)]
    RootZone(#[from] RootZoneFileError),

    #[error(transparent)]
    Cells(#[from] CellError),

    #[error(transparent)]
    Glacier(#[from] GlacierError),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// Only NetCDF state files carry mass-balance polynomials
    #[error("State format must be NETCDF, global file has {0}")]
    UnsupportedStateFormat(String),

    /// Grid file shape differs from the pixel map
    #[error("{} is {actual:?} (rows, cols), pixel map is {expected:?}", .path.display())]
    DimensionMismatch {
        path: PathBuf,
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

// =============================================================================
// Reports
// =============================================================================

/// Outcome of one VIC / glacier model iteration.
#[derive(Clone, Debug)]
pub struct IterationReport {
    pub range: RunRange,
    /// VIC state file the mass balances were read from
    pub state_file: PathBuf,
    pub bands: BandAreaSummary,
}

// =============================================================================
// Conductor
// =============================================================================

/// Drives VIC and the glacier model over the simulation period, keeping the
/// band registry in step with the glacier surface.
pub struct Conductor<M: ExternalModels> {
    config: ConductorConfig,
    models: M,
    global: GlobalParams,
    num_bands: usize,
    registry: CellRegistry,
    pixel_map: PixelMap,
    bed_dem: Grid2D,
    extent: GsaExtent,
    glacier_mask: GlacierMask,
    roots: SubAreaRoots,
    surface_dem_file: PathBuf,
    veg_file: PathBuf,
    snb_file: PathBuf,
}

impl<M: ExternalModels> Conductor<M> {
    /// Load all inputs, build the registry and write the first iteration's
    /// vegetation and snow-band files.
    ///
    /// The registry is written as read: the initial glacier mask is loaded and
    /// checked but does not change band areas before the first run.
    pub fn initialize(config: ConductorConfig, models: M) -> Result<Self, ConductorError> {
        let global = read_global_params_file(&config.vic_global_file)?;
        match global.state_format() {
            Some(f) if f.eq_ignore_ascii_case("NETCDF") => {}
            other => {
                return Err(ConductorError::UnsupportedStateFormat(
                    other.unwrap_or("none").to_string(),
                ))
            }
        }

        let veg = read_veg_param_file(&global.vegparam()?)?;
        let (num_bands, snb_path) = global.snow_band()?;
        let snb = read_snb_file(&snb_path, num_bands)?;
        let elevations = snb.elevation_input();
        let land_cover = veg.land_cover_input(&elevations)?;
        let registry = merge_cell_input(elevations, land_cover, config.band_size)?;
        info!(
            cells = registry.len(),
            num_bands,
            band_size = config.band_size,
            "built cell registry"
        );

        let pixel_map = read_pixel_map_file(&config.pixel_map_file)?;
        let shape = pixel_map.shape();
        let bed = read_grid(&config.bed_dem_file, shape)?;
        read_grid(&config.surface_dem_file, shape)?;
        let mask = read_grid(&config.glacier_mask_file, shape)?;
        let glacier_mask = GlacierMask::from_grid(&mask.grid);
        info!(
            rows = shape.0,
            cols = shape.1,
            glacier_pixels = glacier_mask.glacier_count(),
            "loaded glacier model grids"
        );

        let roots = config.sub_area_roots()?;
        fs::create_dir_all(&config.temp_dir)?;

        let start = global.start_date()?;
        let veg_file = config.temp_file(&format!("vpf_temp_{}.txt", start));
        let snb_file = config.temp_file(&format!("snb_temp_{}.txt", start));
        write_veg_param_file(&veg_file, &registry)?;
        write_snb_file(&snb_file, &registry)?;

        Ok(Self {
            surface_dem_file: config.surface_dem_file.clone(),
            config,
            models,
            global,
            num_bands,
            registry,
            pixel_map,
            bed_dem: bed.grid,
            extent: bed.header.extent,
            glacier_mask,
            roots,
            veg_file,
            snb_file,
        })
    }

    /// Run every range of the simulation period.
    pub fn run(&mut self) -> Result<Vec<IterationReport>, ConductorError> {
        let ranges = RunRanges::new(
            self.global.start_date()?,
            self.global.end_date()?,
            self.global.glacier_accum_start()?,
        );
        let mut reports = Vec::new();
        for range in ranges {
            reports.push(self.run_iteration(range)?);
        }
        info!(iterations = reports.len(), "coupled run complete");
        Ok(reports)
    }

    /// Run VIC and the glacier model once over `range`, then update bands.
    pub fn run_iteration(&mut self, range: RunRange) -> Result<IterationReport, ConductorError> {
        info!(start = %range.start, end = %range.end, "running VIC");
        let tag = range.start.to_string();

        self.global.set_vegparam(&self.veg_file);
        self.global.set_snow_band(self.num_bands, &self.snb_file);
        self.global.set_start_date(range.start);
        self.global.set_end_date(range.end);
        self.global.set_state_date(range.end);
        let global_file = self.config.temp_file(&format!("gpf_temp_{}.txt", tag));
        self.global.write(&global_file)?;

        self.models.run_vic(&global_file)?;

        let state_file = PathBuf::from(format!(
            "{}_{}",
            self.global.statename()?,
            range.end.format("%Y%m%d")
        ));
        let polys = self.models.read_mass_balances(&state_file, &self.registry)?;
        let mass_balance = mass_balances_to_rgm_grid(&polys, &self.pixel_map)?;
        let mbg_file = self
            .config
            .temp_file(&format!("mass_balance_grid_{}.gsa", tag));
        write_gsa_file(&mbg_file, &mass_balance, &self.extent)?;

        let rgm_output = self.models.run_rgm(&RgmInvocation {
            params_file: &self.config.rgm_params_file,
            bed_dem: &self.config.bed_dem_file,
            surface_dem: &self.surface_dem_file,
            mass_balance_grid: &mbg_file,
            output_dir: &self.config.temp_dir,
        })?;
        if !self.config.trace_files {
            fs::remove_file(&mbg_file)?;
        }

        let surface_file = self
            .config
            .temp_file(&format!("rgm_surf_dem_out_{}.gsa", tag));
        fs::rename(&rgm_output, &surface_file)?;
        let surface = read_grid(&surface_file, self.pixel_map.shape())?;
        self.surface_dem_file = surface_file;

        self.glacier_mask = update_glacier_mask(&surface.grid, &self.bed_dem)?;
        if self.config.trace_files {
            let mask_file = self.config.temp_file(&format!("glacier_mask_{}.gsa", tag));
            write_gsa_file(&mask_file, &self.glacier_mask.to_grid(), &self.extent)?;
        }

        let bands = update_band_areas(
            &mut self.registry,
            &mut self.pixel_map,
            &surface.grid,
            &self.glacier_mask,
            &self.roots,
        )?;

        self.veg_file = self.config.temp_file(&format!("vpf_temp_{}.txt", tag));
        self.snb_file = self.config.temp_file(&format!("snb_temp_{}.txt", tag));
        write_veg_param_file(&self.veg_file, &self.registry)?;
        write_snb_file(&self.snb_file, &self.registry)?;
        debug!(
            veg_file = %self.veg_file.display(),
            snb_file = %self.snb_file.display(),
            "wrote band parameters"
        );

        self.global.set_init_state(&state_file);

        Ok(IterationReport {
            range,
            state_file,
            bands,
        })
    }

    pub fn registry(&self) -> &CellRegistry {
        &self.registry
    }

    pub fn pixel_map(&self) -> &PixelMap {
        &self.pixel_map
    }

    pub fn glacier_mask(&self) -> &GlacierMask {
        &self.glacier_mask
    }

    pub fn global_params(&self) -> &GlobalParams {
        &self.global
    }

    /// Current vegetation and snow-band parameter files.
    pub fn band_files(&self) -> (&Path, &Path) {
        (&self.veg_file, &self.snb_file)
    }

    pub fn models(&self) -> &M {
        &self.models
    }
}

fn read_grid(path: &Path, expected: (usize, usize)) -> Result<GsaGrid, ConductorError> {
    let gsa = read_gsa_file(path)?;
    if gsa.grid.shape() != expected {
        return Err(ConductorError::DimensionMismatch {
            path: path.to_path_buf(),
            expected,
            actual: gsa.grid.shape(),
        });
    }
    Ok(gsa)
}
