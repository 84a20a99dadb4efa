//! Runs VIC and the Regional Glacier Model together, one glacier year at a
//! time, feeding glacier surface changes back into VIC's elevation bands.
//!
//! Usage:
//!   vic-rgm-conductor --g global.txt --rgm-params rgm.params --sdem sdem.gsa \
//!       --bdem bdem.gsa --pixel-map pixel_map.txt --glacier-mask mask.gsa

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use hydro_conductor::simulation::{Conductor, ConductorConfig, ConductorError, ProcessModels};

#[derive(Parser, Debug)]
#[command(name = "vic-rgm-conductor", about = "Couple VIC with the Regional Glacier Model")]
struct Args {
    /// VIC global parameter file
    #[arg(long = "g", value_name = "FILE")]
    vic_global_file: PathBuf,

    /// Regional Glacier Model parameter file
    #[arg(long, value_name = "FILE")]
    rgm_params: PathBuf,

    /// Initial surface DEM (GSA format)
    #[arg(long, value_name = "FILE")]
    sdem: PathBuf,

    /// Bed DEM (GSA format)
    #[arg(long, value_name = "FILE")]
    bdem: PathBuf,

    /// Glacier model pixel to VIC cell map
    #[arg(long, value_name = "FILE")]
    pixel_map: PathBuf,

    /// Initial glacier mask (GSA format)
    #[arg(long, value_name = "FILE")]
    glacier_mask: PathBuf,

    /// Keep mass balance grids and write glacier masks for every iteration
    #[arg(long)]
    trace_files: bool,

    /// One-line file of 6 root zone values for new bare soil sub-areas
    /// (default: 0.10 1.00 0.10 0.00 0.10 0.00)
    #[arg(long, value_name = "FILE")]
    bare_soil_root: Option<PathBuf>,

    /// One-line file of 6 root zone values for new glacier sub-areas
    /// (default: 0.10 1.00 0.10 0.00 0.10 0.00)
    #[arg(long, value_name = "FILE")]
    glacier_root: Option<PathBuf>,

    /// Elevation band height in metres
    #[arg(long, default_value_t = 100)]
    band_size: u32,

    /// VIC executable
    #[arg(long, default_value = "vicNl")]
    vic_path: PathBuf,

    /// Regional Glacier Model executable
    #[arg(long, default_value = "rgm")]
    rgm_path: PathBuf,

    /// Directory for per-iteration files (default: system temp dir)
    #[arg(long)]
    temp_dir: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> ConductorConfig {
        let mut config = ConductorConfig::new(
            self.vic_global_file,
            self.rgm_params,
            self.sdem,
            self.bdem,
            self.pixel_map,
            self.glacier_mask,
        )
        .with_trace_files(self.trace_files)
        .with_band_size(f64::from(self.band_size))
        .with_executables(self.vic_path, self.rgm_path);
        if let Some(path) = self.bare_soil_root {
            config = config.with_bare_soil_root(path);
        }
        if let Some(path) = self.glacier_root {
            config = config.with_glacier_root(path);
        }
        if let Some(dir) = self.temp_dir {
            config = config.with_temp_dir(dir);
        }
        config
    }
}

fn run(config: ConductorConfig) -> Result<(), ConductorError> {
    let models = ProcessModels::new(&config.vic_path, &config.rgm_path);
    let mut conductor = Conductor::initialize(config, models)?;
    conductor.run()?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_config();
    info!(global_file = %config.vic_global_file.display(), "VIC + RGM conductor starting");

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
