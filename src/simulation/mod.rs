//! Coupled VIC / glacier model runs.
//!
//! This module ties together:
//! - Run ranges (spin-up, then one glacier water year per iteration)
//! - The external model seam ([`ExternalModels`]) and its process-backed
//!   implementation
//! - The [`Conductor`], which loads inputs, runs each iteration and rewrites
//!   the band parameter files
//!
//! # Example
//! ```ignore
//! use hydro_conductor::simulation::{Conductor, ConductorConfig, ProcessModels};
//!
//! let config = ConductorConfig::new("global.txt", "rgm.params", "sdem.gsa", "bdem.gsa",
//!     "pixel_map.txt", "mask.gsa")
//!     .with_temp_dir("/scratch/conductor");
//! let models = ProcessModels::new(&config.vic_path, &config.rgm_path);
//!
//! let mut conductor = Conductor::initialize(config, models)?;
//! let reports = conductor.run()?;
//! ```

mod config;
mod models;
mod run_ranges;
mod runner;

pub use config::{ConductorConfig, DEFAULT_BAND_SIZE};
pub use models::{ExternalModels, ModelError, ProcessModels, RgmInvocation, RGM_SURFACE_DEM_OUTPUT};
pub use run_ranges::{RunRange, RunRanges};
pub use runner::{Conductor, ConductorError, IterationReport};
