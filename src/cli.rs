// src/cli.rs
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{AlbedoMethod, CorrectionMethod};

#[derive(Parser)]
#[command(name = "landsat-albedo")]
#[command(about = "Broadband surface albedo from Landsat 8 OLI bands 2-7")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the albedo of one scene and write it as GeoTIFF
    Compute {
        /// Scene metadata file (MTL)
        #[arg(short, long)]
        metadata: PathBuf,

        /// Output file path
        #[arg(short, long, default_value = "albedo.tif")]
        output: PathBuf,

        /// Albedo formula
        #[arg(long, value_enum, default_value_t = AlbedoMethod::Olmedo)]
        method: AlbedoMethod,

        /// Reflectance correction (forced to raw for beg)
        #[arg(long, value_enum, default_value_t = CorrectionMethod::Raw)]
        correction: CorrectionMethod,

        /// Elevation model, required by beg
        #[arg(long)]
        dem: Option<PathBuf>,

        /// Solar/view angles file (ANG), required by srem and mixed_v1
        #[arg(long)]
        angles: Option<PathBuf>,

        /// Angle generation utility, required by srem and mixed_v1
        #[arg(long)]
        angle_utility: Option<PathBuf>,

        /// Shell interpreter hosting the angle utility
        #[arg(long)]
        shell: Option<PathBuf>,

        /// Scratch directory for external tools (default: system temp dir)
        #[arg(long)]
        temp_dir: Option<PathBuf>,

        /// JSON file with the raw/dos/srem tool commands
        #[arg(long)]
        tools: Option<PathBuf>,

        /// Compression: DEFLATE, ZSTD, LZW or NONE
        #[arg(long, default_value = "DEFLATE")]
        compress: String,

        /// Compression level
        #[arg(long, default_value = "6")]
        compress_level: u8,

        /// Write a striped instead of a tiled GeoTIFF
        #[arg(long)]
        no_tiled: bool,
    },

    /// Process several scenes described by a JSON file
    Batch {
        /// Batch configuration file
        config: PathBuf,
    },

    /// Print the band coefficients of every formula
    Formulas,
}
