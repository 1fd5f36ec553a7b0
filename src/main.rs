// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use landsat_albedo::batch::process_batch;
use landsat_albedo::cli::{Cli, Commands};
use landsat_albedo::processing::FORMULAS;
use landsat_albedo::retrieval::{ExternalToolProvider, ToolSet};
use landsat_albedo::{AlbedoEngine, AlbedoSettings, WriteOptions};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Compute {
            metadata,
            output,
            method,
            correction,
            dem,
            angles,
            angle_utility,
            shell,
            temp_dir,
            tools,
            compress,
            compress_level,
            no_tiled,
        } => {
            let mut settings = AlbedoSettings::new(method, correction);
            settings.dem_file = dem;
            settings.angles_file = angles;
            settings.usgs_utils = angle_utility;
            settings.cygwin_bash_exe_path = shell;
            if let Some(temp_dir) = temp_dir {
                settings.temp_dir = temp_dir;
            }

            let tools = match tools {
                Some(path) => ToolSet::from_file(&path)
                    .with_context(|| format!("cannot load tools file {}", path.display()))?,
                None => ToolSet::default(),
            };
            let provider = ExternalToolProvider::new(tools, settings.temp_dir.clone());

            let options = WriteOptions {
                compress,
                compress_level,
                tiled: !no_tiled,
            };

            let engine = AlbedoEngine::open(&metadata, settings, provider)?;
            engine.save_as_raster(&output, &options)?;

            info!("Processing complete: {}", output.display());
        }
        Commands::Batch { config } => {
            process_batch(&config)?;
        }
        Commands::Formulas => {
            println!(
                "{:<8} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}  post",
                "method", "b2", "b3", "b4", "b5", "b6", "b7"
            );
            for formula in FORMULAS.iter() {
                let weights: Vec<String> = formula
                    .coefficients
                    .iter()
                    .map(|c| format!("{:>6.3}", c))
                    .collect();
                println!(
                    "{:<8} {}  {:?}",
                    formula.method,
                    weights.join(" "),
                    formula.post_step
                );
            }
        }
    }

    Ok(())
}
