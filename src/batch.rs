// src/batch.rs
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::config::{AlbedoSettings, WriteOptions};
use crate::processing::AlbedoEngine;
use crate::retrieval::{ExternalToolProvider, ToolSet};

#[derive(Deserialize, Debug)]
pub struct BatchConfig {
    #[serde(default)]
    pub global: GlobalParams,
    pub scenes: Vec<SceneJob>,
}

#[derive(Deserialize, Debug, Default)]
pub struct GlobalParams {
    #[serde(flatten)]
    pub write: WriteOptions,
    /// Scratch directory for every scene, overriding the system temp dir.
    pub temp_dir: Option<PathBuf>,
    /// Inline tool commands.
    pub tools: Option<ToolSet>,
    /// Tool commands file, takes precedence over `tools`.
    pub tools_file: Option<PathBuf>,
}

#[derive(Deserialize, Debug)]
pub struct SceneJob {
    pub metadata: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub settings: AlbedoSettings,
    /// Scratch directory for this scene, overriding the global one.
    pub temp_dir: Option<PathBuf>,
    pub compress: Option<String>,
    pub compress_level: Option<u8>,
    pub tiled: Option<bool>,
}

impl SceneJob {
    /// Global write options with this scene's overrides applied.
    pub fn write_options(&self, global: &WriteOptions) -> WriteOptions {
        WriteOptions {
            compress: self.compress.clone().unwrap_or_else(|| global.compress.clone()),
            compress_level: self.compress_level.unwrap_or(global.compress_level),
            tiled: self.tiled.unwrap_or(global.tiled),
        }
    }

    /// Scene settings with the scratch directory resolved as scene, then
    /// global, then the system temp dir.
    pub fn resolved_settings(&self, global: &GlobalParams) -> AlbedoSettings {
        let mut settings = self.settings.clone();
        if let Some(temp_dir) = self.temp_dir.as_ref().or(global.temp_dir.as_ref()) {
            settings.temp_dir = temp_dir.clone();
        }
        settings
    }
}

impl BatchConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read batch file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("invalid batch file {}", path.display()))?;
        Ok(config)
    }

    pub fn tool_set(&self) -> Result<ToolSet> {
        match &self.global.tools_file {
            Some(path) => ToolSet::from_file(path)
                .with_context(|| format!("cannot load tools file {}", path.display())),
            None => Ok(self.global.tools.clone().unwrap_or_default()),
        }
    }
}

pub fn process_batch(config_path: &Path) -> Result<()> {
    let config = BatchConfig::from_file(config_path)?;
    let tools = config.tool_set()?;

    info!("Starting batch processing with {} scenes...", config.scenes.len());

    for (i, job) in config.scenes.iter().enumerate() {
        info!(
            "[{}/{}] {} -> {}",
            i + 1,
            config.scenes.len(),
            job.metadata.display(),
            job.output.display()
        );

        let settings = job.resolved_settings(&config.global);
        let provider = ExternalToolProvider::new(tools.clone(), settings.temp_dir.clone());
        let options = job.write_options(&config.global.write);

        AlbedoEngine::open(&job.metadata, settings, provider)
            .and_then(|engine| engine.save_as_raster(&job.output, &options))
            .with_context(|| {
                format!(
                    "scene {}/{} ({}) failed",
                    i + 1,
                    config.scenes.len(),
                    job.metadata.display()
                )
            })?;
    }

    info!("Batch processing complete!");
    Ok(())
}
