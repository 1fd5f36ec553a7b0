// src/scene.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AlbedoError, Result};

/// Bands combined by every albedo formula, in coefficient order.
pub const ALBEDO_BANDS: [u8; 6] = [2, 3, 4, 5, 6, 7];

/// Band whose grid and spatial reference every output inherits.
pub const REFERENCE_BAND: u8 = 2;

const BAND_FILE_KEY: &str = "FILE_NAME_BAND_";

/// A Landsat scene located by its metadata descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    metadata_file: PathBuf,
    directory: PathBuf,
    band_files: BTreeMap<u8, String>,
}

impl Scene {
    pub fn new(metadata_file: impl Into<PathBuf>, band_files: BTreeMap<u8, String>) -> Self {
        let metadata_file = metadata_file.into();
        let directory = metadata_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self {
            metadata_file,
            directory,
            band_files,
        }
    }

    /// Reads the band file names from a `KEY = "value"` descriptor (MTL).
    pub fn open(metadata_file: impl AsRef<Path>) -> Result<Self> {
        let metadata_file = metadata_file.as_ref();
        let text = fs::read_to_string(metadata_file).map_err(|e| {
            AlbedoError::Metadata(format!("cannot read {}: {}", metadata_file.display(), e))
        })?;

        let band_files = parse_band_files(&text);
        if band_files.is_empty() {
            return Err(AlbedoError::Metadata(format!(
                "no {}<n> entries in {}",
                BAND_FILE_KEY,
                metadata_file.display()
            )));
        }

        debug!(
            "Scene {} lists bands {:?}",
            metadata_file.display(),
            band_files.keys().collect::<Vec<_>>()
        );

        Ok(Self::new(metadata_file, band_files))
    }

    pub fn metadata_file(&self) -> &Path {
        &self.metadata_file
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn band_path(&self, band: u8) -> Result<PathBuf> {
        self.band_files
            .get(&band)
            .map(|name| self.directory.join(name))
            .ok_or_else(|| {
                AlbedoError::Metadata(format!(
                    "band {} is not listed in {}",
                    band,
                    self.metadata_file.display()
                ))
            })
    }

    pub fn reference_band_path(&self) -> Result<PathBuf> {
        self.band_path(REFERENCE_BAND)
    }
}

fn parse_band_files(text: &str) -> BTreeMap<u8, String> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .filter_map(|(key, value)| {
            let band = key.trim().strip_prefix(BAND_FILE_KEY)?.parse::<u8>().ok()?;
            let name = value.trim().trim_matches('"').to_string();
            Some((band, name))
        })
        .collect()
}
