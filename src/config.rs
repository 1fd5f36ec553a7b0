// src/config.rs
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::{AlbedoError, Result};

/// Narrowband-to-broadband conversion formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AlbedoMethod {
    Tasumi,
    #[default]
    Olmedo,
    Liang,
    Beg,
}

impl AlbedoMethod {
    pub const ALL: [AlbedoMethod; 4] = [
        AlbedoMethod::Tasumi,
        AlbedoMethod::Olmedo,
        AlbedoMethod::Liang,
        AlbedoMethod::Beg,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AlbedoMethod::Tasumi => "tasumi",
            AlbedoMethod::Olmedo => "olmedo",
            AlbedoMethod::Liang => "liang",
            AlbedoMethod::Beg => "beg",
        }
    }

    /// Beg operates on top-of-atmosphere reflectance and corrects for the
    /// atmosphere itself using elevation.
    pub fn uses_toa_reflectance(&self) -> bool {
        matches!(self, AlbedoMethod::Beg)
    }
}

impl fmt::Display for AlbedoMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for AlbedoMethod {
    type Err = AlbedoError;

    fn from_str(s: &str) -> Result<Self> {
        AlbedoMethod::ALL
            .into_iter()
            .find(|method| method.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                AlbedoError::Configuration(format!(
                    "unsupported albedo method `{s}`. Supported: tasumi, olmedo, liang, beg"
                ))
            })
    }
}

/// How band reflectance is derived before the formula is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionMethod {
    #[default]
    Raw,
    Dos,
    Srem,
    #[serde(rename = "mixed_v1")]
    #[value(name = "mixed_v1")]
    MixedV1,
}

impl CorrectionMethod {
    pub const ALL: [CorrectionMethod; 4] = [
        CorrectionMethod::Raw,
        CorrectionMethod::Dos,
        CorrectionMethod::Srem,
        CorrectionMethod::MixedV1,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CorrectionMethod::Raw => "raw",
            CorrectionMethod::Dos => "dos",
            CorrectionMethod::Srem => "srem",
            CorrectionMethod::MixedV1 => "mixed_v1",
        }
    }
}

impl fmt::Display for CorrectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for CorrectionMethod {
    type Err = AlbedoError;

    fn from_str(s: &str) -> Result<Self> {
        CorrectionMethod::ALL
            .into_iter()
            .find(|method| method.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                AlbedoError::Configuration(format!(
                    "unsupported correction method `{s}`. Supported: raw, dos, srem, mixed_v1"
                ))
            })
    }
}

/// Construction-time configuration of an albedo computation.
///
/// The method pair is only reachable through the constructors, which apply
/// the `beg` -> `raw` override. The optional inputs are checked lazily, by
/// whichever collaborator needs them.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbedoSettings {
    albedo_method: AlbedoMethod,
    correction_method: CorrectionMethod,
    /// Terrain elevation raster, needed by `beg`.
    pub dem_file: Option<PathBuf>,
    /// Solar/view angles file of the scene, needed by `srem` and `mixed_v1`.
    pub angles_file: Option<PathBuf>,
    /// Angle generation utility, needed by `srem` and `mixed_v1`.
    pub usgs_utils: Option<PathBuf>,
    /// Shell interpreter hosting the angle utility on some platforms.
    pub cygwin_bash_exe_path: Option<PathBuf>,
    /// Scratch directory handed to external collaborators.
    pub temp_dir: PathBuf,
}

impl AlbedoSettings {
    pub fn new(albedo_method: AlbedoMethod, correction_method: CorrectionMethod) -> Self {
        let correction_method = if albedo_method.uses_toa_reflectance() {
            if correction_method != CorrectionMethod::Raw {
                warn!(
                    "{} works on TOA reflectance, correction `{}` replaced by `raw`",
                    albedo_method, correction_method
                );
            }
            CorrectionMethod::Raw
        } else {
            correction_method
        };

        Self {
            albedo_method,
            correction_method,
            dem_file: None,
            angles_file: None,
            usgs_utils: None,
            cygwin_bash_exe_path: None,
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Parses both method names, failing before any I/O on unknown values.
    pub fn from_names(albedo_method: &str, correction_method: &str) -> Result<Self> {
        let albedo_method = albedo_method.parse::<AlbedoMethod>()?;
        let correction_method = correction_method.parse::<CorrectionMethod>()?;
        Ok(Self::new(albedo_method, correction_method))
    }

    pub fn albedo_method(&self) -> AlbedoMethod {
        self.albedo_method
    }

    pub fn correction_method(&self) -> CorrectionMethod {
        self.correction_method
    }

    pub fn with_dem_file(mut self, dem_file: impl Into<PathBuf>) -> Self {
        self.dem_file = Some(dem_file.into());
        self
    }

    pub fn with_angles_file(mut self, angles_file: impl Into<PathBuf>) -> Self {
        self.angles_file = Some(angles_file.into());
        self
    }

    pub fn with_usgs_utils(mut self, usgs_utils: impl Into<PathBuf>) -> Self {
        self.usgs_utils = Some(usgs_utils.into());
        self
    }

    pub fn with_shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.cygwin_bash_exe_path = Some(shell.into());
        self
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }
}

impl Default for AlbedoSettings {
    fn default() -> Self {
        Self::new(AlbedoMethod::default(), CorrectionMethod::default())
    }
}

// Method names go through `from_names` so unknown values report the same
// configuration error as the CLI, and the beg override is applied.
impl<'de> Deserialize<'de> for AlbedoSettings {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct SettingsHelper {
            albedo_method: Option<String>,
            correction_method: Option<String>,
            dem_file: Option<PathBuf>,
            angles_file: Option<PathBuf>,
            usgs_utils: Option<PathBuf>,
            cygwin_bash_exe_path: Option<PathBuf>,
            temp_dir: Option<PathBuf>,
        }

        let helper = SettingsHelper::deserialize(deserializer)?;

        let mut settings = AlbedoSettings::from_names(
            helper.albedo_method.as_deref().unwrap_or("olmedo"),
            helper.correction_method.as_deref().unwrap_or("raw"),
        )
        .map_err(D::Error::custom)?;

        settings.dem_file = helper.dem_file;
        settings.angles_file = helper.angles_file;
        settings.usgs_utils = helper.usgs_utils;
        settings.cygwin_bash_exe_path = helper.cygwin_bash_exe_path;
        if let Some(temp_dir) = helper.temp_dir {
            settings.temp_dir = temp_dir;
        }

        Ok(settings)
    }
}

/// GeoTIFF creation parameters for the albedo raster.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct WriteOptions {
    #[serde(default = "default_compress")]
    pub compress: String,
    #[serde(default = "default_compress_level")]
    pub compress_level: u8,
    #[serde(default = "default_true")]
    pub tiled: bool,
}

fn default_compress() -> String {
    "DEFLATE".to_string()
}

fn default_compress_level() -> u8 {
    6
}

fn default_true() -> bool {
    true
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compress: default_compress(),
            compress_level: default_compress_level(),
            tiled: true,
        }
    }
}

impl WriteOptions {
    pub fn creation_options(&self) -> Vec<String> {
        let mut options = Vec::new();
        let compress = self.compress.to_uppercase();

        if compress != "NONE" {
            options.push(format!("COMPRESS={compress}"));

            match compress.as_str() {
                "DEFLATE" => options.push(format!("ZLEVEL={}", self.compress_level.min(9))),
                "ZSTD" => options.push(format!("ZSTD_LEVEL={}", self.compress_level.min(22))),
                _ => {}
            }
        }

        if self.tiled {
            options.push("TILED=YES".to_string());
        }

        options
    }
}
