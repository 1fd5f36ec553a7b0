// src/retrieval/mod.rs
//! Per-band reflectance retrieval.
//!
//! The albedo engine never computes reflectance itself. It decides which
//! correction each band needs and asks a [`ReflectanceProvider`] for the
//! resulting grid.

pub mod external;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{AlbedoSettings, CorrectionMethod};
use crate::error::{AlbedoError, Result};
use crate::io::BandArray;
use crate::scene::Scene;

pub use external::{ExternalToolProvider, ToolCommand, ToolSet};

/// Correction applied to a single band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Correction {
    /// Calibrated top-of-atmosphere reflectance.
    Raw,
    /// Dark object subtraction.
    Dos,
    /// SREM surface reflectance.
    Srem,
}

impl Correction {
    pub fn name(&self) -> &'static str {
        match self {
            Correction::Raw => "raw",
            Correction::Dos => "dos",
            Correction::Srem => "srem",
        }
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Resolves the correction a strategy applies to `band`.
///
/// `mixed_v1` is an empirically tuned per-band mix: DOS for blue, SREM for
/// green/red/NIR, raw for SWIR.
pub fn correction_for_band(method: CorrectionMethod, band: u8) -> Correction {
    match method {
        CorrectionMethod::Raw => Correction::Raw,
        CorrectionMethod::Dos => Correction::Dos,
        CorrectionMethod::Srem => Correction::Srem,
        CorrectionMethod::MixedV1 => match band {
            2 => Correction::Dos,
            3..=5 => Correction::Srem,
            _ => Correction::Raw,
        },
    }
}

/// Inputs handed to the SREM collaborator for one band.
#[derive(Debug, Clone, PartialEq)]
pub struct SremOptions {
    /// Band raster to correct.
    pub band: PathBuf,
    /// Scene metadata descriptor.
    pub metadata: PathBuf,
    /// Solar/view angles file. Required, but checked by the collaborator.
    pub angles_file: Option<PathBuf>,
    /// Executable generating per-pixel angle rasters. Required, checked lazily.
    pub angle_utility: Option<PathBuf>,
    /// Scratch directory for generated angle rasters.
    pub temp_dir: PathBuf,
    /// Interpreter hosting the angle utility, only on platforms that need one.
    pub shell: Option<PathBuf>,
}

impl SremOptions {
    pub fn new(scene: &Scene, band: u8, settings: &AlbedoSettings) -> Result<Self> {
        Ok(Self {
            band: scene.band_path(band)?,
            metadata: scene.metadata_file().to_path_buf(),
            angles_file: settings.angles_file.clone(),
            angle_utility: settings.usgs_utils.clone(),
            temp_dir: settings.temp_dir.clone(),
            shell: settings.cygwin_bash_exe_path.clone(),
        })
    }

    /// Returns the angles file and angle utility, which SREM cannot run without.
    pub fn require_angles(&self) -> Result<(&Path, &Path)> {
        let context = || format!("SREM correction of {}", self.band.display());

        let angles_file = self
            .angles_file
            .as_deref()
            .ok_or_else(|| AlbedoError::MissingInput {
                input: "angles_file",
                context: context(),
            })?;
        let angle_utility = self
            .angle_utility
            .as_deref()
            .ok_or_else(|| AlbedoError::MissingInput {
                input: "usgs_utils",
                context: context(),
            })?;

        Ok((angles_file, angle_utility))
    }
}

/// A reflectance request for one band.
#[derive(Debug, Clone, PartialEq)]
pub enum ReflectanceRequest {
    Raw,
    Dos,
    Srem(SremOptions),
}

impl ReflectanceRequest {
    pub fn new(
        correction: Correction,
        scene: &Scene,
        band: u8,
        settings: &AlbedoSettings,
    ) -> Result<Self> {
        Ok(match correction {
            Correction::Raw => ReflectanceRequest::Raw,
            Correction::Dos => ReflectanceRequest::Dos,
            Correction::Srem => ReflectanceRequest::Srem(SremOptions::new(scene, band, settings)?),
        })
    }

    pub fn correction(&self) -> Correction {
        match self {
            ReflectanceRequest::Raw => Correction::Raw,
            ReflectanceRequest::Dos => Correction::Dos,
            ReflectanceRequest::Srem(_) => Correction::Srem,
        }
    }
}

/// Source of per-band reflectance grids.
///
/// Every grid returned for a scene must share the reference band's shape.
pub trait ReflectanceProvider {
    fn reflectance(&self, scene: &Scene, band: u8, request: &ReflectanceRequest)
        -> Result<BandArray>;
}

impl<T: ReflectanceProvider + ?Sized> ReflectanceProvider for &T {
    fn reflectance(
        &self,
        scene: &Scene,
        band: u8,
        request: &ReflectanceRequest,
    ) -> Result<BandArray> {
        (**self).reflectance(scene, band, request)
    }
}
