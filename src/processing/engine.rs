// src/processing/engine.rs
use std::path::Path;

use tracing::{debug, info};

use super::formula::{
    clip_to_unit, correct_for_elevation, linear_combination, subtract_offset, Formula, PostStep,
};
use crate::config::{AlbedoSettings, WriteOptions};
use crate::error::{AlbedoError, Result};
use crate::io::{read_geo_info, write_raster, BandArray, ElevationResampler, GdalElevationResampler};
use crate::retrieval::{correction_for_band, ReflectanceProvider, ReflectanceRequest};
use crate::scene::{Scene, ALBEDO_BANDS};

/// Computes broadband albedo for one scene.
///
/// Bands are fetched one after another on every call; nothing is cached
/// between calls.
pub struct AlbedoEngine<P, R = GdalElevationResampler> {
    scene: Scene,
    settings: AlbedoSettings,
    provider: P,
    resampler: R,
}

impl<P: ReflectanceProvider> AlbedoEngine<P> {
    pub fn new(scene: Scene, settings: AlbedoSettings, provider: P) -> Self {
        Self::with_resampler(scene, settings, provider, GdalElevationResampler)
    }

    /// Reads the scene descriptor and builds an engine over it.
    pub fn open(metadata_file: &Path, settings: AlbedoSettings, provider: P) -> Result<Self> {
        let scene = Scene::open(metadata_file)?;
        Ok(Self::new(scene, settings, provider))
    }
}

impl<P: ReflectanceProvider, R: ElevationResampler> AlbedoEngine<P, R> {
    pub fn with_resampler(
        scene: Scene,
        settings: AlbedoSettings,
        provider: P,
        resampler: R,
    ) -> Self {
        Self {
            scene,
            settings,
            provider,
            resampler,
        }
    }

    pub fn compute_albedo(&self) -> Result<BandArray> {
        let formula = Formula::lookup(self.settings.albedo_method())?;

        let bands = self.retrieve_bands()?;

        info!(
            "Coefficients for {}: {:?}",
            formula.method, formula.coefficients
        );
        let mut albedo = linear_combination(&bands, &formula.coefficients)?;
        drop(bands);

        match formula.post_step {
            PostStep::None => {}
            PostStep::Subtract(offset) => {
                info!("{} correction: -{}", formula.method, offset);
                subtract_offset(&mut albedo, offset);
            }
            PostStep::ElevationCorrection { path_radiance } => {
                let elevation = self.scene_elevation()?;
                info!("Applying elevation-dependent transmissivity correction");
                correct_for_elevation(&mut albedo, &elevation, path_radiance)?;
            }
        }

        clip_to_unit(&mut albedo);
        Ok(albedo)
    }

    /// Computes the albedo and writes it on the reference band's grid.
    pub fn save_as_raster(&self, output_path: &Path, options: &WriteOptions) -> Result<()> {
        let albedo = self.compute_albedo()?;
        let grid = read_geo_info(&self.scene.reference_band_path()?)?;

        let description = format!(
            "albedo ({}, {})",
            self.settings.albedo_method(),
            self.settings.correction_method()
        );
        write_raster(&albedo, &grid, output_path, options, &description)
    }

    fn retrieve_bands(&self) -> Result<Vec<BandArray>> {
        let method = self.settings.correction_method();
        info!(
            "Obtaining bands 2-7 reflectance. Current correction method: {}",
            method
        );

        let mut bands: Vec<BandArray> = Vec::with_capacity(ALBEDO_BANDS.len());
        for band in ALBEDO_BANDS {
            let correction = correction_for_band(method, band);
            info!("Processing band {} ({})", band, correction);

            let request = ReflectanceRequest::new(correction, &self.scene, band, &self.settings)?;
            let reflectance = self.provider.reflectance(&self.scene, band, &request)?;

            if let Some(first) = bands.first() {
                if first.shape() != reflectance.shape() {
                    return Err(AlbedoError::ShapeMismatch {
                        what: format!("band {} reflectance", band),
                        expected: first.shape(),
                        actual: reflectance.shape(),
                    });
                }
            }
            debug!("Band {} grid {:?}", band, reflectance.shape());
            bands.push(reflectance);
        }

        Ok(bands)
    }

    fn scene_elevation(&self) -> Result<BandArray> {
        let dem = self
            .settings
            .dem_file
            .as_deref()
            .ok_or_else(|| AlbedoError::MissingInput {
                input: "dem_file",
                context: format!("{} albedo", self.settings.albedo_method()),
            })?;

        let grid = read_geo_info(&self.scene.reference_band_path()?)?;
        self.resampler.resample(dem, &grid)
    }
}
