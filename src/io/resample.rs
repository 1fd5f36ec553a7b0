// src/io/resample.rs
use std::path::Path;

use gdal::raster::reproject;
use gdal::{Dataset, DriverManager};
use tracing::info;

use super::reader::{BandArray, GeoInfo};
use crate::error::Result;

/// Brings an elevation model onto a scene grid.
pub trait ElevationResampler {
    /// Returns elevation values aligned pixel-for-pixel with `grid`.
    fn resample(&self, dem: &Path, grid: &GeoInfo) -> Result<BandArray>;
}

impl<T: ElevationResampler + ?Sized> ElevationResampler for &T {
    fn resample(&self, dem: &Path, grid: &GeoInfo) -> Result<BandArray> {
        (**self).resample(dem, grid)
    }
}

/// Reprojects with GDAL into an in-memory dataset carrying the target grid.
///
/// GDAL's `reproject` warps bilinearly; pixels outside the DEM footprint stay 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct GdalElevationResampler;

impl ElevationResampler for GdalElevationResampler {
    fn resample(&self, dem: &Path, grid: &GeoInfo) -> Result<BandArray> {
        info!(
            "Resampling DEM {} onto {}x{} scene grid, bounds {:?}",
            dem.display(),
            grid.width,
            grid.height,
            grid.bounds()
        );

        let source = Dataset::open(dem)?;

        let driver = DriverManager::get_driver_by_name("MEM")?;
        let mut target = driver.create_with_band_type::<f32, _>("", grid.width, grid.height, 1)?;
        target.set_projection(&grid.projection)?;
        target.set_geo_transform(&grid.geo_transform)?;

        reproject(&source, &target)?;

        let band = target.rasterband(1)?;
        let elevation = band.read_as::<f32>(
            (0, 0),
            (grid.width, grid.height),
            (grid.width, grid.height),
            None,
        )?;
        Ok(elevation)
    }
}
