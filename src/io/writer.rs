// src/io/writer.rs
use std::path::Path;

use gdal::raster::RasterCreationOptions;
use gdal::{DriverManager, Metadata};
use tracing::info;

use super::reader::{BandArray, GeoInfo};
use crate::config::WriteOptions;
use crate::error::{AlbedoError, Result};

/// Writes `array` as a single-band Float32 GeoTIFF on the grid of `geo_info`.
pub fn write_raster(
    array: &BandArray,
    geo_info: &GeoInfo,
    output_path: &Path,
    options: &WriteOptions,
    description: &str,
) -> Result<()> {
    if array.shape() != geo_info.shape() {
        return Err(AlbedoError::ShapeMismatch {
            what: format!("output raster {}", output_path.display()),
            expected: geo_info.shape(),
            actual: array.shape(),
        });
    }

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let creation_options = RasterCreationOptions::from_iter(options.creation_options());

    let mut out_ds = driver.create_with_band_type_with_options::<f32, _>(
        output_path,
        geo_info.width,
        geo_info.height,
        1,
        &creation_options,
    )?;

    out_ds.set_projection(&geo_info.projection)?;
    out_ds.set_geo_transform(&geo_info.geo_transform)?;

    let mut band = out_ds.rasterband(1)?;
    band.set_description(description)?;

    let mut buffer = BandArray::new(array.shape(), array.data().to_vec());
    band.write((0, 0), array.shape(), &mut buffer)?;

    out_ds.flush_cache()?;

    info!(
        "Wrote {}x{} raster to {}",
        geo_info.width,
        geo_info.height,
        output_path.display()
    );
    Ok(())
}
