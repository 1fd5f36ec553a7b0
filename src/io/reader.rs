// src/io/reader.rs
use std::path::Path;

use gdal::raster::Buffer;
use gdal::Dataset;
use tracing::debug;

use crate::error::Result;

/// A single-band grid of reflectance (or derived) values, `(width, height)` shaped.
pub type BandArray = Buffer<f32>;

/// Pixel grid and spatial reference shared by all bands of a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoInfo {
    pub projection: String,
    pub geo_transform: [f64; 6],
    pub width: usize,
    pub height: usize,
}

impl GeoInfo {
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns `(x_min, y_min, x_max, y_max)` for a north-up grid.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let x_min = self.geo_transform[0];
        let y_max = self.geo_transform[3];
        let x_max = x_min + self.geo_transform[1] * self.width as f64;
        let y_min = y_max + self.geo_transform[5] * self.height as f64;
        (x_min, y_min, x_max, y_max)
    }

    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        let (width, height) = dataset.raster_size();
        Ok(Self {
            projection: dataset.projection(),
            geo_transform: dataset.geo_transform()?,
            width,
            height,
        })
    }
}

/// Reads the grid of a raster file without touching its pixels.
pub fn read_geo_info(path: &Path) -> Result<GeoInfo> {
    let dataset = Dataset::open(path)?;
    GeoInfo::from_dataset(&dataset)
}

/// Reads band 1 of a raster file as `f32`.
pub fn read_band(path: &Path) -> Result<BandArray> {
    let dataset = Dataset::open(path)?;
    let (width, height) = dataset.raster_size();
    let band = dataset.rasterband(1)?;
    let buffer = band.read_as::<f32>((0, 0), (width, height), (width, height), None)?;

    debug!("Read {}x{} grid from {}", width, height, path.display());
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_follow_geo_transform() {
        let info = GeoInfo {
            projection: String::new(),
            geo_transform: [500_000.0, 30.0, 0.0, 6_600_000.0, 0.0, -30.0],
            width: 100,
            height: 50,
        };

        let (x_min, y_min, x_max, y_max) = info.bounds();
        assert_eq!(x_min, 500_000.0);
        assert_eq!(x_max, 503_000.0);
        assert_eq!(y_max, 6_600_000.0);
        assert_eq!(y_min, 6_598_500.0);
        assert_eq!(info.shape(), (100, 50));
    }
}
