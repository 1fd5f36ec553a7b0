#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::DriverManager;

use landsat_albedo::io::{BandArray, ElevationResampler, GeoInfo};
use landsat_albedo::retrieval::{Correction, ReflectanceProvider, ReflectanceRequest};
use landsat_albedo::{Result, Scene};

pub const GEO_TRANSFORM: [f64; 6] = [500_000.0, 30.0, 0.0, 6_600_000.0, 0.0, -30.0];

/// Helper function to create a band grid from a repeating value pattern
pub fn band_array(width: usize, height: usize, values: &[f32]) -> BandArray {
    let data = (0..width * height).map(|i| values[i % values.len()]).collect();
    Buffer::new((width, height), data)
}

/// Scene listing bands 2-7 under `dir`, all pointing at `file_name`.
pub fn scene_in(dir: &Path, file_name: &str) -> Scene {
    let bands: BTreeMap<u8, String> = (2..=7).map(|band| (band, file_name.to_string())).collect();
    Scene::new(dir.join("LC08_TEST_MTL.txt"), bands)
}

/// Scene whose files do not exist, for runs that never touch the disk.
pub fn synthetic_scene() -> Scene {
    scene_in(Path::new("/nonexistent/scene"), "B.TIF")
}

pub fn write_mtl(dir: &Path, file_name: &str) -> PathBuf {
    let mut text = String::from("GROUP = L1_METADATA_FILE\n  GROUP = PRODUCT_METADATA\n");
    for band in 1..=7 {
        text.push_str(&format!("    FILE_NAME_BAND_{} = \"{}\"\n", band, file_name));
    }
    text.push_str("  END_GROUP = PRODUCT_METADATA\nEND_GROUP = L1_METADATA_FILE\nEND\n");

    let path = dir.join("LC08_TEST_MTL.txt");
    fs::write(&path, text).unwrap();
    path
}

/// Writes a single-band Float32 GeoTIFF in UTM 35N.
pub fn write_geotiff(path: &Path, geo_transform: [f64; 6], array: &BandArray) {
    let (width, height) = array.shape();
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut dataset = driver
        .create_with_band_type::<f32, _>(path, width, height, 1)
        .unwrap();
    dataset
        .set_spatial_ref(&SpatialRef::from_epsg(32635).unwrap())
        .unwrap();
    dataset.set_geo_transform(&geo_transform).unwrap();

    let mut band = dataset.rasterband(1).unwrap();
    let mut buffer = Buffer::new((width, height), array.data().to_vec());
    band.write((0, 0), (width, height), &mut buffer).unwrap();
}

/// Provider returning a constant grid per band and recording every request.
pub struct StubProvider {
    pub shape: (usize, usize),
    pub values: BTreeMap<u8, Vec<f32>>,
    pub calls: RefCell<Vec<(u8, Correction)>>,
    pub requests: RefCell<Vec<ReflectanceRequest>>,
}

impl StubProvider {
    pub fn uniform(shape: (usize, usize), value: f32) -> Self {
        Self::per_band(shape, (2..=7).map(|band| (band, vec![value])).collect())
    }

    pub fn per_band(shape: (usize, usize), values: BTreeMap<u8, Vec<f32>>) -> Self {
        Self {
            shape,
            values,
            calls: RefCell::new(Vec::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(u8, Correction)> {
        self.calls.borrow().clone()
    }
}

impl ReflectanceProvider for StubProvider {
    fn reflectance(
        &self,
        _scene: &Scene,
        band: u8,
        request: &ReflectanceRequest,
    ) -> Result<BandArray> {
        self.calls.borrow_mut().push((band, request.correction()));
        self.requests.borrow_mut().push(request.clone());
        Ok(band_array(self.shape.0, self.shape.1, &self.values[&band]))
    }
}

/// Resampler returning a constant elevation on whatever grid it is given.
pub struct ConstantElevation {
    pub elevation: f32,
    pub grids: RefCell<Vec<GeoInfo>>,
}

impl ConstantElevation {
    pub fn new(elevation: f32) -> Self {
        Self {
            elevation,
            grids: RefCell::new(Vec::new()),
        }
    }
}

impl ElevationResampler for ConstantElevation {
    fn resample(&self, _dem: &Path, grid: &GeoInfo) -> Result<BandArray> {
        self.grids.borrow_mut().push(grid.clone());
        Ok(band_array(grid.width, grid.height, &[self.elevation]))
    }
}
