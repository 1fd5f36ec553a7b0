// src/io/mod.rs
pub mod reader;
pub mod resample;
pub mod writer;

pub use reader::{read_band, read_geo_info, BandArray, GeoInfo};
pub use resample::{ElevationResampler, GdalElevationResampler};
pub use writer::write_raster;
