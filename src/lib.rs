// src/lib.rs
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod processing;
pub mod retrieval;
pub mod scene;

pub use config::{AlbedoMethod, AlbedoSettings, CorrectionMethod, WriteOptions};
pub use error::{AlbedoError, Result};
pub use processing::AlbedoEngine;
pub use scene::Scene;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
