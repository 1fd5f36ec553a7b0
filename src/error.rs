// src/error.rs
use thiserror::Error;

/// Errors raised while configuring or computing an albedo raster.
#[derive(Error, Debug)]
pub enum AlbedoError {
    /// Unknown albedo/correction method or an invalid configuration entry.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The scene descriptor could not be read or lacks a band entry.
    #[error("metadata error: {0}")]
    Metadata(String),

    /// An optional input is required by the active method combination but was not given.
    #[error("missing input `{input}` required by {context}")]
    MissingInput { input: &'static str, context: String },

    /// An external collaborator could not be started or exited unsuccessfully.
    #[error("external tool `{program}` failed: {reason}")]
    Tool { program: String, reason: String },

    #[error("grid shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error(transparent)]
    Gdal(#[from] gdal::errors::GdalError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AlbedoError>;
