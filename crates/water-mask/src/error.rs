//! Error types for water mask classification.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while building or querying a water mask.
#[derive(Error, Debug)]
pub enum MaskError {
    /// Invalid engine configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to open a raster dataset.
    #[error("failed to open raster {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    /// The raster has no usable geotransform.
    #[error("raster {path} has no geotransform")]
    MissingGeoTransform { path: PathBuf },

    /// A coordinate transform could not be built for the requested CRS pair.
    #[error("cannot build transform from EPSG:{code}: {reason}")]
    InvalidCrs { code: u32, reason: String },

    /// Longitude and latitude input arrays differ in length.
    #[error("longitude and latitude arrays differ in length: {lons} vs {lats}")]
    LengthMismatch { lons: usize, lats: usize },

    /// Transforming a query point into the raster's projection failed.
    #[error("coordinate transform failed: {0}")]
    Transform(String),

    /// The requested tile lies outside the raster's pixel extent.
    #[error("requested tile {requested} is outside raster bounds {raster}")]
    TileOutOfBounds { requested: String, raster: String },

    /// Reading a pixel window from the raster failed.
    #[error("failed to read raster window: {0}")]
    ReadFailed(String),
}

impl MaskError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an OpenFailed error.
    pub fn open_failed(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::OpenFailed {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidCrs error.
    pub fn invalid_crs(code: u32, reason: impl Into<String>) -> Self {
        Self::InvalidCrs {
            code,
            reason: reason.into(),
        }
    }

    /// Create a Transform error.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Create a TileOutOfBounds error.
    pub fn tile_out_of_bounds(
        requested: impl Into<String>,
        raster: impl Into<String>,
    ) -> Self {
        Self::TileOutOfBounds {
            requested: requested.into(),
            raster: raster.into(),
        }
    }

    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }
}

/// Result type for water mask operations.
pub type Result<T> = std::result::Result<T, MaskError>;
