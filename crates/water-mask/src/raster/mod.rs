//! Raster source and coordinate transform collaborator interfaces.
//!
//! The engine is generic over how raster bytes are read and how query
//! coordinates are projected; backends implement these two traits.

use std::path::Path;

use crate::error::Result;
use crate::geotransform::GeoTransform;

pub mod memory;

#[cfg(feature = "gdal")]
pub mod gdal;

/// A read-only raster dataset backend.
///
/// Implementations must be `Send`: a dataset handle is shared across worker
/// threads behind a mutex that serializes all physical reads.
pub trait RasterSource: Send + Sized {
    /// The coordinate transformer type built for this backend.
    ///
    /// Transformers are constructed per worker from the dataset's native
    /// CRS description and never cross threads, so no `Send` bound.
    type Transform: CrsTransform;

    /// Perform process-wide backend initialization.
    ///
    /// Called before any dataset is opened; must be idempotent.
    fn initialize();

    /// Open a raster dataset.
    ///
    /// Fails if the file cannot be opened or lacks a valid geotransform.
    fn open(path: &Path) -> Result<Self>;

    /// The raster's affine geotransform.
    fn geo_transform(&self) -> Result<GeoTransform>;

    /// Raster dimensions in pixels: `(width, height)`.
    fn dimensions(&self) -> (usize, usize);

    /// Description of the raster's native CRS, consumed by
    /// [`transform_to_native`](Self::transform_to_native).
    fn native_crs(&self) -> String;

    /// Read a `width x height` window of band 1 as row-major bytes.
    ///
    /// The window must lie entirely inside the raster; callers clip
    /// before reading. Returns exactly `width * height` bytes.
    fn read_window(
        &mut self,
        x_offset: usize,
        y_offset: usize,
        width: usize,
        height: usize,
    ) -> Result<Vec<u8>>;

    /// Build a transformer from the query CRS into the raster's native
    /// projection.
    fn transform_to_native(source_epsg: u32, native_crs: &str) -> Result<Self::Transform>;
}

/// A point transform from the query CRS into a dataset's native projection.
pub trait CrsTransform {
    /// Transform a single point. Failure is a hard error, never a silent
    /// "not water".
    fn transform(&mut self, x: f64, y: f64) -> Result<(f64, f64)>;
}
