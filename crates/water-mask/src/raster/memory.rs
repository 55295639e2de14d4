//! In-memory raster backend for tests, benchmarks, and fixtures.
//!
//! Rasters are registered in a process-wide registry under a virtual path,
//! so the engine's path-based construction works unchanged. Physical reads
//! are counted per raster, letting tests assert cache behavior and that
//! out-of-bbox queries touch no data.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::{MaskError, Result};
use crate::geotransform::GeoTransform;
use crate::raster::{CrsTransform, RasterSource};

/// Native CRS token for the identity transform.
pub const CRS_IDENTITY: &str = "identity";

/// Native CRS token for a transformer that fails at runtime.
pub const CRS_FAIL_RUNTIME: &str = "fail-runtime";

fn registry() -> &'static Mutex<HashMap<PathBuf, MemoryRaster>> {
    static REGISTRY: OnceLock<Mutex<HashMap<PathBuf, MemoryRaster>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// An in-memory single-band byte raster.
///
/// Clones share the pixel data and the physical-read counter, so a handle
/// opened from the registry reports reads back to the registered raster.
#[derive(Clone, Debug)]
pub struct MemoryRaster {
    width: usize,
    height: usize,
    geo: GeoTransform,
    native_crs: String,
    data: Arc<Vec<u8>>,
    reads: Arc<AtomicU64>,
}

impl MemoryRaster {
    /// Create a raster from row-major band data.
    pub fn new(width: usize, height: usize, geo: GeoTransform, data: Vec<u8>) -> Self {
        assert_eq!(data.len(), width * height, "band data does not match dimensions");
        Self {
            width,
            height,
            geo,
            native_crs: CRS_IDENTITY.to_string(),
            data: Arc::new(data),
            reads: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Override the native CRS token (see the `CRS_*` constants and
    /// `offset:<dx>:<dy>`).
    pub fn with_native_crs(mut self, native_crs: impl Into<String>) -> Self {
        self.native_crs = native_crs.into();
        self
    }

    /// Set a single pixel value.
    pub fn set_pixel(&mut self, x: usize, y: usize, value: u8) {
        assert!(x < self.width && y < self.height, "pixel out of range");
        Arc::make_mut(&mut self.data)[y * self.width + x] = value;
    }

    /// Register this raster under a virtual path, replacing any previous
    /// registration.
    pub fn register(self, path: impl AsRef<Path>) {
        registry()
            .lock()
            .expect("raster registry poisoned")
            .insert(path.as_ref().to_path_buf(), self);
    }

    /// Remove a registered raster.
    pub fn unregister(path: impl AsRef<Path>) {
        registry()
            .lock()
            .expect("raster registry poisoned")
            .remove(path.as_ref());
    }

    /// Number of physical window reads performed against the raster
    /// registered at `path`.
    pub fn physical_reads(path: impl AsRef<Path>) -> u64 {
        registry()
            .lock()
            .expect("raster registry poisoned")
            .get(path.as_ref())
            .map(|raster| raster.reads.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

impl RasterSource for MemoryRaster {
    type Transform = MemoryTransform;

    fn initialize() {
        // No process-wide state to set up.
    }

    fn open(path: &Path) -> Result<Self> {
        registry()
            .lock()
            .map_err(|_| MaskError::open_failed(path, "raster registry poisoned"))?
            .get(path)
            .cloned()
            .ok_or_else(|| MaskError::open_failed(path, "no in-memory raster registered"))
    }

    fn geo_transform(&self) -> Result<GeoTransform> {
        Ok(self.geo)
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn native_crs(&self) -> String {
        self.native_crs.clone()
    }

    fn read_window(
        &mut self,
        x_offset: usize,
        y_offset: usize,
        width: usize,
        height: usize,
    ) -> Result<Vec<u8>> {
        if x_offset + width > self.width || y_offset + height > self.height {
            return Err(MaskError::read_failed(format!(
                "window {}x{} at ({}, {}) exceeds raster {}x{}",
                width, height, x_offset, y_offset, self.width, self.height
            )));
        }

        self.reads.fetch_add(1, Ordering::Relaxed);

        let mut window = Vec::with_capacity(width * height);
        for row in y_offset..y_offset + height {
            let start = row * self.width + x_offset;
            window.extend_from_slice(&self.data[start..start + width]);
        }
        Ok(window)
    }

    fn transform_to_native(source_epsg: u32, native_crs: &str) -> Result<Self::Transform> {
        if source_epsg == 0 {
            return Err(MaskError::invalid_crs(source_epsg, "EPSG code must be > 0"));
        }

        if native_crs == CRS_IDENTITY {
            return Ok(MemoryTransform::Identity);
        }
        if native_crs == CRS_FAIL_RUNTIME {
            return Ok(MemoryTransform::FailRuntime);
        }
        if let Some(rest) = native_crs.strip_prefix("offset:") {
            let mut parts = rest.splitn(2, ':');
            let dx = parts.next().and_then(|s| s.parse::<f64>().ok());
            let dy = parts.next().and_then(|s| s.parse::<f64>().ok());
            if let (Some(dx), Some(dy)) = (dx, dy) {
                return Ok(MemoryTransform::Offset { dx, dy });
            }
        }

        Err(MaskError::invalid_crs(
            source_epsg,
            format!("unsupported native CRS '{native_crs}'"),
        ))
    }
}

/// Transformers supported by the in-memory backend.
pub enum MemoryTransform {
    /// Query CRS and native projection coincide.
    Identity,
    /// Constant shift, simulating a projected native CRS.
    Offset { dx: f64, dy: f64 },
    /// Construction succeeds but every point fails to transform.
    FailRuntime,
}

impl CrsTransform for MemoryTransform {
    fn transform(&mut self, x: f64, y: f64) -> Result<(f64, f64)> {
        match self {
            Self::Identity => Ok((x, y)),
            Self::Offset { dx, dy } => Ok((x + *dx, y + *dy)),
            Self::FailRuntime => Err(MaskError::transform(format!(
                "cannot transform point ({x}, {y})"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_raster(width: usize, height: usize) -> MemoryRaster {
        let geo = GeoTransform::north_up(0.0, height as f64, 1.0, -1.0);
        MemoryRaster::new(width, height, geo, vec![0; width * height])
    }

    #[test]
    fn test_open_requires_registration() {
        let err = MemoryRaster::open(Path::new("/virtual/missing.tif")).unwrap_err();
        assert!(matches!(err, MaskError::OpenFailed { .. }));

        flat_raster(4, 4).register("/virtual/registered.tif");
        assert!(MemoryRaster::open(Path::new("/virtual/registered.tif")).is_ok());
        MemoryRaster::unregister("/virtual/registered.tif");
    }

    #[test]
    fn test_read_window_counts_and_extracts() {
        let mut raster = flat_raster(8, 8);
        raster.set_pixel(5, 2, 1);
        raster.clone().register("/virtual/window.tif");

        let mut handle = MemoryRaster::open(Path::new("/virtual/window.tif")).unwrap();
        let window = handle.read_window(4, 2, 2, 2).unwrap();
        assert_eq!(window, vec![0, 1, 0, 0]);
        assert_eq!(MemoryRaster::physical_reads("/virtual/window.tif"), 1);

        MemoryRaster::unregister("/virtual/window.tif");
    }

    #[test]
    fn test_read_window_rejects_out_of_range() {
        let mut raster = flat_raster(8, 8);
        let err = raster.read_window(4, 4, 8, 8).unwrap_err();
        assert!(matches!(err, MaskError::ReadFailed(_)));
    }

    #[test]
    fn test_transform_tokens() {
        let mut identity = MemoryRaster::transform_to_native(4326, CRS_IDENTITY).unwrap();
        assert_eq!(identity.transform(3.0, 4.0).unwrap(), (3.0, 4.0));

        let mut offset = MemoryRaster::transform_to_native(4326, "offset:10:-5").unwrap();
        assert_eq!(offset.transform(1.0, 1.0).unwrap(), (11.0, -4.0));

        let mut failing = MemoryRaster::transform_to_native(4326, CRS_FAIL_RUNTIME).unwrap();
        assert!(matches!(
            failing.transform(0.0, 0.0),
            Err(MaskError::Transform(_))
        ));

        assert!(matches!(
            MemoryRaster::transform_to_native(4326, "EPSG:99999"),
            Err(MaskError::InvalidCrs { .. })
        ));
        assert!(matches!(
            MemoryRaster::transform_to_native(0, CRS_IDENTITY),
            Err(MaskError::InvalidCrs { code: 0, .. })
        ));
    }
}
