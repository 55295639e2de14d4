//! Synthetic raster fixtures for tests and benchmarks.
//!
//! Builders produce in-memory rasters registered under unique virtual
//! paths, so every test works against its own dataset regardless of test
//! parallelism.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::engine::WATER_SENTINEL;
use crate::geotransform::GeoTransform;
use crate::raster::memory::MemoryRaster;

/// Register `raster` under a fresh virtual path and return it.
pub fn register_raster(label: &str, raster: MemoryRaster) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let id = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = PathBuf::from(format!("/virtual/testdata/{label}-{id}.tif"));
    raster.register(&path);
    path
}

/// North-up geotransform covering the whole globe with `width x height`
/// pixels.
pub fn global_geotransform(width: usize, height: usize) -> GeoTransform {
    GeoTransform::north_up(-180.0, 90.0, 360.0 / width as f64, -180.0 / height as f64)
}

/// All-land band data.
pub fn create_land_grid(width: usize, height: usize) -> Vec<u8> {
    vec![0; width * height]
}

/// Band data with water at the listed `(x, y)` pixels and land elsewhere.
pub fn create_water_pixels(
    width: usize,
    height: usize,
    pixels: &[(usize, usize)],
) -> Vec<u8> {
    let mut data = create_land_grid(width, height);
    for &(x, y) in pixels {
        data[y * width + x] = WATER_SENTINEL;
    }
    data
}

/// Band data with water on even `block x block` squares, a checkerboard
/// pattern that exercises many tiles.
pub fn create_checkerboard(width: usize, height: usize, block: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let water = (row / block + col / block) % 2 == 0;
            data.push(if water { WATER_SENTINEL } else { 0 });
        }
    }
    data
}

/// Register a global checkerboard raster and return its virtual path.
pub fn register_world_checkerboard(width: usize, height: usize, block: usize) -> PathBuf {
    let raster = MemoryRaster::new(
        width,
        height,
        global_geotransform(width, height),
        create_checkerboard(width, height, block),
    );
    register_raster("world-checkerboard", raster)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_raster_paths_are_unique() {
        let geo = global_geotransform(4, 4);
        let a = register_raster("unique", MemoryRaster::new(4, 4, geo, create_land_grid(4, 4)));
        let b = register_raster("unique", MemoryRaster::new(4, 4, geo, create_land_grid(4, 4)));
        assert_ne!(a, b);

        MemoryRaster::unregister(&a);
        MemoryRaster::unregister(&b);
    }

    #[test]
    fn test_create_water_pixels() {
        let data = create_water_pixels(8, 8, &[(3, 2), (7, 7)]);
        assert_eq!(data[2 * 8 + 3], WATER_SENTINEL);
        assert_eq!(data[7 * 8 + 7], WATER_SENTINEL);
        assert_eq!(data.iter().filter(|&&v| v == WATER_SENTINEL).count(), 2);
    }

    #[test]
    fn test_create_checkerboard() {
        let data = create_checkerboard(8, 8, 4);
        // Top-left block is water, its right neighbor is land.
        assert_eq!(data[0], WATER_SENTINEL);
        assert_eq!(data[4], 0);
        assert_eq!(data[4 * 8], 0);
        assert_eq!(data[4 * 8 + 4], WATER_SENTINEL);
    }

    #[test]
    fn test_global_geotransform_covers_world() {
        let geo = global_geotransform(360, 180);
        assert_eq!(geo.pixel_offset(-180.0, 90.0), (0, 0));
        assert_eq!(geo.pixel_offset(179.5, -89.5), (359, 179));
    }
}
