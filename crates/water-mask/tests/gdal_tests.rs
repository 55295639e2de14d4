//! GDAL backend round-trip test. Runs only with `--features gdal`.
#![cfg(feature = "gdal")]

use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::DriverManager;

use water_mask::raster::gdal::GdalRaster;
use water_mask::testdata;
use water_mask::{MaskConfig, RasterSource, WaterMask};

#[test]
fn test_geotiff_roundtrip() {
    GdalRaster::initialize();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mask.tif");

    // 64x64 one-degree pixels with the origin at (0, 64), water at
    // pixel (40, 40).
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut dataset = driver
        .create_with_band_type::<u8, _>(&path, 64, 64, 1)
        .unwrap();
    dataset
        .set_geo_transform(&[0.0, 1.0, 0.0, 64.0, 0.0, -1.0])
        .unwrap();
    dataset
        .set_spatial_ref(&SpatialRef::from_epsg(4326).unwrap())
        .unwrap();

    let data = testdata::create_water_pixels(64, 64, &[(40, 40)]);
    let mut buffer = Buffer::new((64, 64), data);
    dataset
        .rasterband(1)
        .unwrap()
        .write((0, 0), (64, 64), &mut buffer)
        .unwrap();
    drop(dataset);

    let config = MaskConfig::default().with_tile_size(32).with_max_cache_tiles(8);
    let mask = WaterMask::<GdalRaster>::open(&[&path], config).unwrap();

    // Pixel (40, 40) spans lon 40..41, lat 23..24.
    let lons = vec![40.5, 10.5, 200.0];
    let lats = vec![23.5, 23.5, 23.5];
    let results = mask.classify_batch(&lons, &lats, 1).unwrap();
    assert_eq!(results, vec![true, false, false]);
}
