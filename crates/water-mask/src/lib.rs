//! Water Mask — tiled raster cache and point-classification engine
//!
//! This crate answers point-membership queries ("is this (longitude,
//! latitude) water?") against one or more large georeferenced rasters
//! without loading whole rasters into memory. Queries route through a
//! bounding-box dataset test, a fixed-size tile decomposition, and a
//! bounded LRU tile cache; batches fan out over worker threads that each
//! own an independent cache collection.
//!
//! # Architecture
//!
//! ```text
//! classify_batch(lons, lats, num_threads)
//!      │
//!      ├─► partition [0, len) into contiguous chunks
//!      │
//!      └─► per worker thread
//!               │
//!               ├─► allocate CacheSet (one transformer + TileCache
//!               │   per dataset)
//!               │
//!               └─► per point
//!                        │
//!                        ├─► BoundingBox routing (configuration order)
//!                        │
//!                        ├─► CRS transform, pixel and tile addressing
//!                        │
//!                        ├─► TileCache hit ──► classify pixel
//!                        │
//!                        └─► TileCache miss ──► serialized window read
//!                                               (per-dataset mutex)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use water_mask::{MaskConfig, WaterMask};
//! use water_mask::raster::gdal::GdalRaster;
//!
//! let mask = WaterMask::<GdalRaster>::open(
//!     &["hydrosheds/eu_msk_3s.tif", "hydrosheds/af_msk_3s.tif"],
//!     MaskConfig::default(),
//! )?;
//!
//! let water = mask.classify_batch(&lons, &lats, 0)?;
//! ```

pub mod bbox;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod geotransform;
pub mod parallel;
pub mod raster;
pub mod testdata;

// Re-export commonly used types at crate root
pub use bbox::BoundingBox;
pub use cache::{Tile, TileCache, TileCacheStats, TileKey};
pub use config::MaskConfig;
pub use dataset::DatasetHandle;
pub use engine::{CacheSet, WaterMask, WATER_SENTINEL};
pub use error::{MaskError, Result};
pub use geotransform::GeoTransform;
pub use raster::{CrsTransform, RasterSource};
