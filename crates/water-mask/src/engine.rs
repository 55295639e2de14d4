//! Multi-dataset point-classification engine.

use std::path::Path;

use tracing::debug;

use crate::cache::{TileCache, TileCacheStats, TileKey};
use crate::config::MaskConfig;
use crate::dataset::DatasetHandle;
use crate::error::{MaskError, Result};
use crate::parallel;
use crate::raster::{CrsTransform, RasterSource};

/// Band value marking a water pixel.
pub const WATER_SENTINEL: u8 = 1;

/// Worker-local cache collection: one transformer and one tile cache per
/// dataset, in configuration order.
///
/// Never shared between threads. Duplicating caches per worker costs
/// memory (`max_cache_tiles x tile_size^2` bytes per dataset per worker)
/// but keeps the hot get/insert path free of locks.
pub struct CacheSet<R: RasterSource> {
    entries: Vec<CacheEntry<R::Transform>>,
}

struct CacheEntry<T> {
    transform: T,
    tiles: TileCache,
}

impl<R: RasterSource> CacheSet<R> {
    /// Per-dataset cache statistics, in configuration order.
    pub fn stats(&self) -> Vec<TileCacheStats> {
        self.entries.iter().map(|entry| entry.tiles.stats()).collect()
    }
}

/// Point-classification engine over one or more water mask rasters.
///
/// Routes each query to the datasets whose bounding box contains it and
/// classifies the addressed pixel through a worker-local tile cache.
#[derive(Debug)]
pub struct WaterMask<R: RasterSource> {
    datasets: Vec<DatasetHandle<R>>,
    config: MaskConfig,
}

impl<R: RasterSource> WaterMask<R> {
    /// Open every raster in `paths` and build the engine.
    ///
    /// Runs the backend's one-time initialization, derives each dataset's
    /// metadata, and verifies eagerly that a transformer can be built for
    /// the configured query CRS, so CRS problems surface here rather than
    /// on the first query.
    pub fn open<P: AsRef<Path>>(paths: &[P], config: MaskConfig) -> Result<Self> {
        config.validate().map_err(MaskError::Config)?;
        R::initialize();

        let mut datasets = Vec::with_capacity(paths.len());
        for path in paths {
            let handle = DatasetHandle::open(path.as_ref())?;
            handle.transformer(config.source_epsg)?;
            datasets.push(handle);
        }

        Ok(Self { datasets, config })
    }

    pub fn config(&self) -> &MaskConfig {
        &self.config
    }

    /// The configured datasets, in configuration order.
    pub fn datasets(&self) -> &[DatasetHandle<R>] {
        &self.datasets
    }

    /// Allocate a worker-local cache collection.
    pub fn cache_set(&self) -> Result<CacheSet<R>> {
        let entries = self
            .datasets
            .iter()
            .map(|dataset| {
                Ok(CacheEntry {
                    transform: dataset.transformer(self.config.source_epsg)?,
                    tiles: TileCache::new(self.config.max_cache_tiles),
                })
            })
            .collect::<Result<_>>()?;
        Ok(CacheSet { entries })
    }

    /// Classify a single point using the caller's cache collection.
    ///
    /// Datasets are consulted in configuration order; the first one that
    /// classifies the point as water wins and stops the iteration. A point
    /// contained by no dataset, or by datasets that all report land, is
    /// not water.
    pub fn classify(&self, lon: f64, lat: f64, caches: &mut CacheSet<R>) -> Result<bool> {
        for (dataset, entry) in self.datasets.iter().zip(caches.entries.iter_mut()) {
            // Coarse routing test: the untransformed query point against
            // the native-projection box. See DESIGN.md for the
            // correctness caveat when the two spaces differ.
            if dataset.bbox().contains(lon, lat)
                && self.classify_in_dataset(dataset, lon, lat, entry)?
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn classify_in_dataset(
        &self,
        dataset: &DatasetHandle<R>,
        lon: f64,
        lat: f64,
        entry: &mut CacheEntry<R::Transform>,
    ) -> Result<bool> {
        let (x, y) = entry.transform.transform(lon, lat)?;
        let (pixel_x, pixel_y) = dataset.geo_transform().pixel_offset(x, y);

        if pixel_x < 0 || pixel_y < 0 {
            return Err(MaskError::tile_out_of_bounds(
                format!("pixel ({pixel_x}, {pixel_y})"),
                format!("{}x{}", dataset.width(), dataset.height()),
            ));
        }

        let tile_size = self.config.tile_size as i64;
        let key = TileKey::new(
            (pixel_x / tile_size) as u32,
            (pixel_y / tile_size) as u32,
        );

        let tile = entry
            .tiles
            .get_or_load(key, || dataset.read_tile(key, self.config.tile_size))?;

        let local_x = (pixel_x % tile_size) as usize;
        let local_y = (pixel_y % tile_size) as usize;
        Ok(tile[local_y * self.config.tile_size + local_x] == WATER_SENTINEL)
    }

    /// Classify a batch of points, optionally in parallel.
    ///
    /// `num_threads == 0` uses the host's detected parallelism;
    /// `num_threads == 1` runs inline on the caller thread; anything else
    /// is clamped to the batch size. Results land at the index positions
    /// of the inputs regardless of scheduling. Each worker owns its own
    /// cache collection; only physical raster reads are serialized.
    ///
    /// All workers are joined before an error propagates; when several
    /// workers fail, the last error observed in spawn order is returned
    /// and the output of unaffected partitions is unspecified.
    pub fn classify_batch(
        &self,
        lons: &[f64],
        lats: &[f64],
        num_threads: usize,
    ) -> Result<Vec<bool>> {
        if lons.len() != lats.len() {
            return Err(MaskError::LengthMismatch {
                lons: lons.len(),
                lats: lats.len(),
            });
        }
        if lons.is_empty() {
            return Ok(Vec::new());
        }

        let threads = parallel::resolve_threads(num_threads, lons.len());
        debug!(points = lons.len(), threads, "classifying batch");

        let mut results = vec![false; lons.len()];

        if threads == 1 {
            let mut caches = self.cache_set()?;
            for (slot, (&lon, &lat)) in results.iter_mut().zip(lons.iter().zip(lats)) {
                *slot = self.classify(lon, lat, &mut caches)?;
            }
            return Ok(results);
        }

        let ranges = parallel::split_ranges(lons.len(), threads);
        let mut error = None;

        std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(ranges.len());
            let mut out = results.as_mut_slice();

            for range in ranges {
                let (chunk, rest) = out.split_at_mut(range.len());
                out = rest;

                handles.push(scope.spawn(move || -> Result<()> {
                    let mut caches = self.cache_set()?;
                    for (slot, ix) in chunk.iter_mut().zip(range) {
                        *slot = self.classify(lons[ix], lats[ix], &mut caches)?;
                    }
                    Ok(())
                }));
            }

            for handle in handles {
                match handle.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => error = Some(err),
                    // Remaining threads are joined by the scope on unwind.
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
        });

        match error {
            Some(err) => Err(err),
            None => Ok(results),
        }
    }
}
