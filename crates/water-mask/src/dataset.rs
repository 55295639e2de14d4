//! Per-raster dataset descriptor with serialized tile reads.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, trace};

use crate::bbox::BoundingBox;
use crate::cache::{Tile, TileKey};
use crate::error::{MaskError, Result};
use crate::geotransform::GeoTransform;
use crate::raster::RasterSource;

/// Immutable metadata and the shared handle for one raster dataset.
///
/// Created once at engine construction and never mutated afterwards, except
/// through the serialized raster-read path: raster libraries' read routines
/// are typically unsafe to invoke concurrently on one handle, so all
/// physical reads go through the per-dataset mutex. Reads against different
/// datasets proceed concurrently.
#[derive(Debug)]
pub struct DatasetHandle<R: RasterSource> {
    path: PathBuf,
    geo: GeoTransform,
    width: usize,
    height: usize,
    bbox: BoundingBox,
    native_crs: String,
    raster: Mutex<R>,
}

impl<R: RasterSource> DatasetHandle<R> {
    /// Open a raster and derive its descriptor.
    pub fn open(path: &Path) -> Result<Self> {
        let raster = R::open(path)?;
        let geo = raster.geo_transform()?;
        let (width, height) = raster.dimensions();
        let bbox = BoundingBox::from_geotransform(&geo, width, height);
        let native_crs = raster.native_crs();

        debug!(
            path = %path.display(),
            width,
            height,
            min_x = bbox.min_x(),
            max_x = bbox.max_x(),
            min_y = bbox.min_y(),
            max_y = bbox.max_y(),
            "opened raster dataset"
        );

        Ok(Self {
            path: path.to_path_buf(),
            geo,
            width,
            height,
            bbox,
            native_crs,
            raster: Mutex::new(raster),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn geo_transform(&self) -> &GeoTransform {
        &self.geo
    }

    /// Raster width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Raster height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn native_crs(&self) -> &str {
        &self.native_crs
    }

    /// Build a transformer from the query CRS into this dataset's native
    /// projection. Each worker builds its own.
    pub fn transformer(&self, source_epsg: u32) -> Result<R::Transform> {
        R::transform_to_native(source_epsg, &self.native_crs)
    }

    /// Read the tile at `key` from the raster.
    ///
    /// The window is clipped to the raster extent and zero-padded to the
    /// full `tile_size` square. The physical read holds the dataset mutex;
    /// everything else runs outside it.
    pub fn read_tile(&self, key: TileKey, tile_size: usize) -> Result<Tile> {
        let x_offset = key.tile_x as usize * tile_size;
        let y_offset = key.tile_y as usize * tile_size;

        if x_offset >= self.width || y_offset >= self.height {
            return Err(MaskError::tile_out_of_bounds(
                format!("{} at pixel offset ({}, {})", key, x_offset, y_offset),
                format!("{}x{}", self.width, self.height),
            ));
        }

        let read_width = tile_size.min(self.width - x_offset);
        let read_height = tile_size.min(self.height - y_offset);

        trace!(
            path = %self.path.display(),
            tile = %key,
            x_offset,
            y_offset,
            read_width,
            read_height,
            "loading tile"
        );

        let window = {
            let mut raster = self
                .raster
                .lock()
                .map_err(|_| MaskError::read_failed("raster handle mutex poisoned"))?;
            raster.read_window(x_offset, y_offset, read_width, read_height)?
        };

        if window.len() != read_width * read_height {
            return Err(MaskError::read_failed(format!(
                "expected {} bytes for {}x{} window, got {}",
                read_width * read_height,
                read_width,
                read_height,
                window.len()
            )));
        }

        if read_width == tile_size && read_height == tile_size {
            return Ok(window);
        }

        // Edge tile: pad past the raster extent with zeros.
        let mut tile = vec![0u8; tile_size * tile_size];
        for row in 0..read_height {
            let src = &window[row * read_width..(row + 1) * read_width];
            tile[row * tile_size..row * tile_size + read_width].copy_from_slice(src);
        }
        Ok(tile)
    }
}
