//! GDAL-backed raster source, enabled by the `gdal` feature.
//!
//! Requires the system GDAL library at build time. Driver registration is
//! process-wide and guarded by a `Once`.

use std::path::{Path, PathBuf};
use std::sync::Once;

use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use gdal::{Dataset, DriverManager};

use crate::error::{MaskError, Result};
use crate::geotransform::GeoTransform;
use crate::raster::{CrsTransform, RasterSource};

static REGISTER_DRIVERS: Once = Once::new();

/// A GDAL raster dataset opened read-only.
pub struct GdalRaster {
    path: PathBuf,
    dataset: Dataset,
}

impl RasterSource for GdalRaster {
    type Transform = GdalTransform;

    fn initialize() {
        REGISTER_DRIVERS.call_once(DriverManager::register_all);
    }

    fn open(path: &Path) -> Result<Self> {
        let dataset = Dataset::open(path)
            .map_err(|err| MaskError::open_failed(path, err.to_string()))?;
        Ok(Self {
            path: path.to_path_buf(),
            dataset,
        })
    }

    fn geo_transform(&self) -> Result<GeoTransform> {
        let coeffs = self
            .dataset
            .geo_transform()
            .map_err(|_| MaskError::MissingGeoTransform {
                path: self.path.clone(),
            })?;
        Ok(GeoTransform::from_gdal(coeffs))
    }

    fn dimensions(&self) -> (usize, usize) {
        self.dataset.raster_size()
    }

    fn native_crs(&self) -> String {
        self.dataset.projection()
    }

    fn read_window(
        &mut self,
        x_offset: usize,
        y_offset: usize,
        width: usize,
        height: usize,
    ) -> Result<Vec<u8>> {
        let band = self
            .dataset
            .rasterband(1)
            .map_err(|err| MaskError::read_failed(err.to_string()))?;
        let buffer = band
            .read_as::<u8>(
                (x_offset as isize, y_offset as isize),
                (width, height),
                (width, height),
                None,
            )
            .map_err(|err| MaskError::read_failed(err.to_string()))?;
        let (_, data) = buffer.into_shape_and_vec();
        Ok(data)
    }

    fn transform_to_native(source_epsg: u32, native_crs: &str) -> Result<Self::Transform> {
        let mut source = SpatialRef::from_epsg(source_epsg)
            .map_err(|err| MaskError::invalid_crs(source_epsg, err.to_string()))?;
        let mut native = SpatialRef::from_wkt(native_crs)
            .map_err(|err| MaskError::invalid_crs(source_epsg, err.to_string()))?;

        // Force lon/lat ordering regardless of the authority's axis order.
        source.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        native.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

        let transform = CoordTransform::new(&source, &native)
            .map_err(|err| MaskError::invalid_crs(source_epsg, err.to_string()))?;
        Ok(GdalTransform { inner: transform })
    }
}

/// Point transform backed by a GDAL `CoordTransform`.
pub struct GdalTransform {
    inner: CoordTransform,
}

impl CrsTransform for GdalTransform {
    fn transform(&mut self, x: f64, y: f64) -> Result<(f64, f64)> {
        let mut xs = [x];
        let mut ys = [y];
        let mut zs = [0.0];
        self.inner
            .transform_coords(&mut xs, &mut ys, &mut zs)
            .map_err(|err| MaskError::transform(err.to_string()))?;
        Ok((xs[0], ys[0]))
    }
}
