//! Affine geotransform mapping pixel coordinates to projected coordinates.

use serde::{Deserialize, Serialize};

/// A six-coefficient affine geotransform in GDAL coefficient order:
/// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`.
///
/// `pixel_height` is typically negative for north-up rasters (row 0 is the
/// northernmost row). The rotation terms are carried for round-tripping but
/// the engine only supports north-up rasters (both rotations zero).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Create a north-up geotransform from origin and pixel size.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            pixel_width,
            row_rotation: 0.0,
            origin_y,
            col_rotation: 0.0,
            pixel_height,
        }
    }

    /// Build from a GDAL-style coefficient array.
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    /// Export as a GDAL-style coefficient array.
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// Map a projected coordinate to integer pixel coordinates.
    ///
    /// Uses truncating division toward zero: offsets on the negative side
    /// of the origin truncate toward zero rather than floor, and are
    /// rejected downstream by the tile bounds check.
    pub fn pixel_offset(&self, x: f64, y: f64) -> (i64, i64) {
        let px = (x - self.origin_x) / self.pixel_width;
        let py = (y - self.origin_y) / self.pixel_height;
        (px as i64, py as i64)
    }

    /// Map integer pixel coordinates back to the projected coordinate of
    /// the pixel's upper-left corner.
    pub fn pixel_to_coord(&self, px: i64, py: i64) -> (f64, f64) {
        (
            self.origin_x + px as f64 * self.pixel_width,
            self.origin_y + py as f64 * self.pixel_height,
        )
    }

    /// True when both rotation terms are zero.
    pub fn is_north_up(&self) -> bool {
        self.row_rotation == 0.0 && self.col_rotation == 0.0
    }
}
