//! Bounding box of a raster dataset in its native projection.

use serde::{Deserialize, Serialize};

use crate::geotransform::GeoTransform;

/// An axis-aligned bounding box in native projection units.
///
/// Derived once from a geotransform and the raster's pixel dimensions;
/// immutable afterwards. Containment is inclusive on all four edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl BoundingBox {
    /// Create a bounding box from corner coordinates.
    ///
    /// The corners are normalized so that `min_x <= max_x` and
    /// `min_y <= max_y` regardless of argument order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Compute the bounding box covered by a raster with the given
    /// geotransform and pixel dimensions.
    pub fn from_geotransform(geo: &GeoTransform, width: usize, height: usize) -> Self {
        let (x0, y0) = (geo.origin_x, geo.origin_y);
        let (x1, y1) = geo.pixel_to_coord(width as i64, height as i64);
        Self::new(x0, y0, x1, y1)
    }

    /// Check whether a point lies within the box, inclusive on all edges.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Width of the box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_geotransform() {
        // 360x180 pixels of one degree each, north-up.
        let geo = GeoTransform::north_up(-180.0, 90.0, 1.0, -1.0);
        let bbox = BoundingBox::from_geotransform(&geo, 360, 180);

        assert_eq!(bbox.min_x(), -180.0);
        assert_eq!(bbox.max_x(), 180.0);
        assert_eq!(bbox.min_y(), -90.0);
        assert_eq!(bbox.max_y(), 90.0);
        assert_eq!(bbox.width(), 360.0);
        assert_eq!(bbox.height(), 180.0);
    }

    #[test]
    fn test_contains_inclusive_edges() {
        let bbox = BoundingBox::new(-10.0, -5.0, 10.0, 5.0);

        assert!(bbox.contains(-10.0, -5.0));
        assert!(bbox.contains(10.0, 5.0));
        assert!(bbox.contains(-10.0, 5.0));
        assert!(bbox.contains(0.0, 0.0));
    }

    #[test]
    fn test_contains_rejects_outside() {
        let bbox = BoundingBox::new(-10.0, -5.0, 10.0, 5.0);

        assert!(!bbox.contains(-10.001, 0.0));
        assert!(!bbox.contains(10.001, 0.0));
        assert!(!bbox.contains(0.0, -5.001));
        assert!(!bbox.contains(0.0, 5.001));
        // x alone out of range rejects regardless of y.
        assert!(!bbox.contains(-11.0, 100.0));
    }

    #[test]
    fn test_positive_pixel_height_normalizes() {
        // South-up raster: origin at the south-west corner.
        let geo = GeoTransform::north_up(0.0, 0.0, 1.0, 1.0);
        let bbox = BoundingBox::from_geotransform(&geo, 100, 50);

        assert_eq!(bbox.min_y(), 0.0);
        assert_eq!(bbox.max_y(), 50.0);
    }
}
