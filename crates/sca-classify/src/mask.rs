//! AOI mask rasterization.

use sca_common::{BoundingBox, Raster};

/// Boolean raster restricting which pixels count toward the area statistic.
///
/// Built per mosaic grid from a fixed AOI polygon (or bbox); the AOI itself
/// never changes across the time series.
#[derive(Debug, Clone)]
pub struct AoiMask {
    pub width: usize,
    pub height: usize,
    inside: Vec<bool>,
}

impl AoiMask {
    /// Rasterize a polygon ring onto the mosaic's grid.
    ///
    /// A pixel is inside when its center is inside the ring (even-odd rule).
    /// The ring may be open or closed; vertices are in the mosaic CRS.
    pub fn from_polygon(mosaic: &Raster, ring: &[[f64; 2]]) -> Self {
        let mut inside = vec![false; mosaic.len()];
        for row in 0..mosaic.height {
            for col in 0..mosaic.width {
                let (x, y) = mosaic.transform.pixel_center(col, row);
                inside[row * mosaic.width + col] = point_in_ring(x, y, ring);
            }
        }
        Self {
            width: mosaic.width,
            height: mosaic.height,
            inside,
        }
    }

    /// Mask covering a rectangular AOI.
    pub fn from_bbox(mosaic: &Raster, bbox: &BoundingBox) -> Self {
        let mut inside = vec![false; mosaic.len()];
        for row in 0..mosaic.height {
            for col in 0..mosaic.width {
                let (x, y) = mosaic.transform.pixel_center(col, row);
                inside[row * mosaic.width + col] = bbox.contains_point(x, y);
            }
        }
        Self {
            width: mosaic.width,
            height: mosaic.height,
            inside,
        }
    }

    /// Mask admitting every pixel of the mosaic.
    pub fn full(mosaic: &Raster) -> Self {
        Self {
            width: mosaic.width,
            height: mosaic.height,
            inside: vec![true; mosaic.len()],
        }
    }

    pub fn contains(&self, col: usize, row: usize) -> bool {
        self.inside[row * self.width + col]
    }

    /// Number of pixels inside the AOI.
    pub fn count(&self) -> usize {
        self.inside.iter().filter(|&&b| b).count()
    }
}

/// Even-odd ray cast against the polygon ring.
fn point_in_ring(x: f64, y: f64, ring: &[[f64; 2]]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = ring.len();
    let mut j = n - 1;
    for i in 0..n {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::uniform_raster;

    #[test]
    fn test_bbox_mask_counts_pixel_centers() {
        // 4x4 grid of 3m pixels from (500000, 6700000); bbox covering the
        // top-left 2x2 block of centers
        let mosaic = uniform_raster(4, 4, [0.1, 0.1, 0.1, 0.1]);
        let bbox = BoundingBox::new(500000.0, 6699994.0, 500006.0, 6700000.0);

        let mask = AoiMask::from_bbox(&mosaic, &bbox);
        assert_eq!(mask.count(), 4);
        assert!(mask.contains(0, 0));
        assert!(mask.contains(1, 1));
        assert!(!mask.contains(2, 0));
        assert!(!mask.contains(0, 2));
    }

    #[test]
    fn test_polygon_mask_triangle() {
        let mosaic = uniform_raster(4, 4, [0.1, 0.1, 0.1, 0.1]);
        // triangle over the lower-left half of the tile
        let ring = [
            [500000.0, 6699988.0],
            [500012.0, 6699988.0],
            [500000.0, 6700000.0],
        ];

        let mask = AoiMask::from_polygon(&mosaic, &ring);
        assert!(mask.contains(0, 3));
        assert!(!mask.contains(3, 0));
        // diagonal splits the grid roughly in half
        assert!(mask.count() >= 6 && mask.count() <= 10, "count = {}", mask.count());
    }

    #[test]
    fn test_degenerate_ring_is_empty() {
        let mosaic = uniform_raster(2, 2, [0.1, 0.1, 0.1, 0.1]);
        let mask = AoiMask::from_polygon(&mosaic, &[[0.0, 0.0], [1.0, 1.0]]);
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn test_full_mask() {
        let mosaic = uniform_raster(3, 3, [0.1, 0.1, 0.1, 0.1]);
        assert_eq!(AoiMask::full(&mosaic).count(), 9);
    }
}
