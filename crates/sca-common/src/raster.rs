//! Georeferenced 4-band raster grids.

use crate::{BoundingBox, Crs};
use serde::{Deserialize, Serialize};

/// No-data sentinel used by scene files on disk. In memory missing
/// measurements are NaN.
pub const NO_DATA: f32 = -9999.0;

/// The four spectral bands carried by every scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Blue,
    Green,
    Red,
    Nir,
}

impl Band {
    pub const ALL: [Band; 4] = [Band::Blue, Band::Green, Band::Red, Band::Nir];

    /// Plane index within a raster's band storage.
    pub fn plane(self) -> usize {
        match self {
            Band::Blue => 0,
            Band::Green => 1,
            Band::Red => 2,
            Band::Nir => 3,
        }
    }
}

/// Affine georeferencing for a north-up raster (GDAL-style).
///
/// `origin_x`/`origin_y` are the outer corner of the top-left pixel;
/// `pixel_width` is positive and `pixel_height` negative for north-up data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// A north-up transform with square pixels of the given size.
    pub fn north_up(origin_x: f64, origin_y: f64, resolution: f64) -> Self {
        Self::new(origin_x, origin_y, resolution, -resolution)
    }

    /// Absolute pixel resolution as (x, y).
    pub fn resolution(&self) -> (f64, f64) {
        (self.pixel_width.abs(), self.pixel_height.abs())
    }

    /// Ground area covered by one pixel, in squared coordinate units.
    pub fn pixel_area(&self) -> f64 {
        (self.pixel_width * self.pixel_height).abs()
    }

    /// Coordinates of the center of pixel (col, row).
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y + (row as f64 + 0.5) * self.pixel_height,
        )
    }

    /// Nearest pixel containing the coordinate, or None if outside the grid.
    pub fn coord_to_pixel(
        &self,
        x: f64,
        y: f64,
        width: usize,
        height: usize,
    ) -> Option<(usize, usize)> {
        let col = ((x - self.origin_x) / self.pixel_width).floor() as isize;
        let row = ((y - self.origin_y) / self.pixel_height).floor() as isize;

        if col < 0 || row < 0 || col >= width as isize || row >= height as isize {
            return None;
        }

        Some((col as usize, row as usize))
    }

    /// Bounding box of a grid with the given dimensions.
    pub fn bbox(&self, width: usize, height: usize) -> BoundingBox {
        let far_x = self.origin_x + width as f64 * self.pixel_width;
        let far_y = self.origin_y + height as f64 * self.pixel_height;

        BoundingBox {
            min_x: self.origin_x.min(far_x),
            min_y: self.origin_y.min(far_y),
            max_x: self.origin_x.max(far_x),
            max_y: self.origin_y.max(far_y),
        }
    }
}

/// A georeferenced raster with four f32 band planes in row-major order.
#[derive(Debug, Clone)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub transform: GeoTransform,
    pub crs: Crs,
    bands: [Vec<f32>; 4],
}

impl Raster {
    /// Create a raster filled with NaN (all pixels missing).
    pub fn filled_no_data(width: usize, height: usize, transform: GeoTransform, crs: Crs) -> Self {
        let plane = vec![f32::NAN; width * height];
        Self {
            width,
            height,
            transform,
            crs,
            bands: [plane.clone(), plane.clone(), plane.clone(), plane],
        }
    }

    /// Build a raster from four row-major band planes.
    ///
    /// Panics if any plane length does not match the grid dimensions; callers
    /// construct planes from the same loop bounds so a mismatch is a bug.
    pub fn from_planes(
        width: usize,
        height: usize,
        transform: GeoTransform,
        crs: Crs,
        bands: [Vec<f32>; 4],
    ) -> Self {
        for plane in &bands {
            assert_eq!(plane.len(), width * height, "band plane size mismatch");
        }
        Self {
            width,
            height,
            transform,
            crs,
            bands,
        }
    }

    /// Total number of pixels.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Row-major flat index for a pixel.
    pub fn flat_index(&self, col: usize, row: usize) -> usize {
        row * self.width + col
    }

    pub fn band(&self, band: Band) -> &[f32] {
        &self.bands[band.plane()]
    }

    pub fn band_mut(&mut self, band: Band) -> &mut [f32] {
        &mut self.bands[band.plane()]
    }

    /// Band value at a pixel.
    pub fn sample(&self, band: Band, col: usize, row: usize) -> f32 {
        self.bands[band.plane()][row * self.width + col]
    }

    pub fn set_sample(&mut self, band: Band, col: usize, row: usize, value: f32) {
        self.bands[band.plane()][row * self.width + col] = value;
    }

    /// A pixel is valid only when every band holds a finite measurement.
    pub fn pixel_valid(&self, col: usize, row: usize) -> bool {
        let idx = row * self.width + col;
        self.bands.iter().all(|plane| plane[idx].is_finite())
    }

    /// True if any pixel whose center falls inside `bbox` is valid.
    ///
    /// Used to drop tiles that carry no real data over the AOI before
    /// mosaicking.
    pub fn has_valid_data_in(&self, bbox: &BoundingBox) -> bool {
        for row in 0..self.height {
            for col in 0..self.width {
                let (x, y) = self.transform.pixel_center(col, row);
                if bbox.contains_point(x, y) && self.pixel_valid(col, row) {
                    return true;
                }
            }
        }
        false
    }

    /// Spatial extent of this raster.
    pub fn bbox(&self) -> BoundingBox {
        self.transform.bbox(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform() -> GeoTransform {
        GeoTransform::north_up(500000.0, 6700000.0, 30.0)
    }

    #[test]
    fn test_pixel_center_round_trip() {
        let t = transform();
        let (x, y) = t.pixel_center(3, 7);
        assert_eq!(x, 500000.0 + 3.5 * 30.0);
        assert_eq!(y, 6700000.0 - 7.5 * 30.0);
        assert_eq!(t.coord_to_pixel(x, y, 10, 10), Some((3, 7)));
    }

    #[test]
    fn test_coord_outside_grid() {
        let t = transform();
        assert_eq!(t.coord_to_pixel(499999.0, 6700000.0, 10, 10), None);
        assert_eq!(t.coord_to_pixel(500000.0, 6700001.0, 10, 10), None);
        // just inside the far corner
        assert!(t
            .coord_to_pixel(500000.0 + 299.9, 6700000.0 - 299.9, 10, 10)
            .is_some());
    }

    #[test]
    fn test_bbox() {
        let t = transform();
        let bbox = t.bbox(10, 20);
        assert_eq!(bbox.min_x, 500000.0);
        assert_eq!(bbox.max_x, 500000.0 + 300.0);
        assert_eq!(bbox.max_y, 6700000.0);
        assert_eq!(bbox.min_y, 6700000.0 - 600.0);
    }

    #[test]
    fn test_pixel_valid_requires_all_bands() {
        let mut raster = Raster::filled_no_data(2, 2, transform(), Crs::new(32606));
        for band in Band::ALL {
            raster.set_sample(band, 0, 0, 0.5);
        }
        raster.set_sample(Band::Blue, 1, 1, 0.5);

        assert!(raster.pixel_valid(0, 0));
        assert!(!raster.pixel_valid(1, 1)); // green/red/nir still NaN
    }

    #[test]
    fn test_pixel_area() {
        assert_eq!(transform().pixel_area(), 900.0);
    }
}
