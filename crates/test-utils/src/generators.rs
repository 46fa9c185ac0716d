//! Synthetic raster and scene generators.
//!
//! All generators are deterministic so tests can assert exact values. The
//! default grid is a 3 m UTM zone 6N tile anchored at (500000, 6700000).

use chrono::{DateTime, Utc};
use sca_common::{Band, Crs, GeoTransform, Raster, Scene};

/// Default CRS used by generated rasters.
pub fn test_crs() -> Crs {
    Crs::new(32606)
}

/// Parse an RFC 3339 timestamp; panics on bad input (test code only).
pub fn utc(s: &str) -> DateTime<Utc> {
    s.parse().expect("valid RFC 3339 timestamp")
}

/// A raster at the given origin with square pixels and constant band values
/// `[blue, green, red, nir]`.
pub fn raster_at(
    origin_x: f64,
    origin_y: f64,
    width: usize,
    height: usize,
    resolution: f64,
    values: [f32; 4],
) -> Raster {
    let transform = GeoTransform::north_up(origin_x, origin_y, resolution);
    let mut raster = Raster::filled_no_data(width, height, transform, test_crs());
    for (band, value) in Band::ALL.into_iter().zip(values) {
        raster.band_mut(band).fill(value);
    }
    raster
}

/// A raster on the default grid with constant band values.
pub fn uniform_raster(width: usize, height: usize, values: [f32; 4]) -> Raster {
    raster_at(500000.0, 6700000.0, width, height, 3.0, values)
}

/// A raster built from per-pixel (nir, red) pairs in row-major order.
///
/// Blue and green are filled with 0.2 so every pixel is valid unless the
/// nir/red pair itself is NaN.
pub fn raster_from_nir_red(width: usize, height: usize, pairs: &[(f32, f32)]) -> Raster {
    assert_eq!(pairs.len(), width * height, "one (nir, red) pair per pixel");

    let transform = GeoTransform::north_up(500000.0, 6700000.0, 3.0);
    let mut raster = Raster::filled_no_data(width, height, transform, test_crs());
    for (idx, &(nir, red)) in pairs.iter().enumerate() {
        let (col, row) = (idx % width, idx / width);
        raster.set_sample(Band::Blue, col, row, 0.2);
        raster.set_sample(Band::Green, col, row, 0.2);
        raster.set_sample(Band::Red, col, row, red);
        raster.set_sample(Band::Nir, col, row, nir);
    }
    raster
}

/// A scene wrapping an existing raster.
pub fn scene_with(id: &str, acquired: DateTime<Utc>, raster: Raster) -> Scene {
    Scene::new(id, acquired, raster)
}

/// A 4x4 scene with snow-like reflectance on the default grid.
pub fn scene_at(id: &str, acquired: &str) -> Scene {
    Scene::new(id, utc(acquired), uniform_raster(4, 4, [0.3, 0.35, 0.3, 0.7]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_from_nir_red_layout() {
        let raster = raster_from_nir_red(2, 2, &[(0.5, 0.1), (0.4, 0.4), (0.9, 0.05), (0.2, 0.3)]);
        assert_eq!(raster.sample(Band::Nir, 0, 0), 0.5);
        assert_eq!(raster.sample(Band::Red, 0, 0), 0.1);
        assert_eq!(raster.sample(Band::Nir, 0, 1), 0.9);
        assert_eq!(raster.sample(Band::Red, 1, 1), 0.3);
        assert!(raster.pixel_valid(1, 0));
    }

    #[test]
    fn test_uniform_raster_extent() {
        let raster = uniform_raster(4, 4, [0.1, 0.2, 0.3, 0.4]);
        let bbox = raster.bbox();
        assert_eq!(bbox.min_x, 500000.0);
        assert_eq!(bbox.max_x, 500012.0);
        assert_eq!(bbox.max_y, 6700000.0);
    }

    #[test]
    fn test_scene_at_date() {
        let scene = scene_at("s1", "2021-07-14T21:30:45Z");
        assert_eq!(scene.acquisition_date().to_string(), "2021-07-14");
    }
}
