//! Merging same-date tiles onto a union-extent grid.

use chrono::NaiveDate;
use tracing::{debug, warn};

use sca_common::{Band, GeoTransform, Raster, ScaError, ScaResult, Scene};

/// Tolerance for resolution comparison, in CRS units. Vendor tiles of one
/// product share an exact grid spacing; anything beyond float noise is a
/// genuinely different product.
const RESOLUTION_EPSILON: f64 = 1e-6;

/// Merge a date's tiles into a single mosaic.
///
/// Tiles must already be sorted oldest-first (see
/// [`crate::group::DateGroup`]): valid pixels from later captures overwrite
/// earlier ones, while no-data pixels never overwrite valid data. Returns an
/// error when tiles disagree on CRS or resolution so the caller can skip the
/// date instead of blending incompatible grids.
pub fn merge_scenes(date: NaiveDate, scenes: &[Scene]) -> ScaResult<Raster> {
    let first = scenes
        .first()
        .ok_or_else(|| ScaError::EmptyMosaic(date.to_string()))?;

    let crs = first.raster.crs;
    let resolution = first.raster.transform.resolution();

    for scene in &scenes[1..] {
        if scene.raster.crs != crs {
            return Err(ScaError::CrsMismatch {
                expected: crs.to_string(),
                found: scene.raster.crs.to_string(),
            });
        }
        let found = scene.raster.transform.resolution();
        if (found.0 - resolution.0).abs() > RESOLUTION_EPSILON
            || (found.1 - resolution.1).abs() > RESOLUTION_EPSILON
        {
            return Err(ScaError::ResolutionMismatch {
                expected: resolution,
                found,
            });
        }
    }

    // Target grid: union of tile extents at the shared resolution.
    let extent = scenes
        .iter()
        .skip(1)
        .fold(first.raster.bbox(), |acc, s| acc.union(&s.raster.bbox()));

    let pixel_width = first.raster.transform.pixel_width;
    let pixel_height = first.raster.transform.pixel_height;
    let transform = GeoTransform::new(extent.min_x, extent.max_y, pixel_width, pixel_height);
    let width = (extent.width() / resolution.0).round() as usize;
    let height = (extent.height() / resolution.1).round() as usize;

    let mut mosaic = Raster::filled_no_data(width, height, transform, crs);
    let mut stacked = 0usize;

    for scene in scenes {
        let col_off =
            ((scene.raster.transform.origin_x - transform.origin_x) / pixel_width).round() as isize;
        let row_off = ((scene.raster.transform.origin_y - transform.origin_y) / pixel_height)
            .round() as isize;

        let mut copied = 0usize;
        for row in 0..scene.raster.height {
            for col in 0..scene.raster.width {
                if !scene.raster.pixel_valid(col, row) {
                    continue;
                }

                let out_col = col as isize + col_off;
                let out_row = row as isize + row_off;
                if out_col < 0
                    || out_row < 0
                    || out_col >= width as isize
                    || out_row >= height as isize
                {
                    // tiles not aligned to the shared grid lose edge pixels
                    warn!(scene = %scene.id, col, row, "Pixel fell outside the union grid");
                    continue;
                }

                for band in Band::ALL {
                    let value = scene.raster.sample(band, col, row);
                    mosaic.set_sample(band, out_col as usize, out_row as usize, value);
                }
                copied += 1;
            }
        }

        debug!(scene = %scene.id, pixels = copied, "Stacked tile into mosaic");
        stacked += copied;
    }

    if stacked == 0 {
        return Err(ScaError::NoValidData(date.to_string()));
    }

    Ok(mosaic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sca_common::Crs;
    use test_utils::{raster_at, scene_with, utc};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 7, 14).unwrap()
    }

    #[test]
    fn test_disjoint_tiles_cover_exact_union() {
        // two 4x4 tiles side by side, 3m pixels, no gap
        let left = raster_at(500000.0, 6700000.0, 4, 4, 3.0, [0.1, 0.1, 0.1, 0.5]);
        let right = raster_at(500012.0, 6700000.0, 4, 4, 3.0, [0.2, 0.2, 0.2, 0.6]);

        let scenes = vec![
            scene_with("left", utc("2021-07-14T10:00:00Z"), left),
            scene_with("right", utc("2021-07-14T10:05:00Z"), right),
        ];
        let mosaic = merge_scenes(date(), &scenes).unwrap();

        assert_eq!(mosaic.width, 8);
        assert_eq!(mosaic.height, 4);
        let bbox = mosaic.bbox();
        assert_eq!(bbox.min_x, 500000.0);
        assert_eq!(bbox.max_x, 500024.0);

        // every pixel populated, boundary included
        for row in 0..4 {
            for col in 0..8 {
                assert!(mosaic.pixel_valid(col, row), "pixel ({col},{row}) lost");
            }
        }
        assert_eq!(mosaic.sample(Band::Nir, 0, 0), 0.5);
        assert_eq!(mosaic.sample(Band::Nir, 4, 0), 0.6);
    }

    #[test]
    fn test_overlap_latest_capture_wins() {
        let early = raster_at(500000.0, 6700000.0, 4, 4, 3.0, [0.1, 0.1, 0.1, 0.1]);
        let late = raster_at(500000.0, 6700000.0, 4, 4, 3.0, [0.9, 0.9, 0.9, 0.9]);

        let scenes = vec![
            scene_with("early", utc("2021-07-14T09:00:00Z"), early),
            scene_with("late", utc("2021-07-14T21:00:00Z"), late),
        ];
        let mosaic = merge_scenes(date(), &scenes).unwrap();
        assert_eq!(mosaic.sample(Band::Red, 2, 2), 0.9);
    }

    #[test]
    fn test_no_data_never_overwrites_valid() {
        let full = raster_at(500000.0, 6700000.0, 4, 4, 3.0, [0.1, 0.1, 0.1, 0.1]);
        let mut holey = raster_at(500000.0, 6700000.0, 4, 4, 3.0, [0.9, 0.9, 0.9, 0.9]);
        holey.set_sample(Band::Nir, 1, 1, f32::NAN); // invalidates the pixel

        let scenes = vec![
            scene_with("full", utc("2021-07-14T09:00:00Z"), full),
            scene_with("holey", utc("2021-07-14T21:00:00Z"), holey),
        ];
        let mosaic = merge_scenes(date(), &scenes).unwrap();

        // the hole keeps the earlier tile's measurement
        assert_eq!(mosaic.sample(Band::Red, 1, 1), 0.1);
        assert_eq!(mosaic.sample(Band::Red, 2, 2), 0.9);
    }

    #[test]
    fn test_resolution_mismatch_is_reported() {
        let a = raster_at(500000.0, 6700000.0, 4, 4, 3.0, [0.1; 4]);
        let b = raster_at(500000.0, 6700000.0, 4, 4, 30.0, [0.1; 4]);

        let scenes = vec![
            scene_with("a", utc("2021-07-14T09:00:00Z"), a),
            scene_with("b", utc("2021-07-14T10:00:00Z"), b),
        ];
        let err = merge_scenes(date(), &scenes).unwrap_err();
        assert!(matches!(err, ScaError::ResolutionMismatch { .. }));
    }

    #[test]
    fn test_crs_mismatch_is_reported() {
        let a = raster_at(500000.0, 6700000.0, 4, 4, 3.0, [0.1; 4]);
        let mut b = raster_at(500000.0, 6700000.0, 4, 4, 3.0, [0.1; 4]);
        b.crs = Crs::new(32607);

        let scenes = vec![
            scene_with("a", utc("2021-07-14T09:00:00Z"), a),
            scene_with("b", utc("2021-07-14T10:00:00Z"), b),
        ];
        let err = merge_scenes(date(), &scenes).unwrap_err();
        assert!(matches!(err, ScaError::CrsMismatch { .. }));
    }

    #[test]
    fn test_empty_group_is_an_error() {
        let err = merge_scenes(date(), &[]).unwrap_err();
        assert!(matches!(err, ScaError::EmptyMosaic(_)));
    }
}
