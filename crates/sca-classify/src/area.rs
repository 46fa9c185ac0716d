//! Snow-covered-area estimation.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use sca_common::{Band, Raster};

use crate::index::mndsi;
use crate::mask::AoiMask;

/// One entry of the snow-covered-area time series.
#[derive(Debug, Clone, Serialize)]
pub struct SnowCoverRecord {
    pub date: NaiveDate,
    /// Area classified as snow, in squared CRS units (m² for UTM).
    pub snow_area_m2: f64,
    /// Area of valid (measured, in-AOI) pixels the estimate is based on.
    pub valid_area_m2: f64,
    /// snow / valid pixel ratio; 0 when nothing was measurable.
    pub snow_fraction: f64,
}

/// Classify a mosaic against the threshold, returning a single-band plane:
/// 1.0 = snow, 0.0 = no snow, NaN = no data or outside the AOI.
pub fn classify_snow(mosaic: &Raster, threshold: f64, mask: &AoiMask) -> Vec<f32> {
    let mut plane = vec![f32::NAN; mosaic.len()];
    for row in 0..mosaic.height {
        for col in 0..mosaic.width {
            if !mask.contains(col, row) {
                continue;
            }
            let index = mndsi(
                mosaic.sample(Band::Nir, col, row),
                mosaic.sample(Band::Red, col, row),
            );
            if index.is_nan() {
                continue; // excluded from numerator and denominator alike
            }
            plane[row * mosaic.width + col] = if index as f64 >= threshold { 1.0 } else { 0.0 };
        }
    }
    plane
}

/// Compute the snow-covered area of one mosaic.
///
/// Counts snow pixels inside the mask and multiplies by the per-pixel ground
/// area. Pixels with any missing band are excluded from both counts, so
/// cloudy mosaics report less valid area rather than inflated snow cover.
pub fn estimate_area(
    mosaic: &Raster,
    date: NaiveDate,
    threshold: f64,
    mask: &AoiMask,
) -> SnowCoverRecord {
    let plane = classify_snow(mosaic, threshold, mask);

    let mut snow_count = 0usize;
    let mut valid_count = 0usize;
    for &value in &plane {
        if value.is_nan() {
            continue;
        }
        valid_count += 1;
        if value == 1.0 {
            snow_count += 1;
        }
    }

    let pixel_area = mosaic.transform.pixel_area();
    let snow_fraction = if valid_count > 0 {
        snow_count as f64 / valid_count as f64
    } else {
        0.0
    };

    debug!(
        %date,
        snow_count,
        valid_count,
        pixel_area,
        "Estimated snow-covered area"
    );

    SnowCoverRecord {
        date,
        snow_area_m2: snow_count as f64 * pixel_area,
        valid_area_m2: valid_count as f64 * pixel_area,
        snow_fraction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sca_common::GeoTransform;
    use test_utils::raster_from_nir_red;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 7, 14).unwrap()
    }

    #[test]
    fn test_mixed_mosaic_half_snow() {
        // 2x2 mosaic with NIR/red pairs and threshold 0.3:
        // indices (0.667, 0, 0.895, -0.2) -> 2 snow pixels
        let mosaic =
            raster_from_nir_red(2, 2, &[(0.5, 0.1), (0.4, 0.4), (0.9, 0.05), (0.2, 0.3)]);
        let mask = AoiMask::full(&mosaic);

        let record = estimate_area(&mosaic, date(), 0.3, &mask);
        let pixel_area = mosaic.transform.pixel_area();
        assert_eq!(record.snow_area_m2, 2.0 * pixel_area);
        assert_eq!(record.valid_area_m2, 4.0 * pixel_area);
        assert_eq!(record.snow_fraction, 0.5);
    }

    #[test]
    fn test_area_is_count_times_resolution_squared() {
        // every pixel snow, fully valid mask
        let mosaic = raster_from_nir_red(3, 2, &[(0.9, 0.1); 6]);
        let mask = AoiMask::full(&mosaic);

        let record = estimate_area(&mosaic, date(), 0.3, &mask);
        let (rx, ry) = mosaic.transform.resolution();
        assert_eq!(record.snow_area_m2, 6.0 * rx * ry);
        assert_eq!(record.snow_fraction, 1.0);
    }

    #[test]
    fn test_monotonic_in_threshold() {
        let mosaic =
            raster_from_nir_red(2, 2, &[(0.5, 0.1), (0.4, 0.4), (0.9, 0.05), (0.2, 0.3)]);
        let mask = AoiMask::full(&mosaic);

        let mut last_snow = f64::INFINITY;
        for threshold in [-1.0, -0.2, 0.0, 0.3, 0.7, 0.9, 1.1] {
            let record = estimate_area(&mosaic, date(), threshold, &mask);
            assert!(
                record.snow_area_m2 <= last_snow,
                "raising the threshold grew the snow area at T={threshold}"
            );
            last_snow = record.snow_area_m2;
        }
    }

    #[test]
    fn test_invalid_pixels_excluded_from_both_counts() {
        let mut mosaic =
            raster_from_nir_red(2, 2, &[(0.9, 0.1), (0.9, 0.1), (0.9, 0.1), (0.9, 0.1)]);
        mosaic.set_sample(Band::Nir, 1, 1, f32::NAN);
        let mask = AoiMask::full(&mosaic);

        let record = estimate_area(&mosaic, date(), 0.3, &mask);
        let pixel_area = mosaic.transform.pixel_area();
        assert_eq!(record.snow_area_m2, 3.0 * pixel_area);
        assert_eq!(record.valid_area_m2, 3.0 * pixel_area);
        assert_eq!(record.snow_fraction, 1.0);
    }

    #[test]
    fn test_all_invalid_yields_zero_fraction() {
        let transform = GeoTransform::north_up(0.0, 0.0, 3.0);
        let mosaic = sca_common::Raster::filled_no_data(2, 2, transform, test_utils::test_crs());
        let mask = AoiMask::full(&mosaic);

        let record = estimate_area(&mosaic, date(), 0.3, &mask);
        assert_eq!(record.snow_area_m2, 0.0);
        assert_eq!(record.valid_area_m2, 0.0);
        assert_eq!(record.snow_fraction, 0.0);
    }

    #[test]
    fn test_classified_plane_values() {
        let mosaic =
            raster_from_nir_red(2, 2, &[(0.5, 0.1), (0.4, 0.4), (0.9, 0.05), (0.2, 0.3)]);
        let mask = AoiMask::full(&mosaic);

        let plane = classify_snow(&mosaic, 0.3, &mask);
        assert_eq!(plane[0], 1.0); // 0.667
        assert_eq!(plane[1], 0.0); // 0.0
        assert_eq!(plane[2], 1.0); // 0.895
        assert_eq!(plane[3], 0.0); // -0.2
    }
}
