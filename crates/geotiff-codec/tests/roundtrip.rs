//! GeoTIFF encode/decode round trips through real files.

use geotiff_codec::{read_raster, write_classified, write_raster};
use sca_common::{Band, Crs, GeoTransform, Raster};
use test_utils::{raster_from_nir_red, uniform_raster};

#[test]
fn raster_round_trip_preserves_grid_and_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.tif");

    let original = raster_from_nir_red(3, 2, &[(0.5, 0.1), (0.4, 0.4), (0.9, 0.05), (0.2, 0.3), (0.7, 0.2), (0.1, 0.6)]);
    write_raster(&path, &original).unwrap();

    let loaded = read_raster(&path).unwrap();
    assert_eq!(loaded.width, 3);
    assert_eq!(loaded.height, 2);
    assert_eq!(loaded.crs, Crs::new(32606));
    assert_eq!(loaded.transform, original.transform);

    for band in Band::ALL {
        for idx in 0..original.len() {
            let (a, b) = (original.band(band)[idx], loaded.band(band)[idx]);
            assert_eq!(a, b, "band {:?} pixel {} changed", band, idx);
        }
    }
}

#[test]
fn no_data_pixels_survive_round_trip_as_nan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("holey.tif");

    let mut original = uniform_raster(4, 4, [0.2, 0.3, 0.25, 0.6]);
    original.set_sample(Band::Nir, 1, 2, f32::NAN);
    write_raster(&path, &original).unwrap();

    let loaded = read_raster(&path).unwrap();
    assert!(loaded.sample(Band::Nir, 1, 2).is_nan());
    assert!(!loaded.pixel_valid(1, 2));
    assert!(loaded.pixel_valid(0, 0));
}

#[test]
fn scaled_integer_reflectance_is_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scaled.tif");

    // reflectance stored as value * 10000, as the vendor's 16-bit products do
    let original = uniform_raster(4, 4, [2000.0, 3000.0, 2500.0, 7000.0]);
    write_raster(&path, &original).unwrap();

    let loaded = read_raster(&path).unwrap();
    assert!((loaded.sample(Band::Blue, 0, 0) - 0.2).abs() < 1e-6);
    assert!((loaded.sample(Band::Nir, 3, 3) - 0.7).abs() < 1e-6);
}

#[test]
fn classified_plane_writes_without_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("classified.tif");

    let transform = GeoTransform::north_up(500000.0, 6700000.0, 3.0);
    let plane = vec![1.0, 0.0, f32::NAN, 1.0];
    write_classified(&path, &plane, 2, 2, &transform, Crs::new(32606)).unwrap();

    assert!(path.exists());
    let bytes = std::fs::read(&path).unwrap();
    assert!(!bytes.is_empty());
}

#[test]
fn missing_geo_tags_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.tif");

    // a plain TIFF without georeferencing
    let file = std::fs::File::create(&path).unwrap();
    let mut encoder = tiff::encoder::TiffEncoder::new(file).unwrap();
    let data = vec![0.5f32; 4 * 4 * 4];
    encoder
        .write_image::<tiff::encoder::colortype::RGBA32Float>(4, 4, &data)
        .unwrap();

    let err = read_raster(&path).unwrap_err();
    assert!(err.to_string().contains("ModelPixelScale"));
}

#[test]
fn band_count_mismatch_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("classified.tif");

    // single-band files are valid outputs but not valid scenes
    let transform = GeoTransform::north_up(500000.0, 6700000.0, 3.0);
    let plane = vec![1.0f32; 4];
    write_classified(&path, &plane, 2, 2, &transform, Crs::new(32606)).unwrap();

    let err = read_raster(&path).unwrap_err();
    assert!(matches!(err, geotiff_codec::GeoTiffError::BandCount(1)));
}

#[test]
fn from_planes_matches_filled() {
    // constructor sanity for the codec's consumers
    let transform = GeoTransform::north_up(0.0, 10.0, 1.0);
    let plane = vec![0.5f32; 6];
    let raster = Raster::from_planes(
        3,
        2,
        transform,
        Crs::new(32606),
        [plane.clone(), plane.clone(), plane.clone(), plane],
    );
    assert_eq!(raster.len(), 6);
    assert!(raster.pixel_valid(2, 1));
}
