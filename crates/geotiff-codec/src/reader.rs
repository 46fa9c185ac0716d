//! GeoTIFF decoding into [`Raster`] values.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::debug;

use sca_common::{GeoTransform, Raster, NO_DATA};

use crate::error::GeoTiffError;
use crate::{geokeys, TAG_GEO_KEY_DIRECTORY, TAG_MODEL_PIXEL_SCALE, TAG_MODEL_TIEPOINT};

/// Integer reflectance scenes store values scaled by 10 000. Detected by the
/// band mean: real reflectance never averages above 1.
const REFLECTANCE_SCALAR: f32 = 10000.0;

/// Read a 4-band georeferenced scene or mosaic from disk.
///
/// No-data sentinels become NaN; scaled-integer reflectance is normalized to
/// the [0, 1] range.
pub fn read_raster(path: &Path) -> Result<Raster, GeoTiffError> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(BufReader::new(file))?;

    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let transform = read_transform(&mut decoder)?;
    let crs = decoder
        .find_tag_unsigned_vec::<u16>(Tag::from_u16_exhaustive(TAG_GEO_KEY_DIRECTORY))?
        .as_deref()
        .and_then(geokeys::parse)
        .ok_or(GeoTiffError::MissingGeoTag("GeoKeyDirectory"))?;

    let samples = read_samples(&mut decoder, path)?;
    let n_bands = samples.len() / (width * height);
    if n_bands != 4 {
        return Err(GeoTiffError::BandCount(n_bands));
    }

    // De-interleave into band planes, mapping the sentinel to NaN.
    let mut bands: [Vec<f32>; 4] = Default::default();
    for plane in bands.iter_mut() {
        plane.reserve(width * height);
    }
    for pixel in samples.chunks_exact(4) {
        for (plane, &value) in bands.iter_mut().zip(pixel) {
            plane.push(if value == NO_DATA { f32::NAN } else { value });
        }
    }

    if needs_rescale(&bands[0]) {
        debug!(path = %path.display(), "Rescaling integer reflectance by 1/10000");
        for plane in bands.iter_mut() {
            for value in plane.iter_mut() {
                *value /= REFLECTANCE_SCALAR;
            }
        }
    }

    Ok(Raster::from_planes(width, height, transform, crs, bands))
}

/// Recover the affine transform from the pixel-scale and tie-point tags.
fn read_transform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<GeoTransform, GeoTiffError> {
    let scale = decoder
        .find_tag(Tag::from_u16_exhaustive(TAG_MODEL_PIXEL_SCALE))?
        .ok_or(GeoTiffError::MissingGeoTag("ModelPixelScale"))?
        .into_f64_vec()?;
    if scale.len() < 2 {
        return Err(GeoTiffError::MalformedGeoTag {
            tag: "ModelPixelScale",
            expected: 2,
            found: scale.len(),
        });
    }

    let tiepoint = decoder
        .find_tag(Tag::from_u16_exhaustive(TAG_MODEL_TIEPOINT))?
        .ok_or(GeoTiffError::MissingGeoTag("ModelTiepoint"))?
        .into_f64_vec()?;
    if tiepoint.len() < 6 {
        return Err(GeoTiffError::MalformedGeoTag {
            tag: "ModelTiepoint",
            expected: 6,
            found: tiepoint.len(),
        });
    }

    // Tie point maps raster (i, j) to model (x, y); scene files tie the
    // upper-left corner, so back out the grid origin from it.
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    let (sx, sy) = (scale[0], scale[1]);

    Ok(GeoTransform::new(x - i * sx, y + j * sy, sx, -sy))
}

/// Decode the pixel payload into f32 regardless of on-disk sample format.
fn read_samples<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    path: &Path,
) -> Result<Vec<f32>, GeoTiffError> {
    match decoder.read_image()? {
        DecodingResult::F32(data) => Ok(data),
        DecodingResult::F64(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::U8(data) => Ok(data.into_iter().map(f32::from).collect()),
        DecodingResult::U16(data) => Ok(data.into_iter().map(f32::from).collect()),
        DecodingResult::U32(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::I16(data) => Ok(data.into_iter().map(f32::from).collect()),
        DecodingResult::I32(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        _ => Err(GeoTiffError::UnsupportedFormat(
            path.display().to_string(),
        )),
    }
}

/// Band mean above 1000 means the file stores scaled-integer reflectance.
fn needs_rescale(plane: &[f32]) -> bool {
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for &value in plane {
        if value.is_finite() {
            sum += value as f64;
            count += 1;
        }
    }
    count > 0 && sum / count as f64 > 1000.0
}
