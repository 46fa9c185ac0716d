//! GeoTIFF encoding of rasters and classified masks.

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use tiff::encoder::{colortype, DirectoryEncoder, TiffEncoder, TiffKind};
use tiff::tags::Tag;
use tracing::debug;

use sca_common::{Band, Crs, GeoTransform, Raster, NO_DATA};

use crate::error::GeoTiffError;
use crate::{
    geokeys, TAG_GDAL_NODATA, TAG_GEO_KEY_DIRECTORY, TAG_MODEL_PIXEL_SCALE, TAG_MODEL_TIEPOINT,
};

/// Write a 4-band raster as an interleaved float GeoTIFF.
///
/// NaN pixels are stored as the -9999 sentinel.
pub fn write_raster(path: &Path, raster: &Raster) -> Result<(), GeoTiffError> {
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(file)?;

    let mut image =
        encoder.new_image::<colortype::RGBA32Float>(raster.width as u32, raster.height as u32)?;
    write_geo_tags(image.encoder(), &raster.transform, raster.crs)?;

    let mut buf = Vec::with_capacity(raster.len() * 4);
    for idx in 0..raster.len() {
        for band in Band::ALL {
            let value = raster.band(band)[idx];
            buf.push(if value.is_finite() { value } else { NO_DATA });
        }
    }
    image.write_data(&buf)?;

    debug!(path = %path.display(), width = raster.width, height = raster.height, "Wrote raster");
    Ok(())
}

/// Write a single-band classified plane (1 = snow, 0 = no snow, NaN = no
/// data) on the same grid as its source mosaic.
pub fn write_classified(
    path: &Path,
    plane: &[f32],
    width: usize,
    height: usize,
    transform: &GeoTransform,
    crs: Crs,
) -> Result<(), GeoTiffError> {
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(file)?;

    let mut image = encoder.new_image::<colortype::Gray32Float>(width as u32, height as u32)?;
    write_geo_tags(image.encoder(), transform, crs)?;

    let buf: Vec<f32> = plane
        .iter()
        .map(|&v| if v.is_finite() { v } else { NO_DATA })
        .collect();
    image.write_data(&buf)?;

    debug!(path = %path.display(), "Wrote classified raster");
    Ok(())
}

/// Embed pixel scale, tie point, CRS, and the no-data sentinel.
fn write_geo_tags<W: Write + Seek, K: TiffKind>(
    dir: &mut DirectoryEncoder<'_, W, K>,
    transform: &GeoTransform,
    crs: Crs,
) -> Result<(), GeoTiffError> {
    let scale = [transform.pixel_width, transform.pixel_height.abs(), 0.0];
    // tie the upper-left raster corner to the grid origin
    let tiepoint = [0.0, 0.0, 0.0, transform.origin_x, transform.origin_y, 0.0];
    let keys = geokeys::build(crs);

    dir.write_tag(Tag::Unknown(TAG_MODEL_PIXEL_SCALE), &scale[..])?;
    dir.write_tag(Tag::Unknown(TAG_MODEL_TIEPOINT), &tiepoint[..])?;
    dir.write_tag(Tag::Unknown(TAG_GEO_KEY_DIRECTORY), &keys[..])?;
    dir.write_tag(Tag::Unknown(TAG_GDAL_NODATA), "-9999")?;

    Ok(())
}
