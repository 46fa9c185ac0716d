//! GeoTIFF I/O for snow-cover mapping rasters.
//!
//! Scenes and mosaics are 4-band (blue, green, red, nir) float GeoTIFFs with
//! georeferencing embedded via the ModelPixelScale, ModelTiepoint, and
//! GeoKeyDirectory tags. Classified outputs are single-band. The no-data
//! sentinel on disk is -9999; in memory missing pixels are NaN.

pub mod error;
pub mod geokeys;
pub mod reader;
pub mod writer;

pub use error::GeoTiffError;
pub use reader::read_raster;
pub use writer::{write_classified, write_raster};

/// ModelPixelScaleTag: pixel resolution in CRS units.
pub(crate) const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
/// ModelTiepointTag: raster/CRS tie point (upper-left corner).
pub(crate) const TAG_MODEL_TIEPOINT: u16 = 33922;
/// GeoKeyDirectoryTag: CRS description.
pub(crate) const TAG_GEO_KEY_DIRECTORY: u16 = 34735;
/// GDAL's ASCII no-data tag.
pub(crate) const TAG_GDAL_NODATA: u16 = 42113;
