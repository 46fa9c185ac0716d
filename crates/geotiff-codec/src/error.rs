//! Error type for GeoTIFF decoding and encoding.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoTiffError {
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Missing georeferencing tag: {0}")]
    MissingGeoTag(&'static str),

    #[error("Malformed {tag} tag: expected at least {expected} values, found {found}")]
    MalformedGeoTag {
        tag: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Expected a 4-band raster, found {0} samples per pixel")]
    BandCount(usize),

    #[error("Unsupported sample format in {0}")]
    UnsupportedFormat(String),
}
