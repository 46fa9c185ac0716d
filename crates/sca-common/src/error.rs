//! Error types for the snow-cover mapping workspace.

use thiserror::Error;

/// Result type alias using ScaError.
pub type ScaResult<T> = Result<T, ScaError>;

/// Primary error type for snow-cover analysis operations.
#[derive(Debug, Error)]
pub enum ScaError {
    // === Mosaic Errors ===
    #[error("CRS mismatch while mosaicking: expected {expected}, found {found}")]
    CrsMismatch { expected: String, found: String },

    #[error("Resolution mismatch while mosaicking: expected {expected:?}, found {found:?}")]
    ResolutionMismatch {
        expected: (f64, f64),
        found: (f64, f64),
    },

    #[error("No scenes to mosaic for {0}")]
    EmptyMosaic(String),

    #[error("No valid pixels inside the AOI for {0}")]
    NoValidData(String),

    // === Calibration Errors ===
    #[error("Reference point set is empty, cannot calibrate a threshold")]
    EmptyReferenceSet,

    #[error("Reference point set contains only '{0}' points, cannot calibrate a threshold")]
    SingleClassReferenceSet(String),

    #[error("Malformed reference point table: {0}")]
    MalformedReference(String),

    // === Raster Errors ===
    #[error("Failed to read raster: {0}")]
    RasterReadError(String),

    #[error("Failed to write raster: {0}")]
    RasterWriteError(String),

    // === Configuration Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Infrastructure Errors ===
    #[error("Internal error: {0}")]
    InternalError(String),
}

// Conversion from common error types
impl From<std::io::Error> for ScaError {
    fn from(err: std::io::Error) -> Self {
        ScaError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for ScaError {
    fn from(err: serde_json::Error) -> Self {
        ScaError::InternalError(format!("JSON error: {}", err))
    }
}
