//! Snow classification: spectral index, threshold calibration, and
//! snow-covered-area estimation.
//!
//! The discriminator is MNDSI, the normalized difference between the
//! near-infrared and red bands. A scalar threshold is calibrated once from a
//! labeled reference point set and then applied read-only across the mosaic
//! time series.

pub mod area;
pub mod calibrate;
pub mod index;
pub mod mask;
pub mod reference;

pub use area::{classify_snow, estimate_area, SnowCoverRecord};
pub use calibrate::{calibrate_threshold, sample_reference_points, LabeledIndex, Threshold};
pub use index::mndsi;
pub use mask::AoiMask;
pub use reference::{load_reference_points, PointLabel, ReferencePoint};
