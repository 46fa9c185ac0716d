//! Manually digitized reference points used once, at calibration time.

use std::path::Path;

use serde::Deserialize;

use sca_common::{ScaError, ScaResult};

/// Label assigned to a digitized point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointLabel {
    Snow,
    NonSnow,
}

impl PointLabel {
    pub fn is_snow(self) -> bool {
        matches!(self, PointLabel::Snow)
    }
}

/// One labeled coordinate in the working CRS.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReferencePoint {
    pub x: f64,
    pub y: f64,
    pub label: PointLabel,
}

/// Load reference points from a CSV table with `x,y,label` columns.
///
/// The label column holds "snow" or "non-snow". An empty table is fatal: no
/// threshold can be derived without it.
pub fn load_reference_points(path: &Path) -> ScaResult<Vec<ReferencePoint>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| ScaError::MalformedReference(format!("{}: {}", path.display(), e)))?;

    let mut points = Vec::new();
    for record in reader.deserialize() {
        let point: ReferencePoint =
            record.map_err(|e| ScaError::MalformedReference(e.to_string()))?;
        points.push(point);
    }

    if points.is_empty() {
        return Err(ScaError::EmptyReferenceSet);
    }

    Ok(points)
}
