//! One-shot threshold calibration from labeled reference points.
//!
//! The calibrator scans candidate thresholds over the observed index range
//! and keeps the value that misclassifies the fewest labeled points, with
//! ties broken by proximity to a canonical snow-index anchor. It never
//! retrains: the chosen threshold is written out once and reused read-only.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sca_common::{Band, Raster, ScaError, ScaResult};

use crate::index::mndsi;
use crate::reference::ReferencePoint;

/// A reference point reduced to its sampled index value and label.
#[derive(Debug, Clone, Copy)]
pub struct LabeledIndex {
    pub index: f64,
    pub is_snow: bool,
}

/// The calibrated threshold plus provenance, persisted as threshold.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threshold {
    /// Pixels with MNDSI >= value classify as snow.
    pub value: f64,
    /// Number of labeled samples the calibration saw.
    pub samples: usize,
    /// Labeled samples the chosen threshold still gets wrong.
    pub misclassified: usize,
    /// Mosaic date the calibration ran against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibrated_on: Option<NaiveDate>,
}

impl Threshold {
    /// A fixed threshold supplied by configuration instead of calibration.
    pub fn fixed(value: f64) -> Self {
        Self {
            value,
            samples: 0,
            misclassified: 0,
            calibrated_on: None,
        }
    }

    pub fn save(&self, path: &Path) -> ScaResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> ScaResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Sample the spectral index at each reference point on the calibration
/// mosaic (nearest-pixel lookup).
///
/// Points outside the grid or landing on no-data pixels are dropped with a
/// warning; manual digitization routinely leaves a few strays.
pub fn sample_reference_points(mosaic: &Raster, points: &[ReferencePoint]) -> Vec<LabeledIndex> {
    let mut samples = Vec::with_capacity(points.len());

    for point in points {
        let Some((col, row)) =
            mosaic
                .transform
                .coord_to_pixel(point.x, point.y, mosaic.width, mosaic.height)
        else {
            warn!(x = point.x, y = point.y, "Reference point outside the mosaic, dropping");
            continue;
        };

        let nir = mosaic.sample(Band::Nir, col, row);
        let red = mosaic.sample(Band::Red, col, row);
        let index = mndsi(nir, red);
        if index.is_nan() {
            warn!(x = point.x, y = point.y, "Reference point on a no-data pixel, dropping");
            continue;
        }

        samples.push(LabeledIndex {
            index: index as f64,
            is_snow: point.label.is_snow(),
        });
    }

    samples
}

/// Canonical snow-index anchor: fresh snow sits well above it, bare ground
/// and water well below. When the labeled populations leave a wide gap, the
/// threshold lands here instead of drifting to the gap midpoint.
const THRESHOLD_ANCHOR: f64 = 0.35;

/// Derive the threshold separating snow from non-snow index populations.
///
/// Candidates are the midpoints between adjacent distinct observed values,
/// plus one candidate classifying everything as snow and one classifying
/// nothing. The candidate misclassifying the fewest samples wins, ties broken
/// by proximity to [`THRESHOLD_ANCHOR`]; the final value then snaps to the
/// anchor when the anchor falls inside the winning candidate's separating
/// interval (any threshold there classifies the samples identically).
/// Non-finite sample indices are dropped; an empty or single-class set after
/// dropping is a fatal error.
pub fn calibrate_threshold(samples: &[LabeledIndex]) -> ScaResult<Threshold> {
    let samples: Vec<LabeledIndex> = samples
        .iter()
        .copied()
        .filter(|s| {
            if !s.index.is_finite() {
                warn!(index = s.index, "Dropping non-finite index sample");
            }
            s.index.is_finite()
        })
        .collect();

    if samples.is_empty() {
        return Err(ScaError::EmptyReferenceSet);
    }
    if samples.iter().all(|s| s.is_snow) {
        return Err(ScaError::SingleClassReferenceSet("snow".to_string()));
    }
    if samples.iter().all(|s| !s.is_snow) {
        return Err(ScaError::SingleClassReferenceSet("non-snow".to_string()));
    }

    let mut values: Vec<f64> = samples.iter().map(|s| s.index).collect();
    values.sort_by(|a, b| a.partial_cmp(b).expect("indices filtered finite"));
    values.dedup();

    let mut candidates = Vec::with_capacity(values.len() + 1);
    candidates.push(values[0]); // everything classifies as snow
    for pair in values.windows(2) {
        candidates.push((pair[0] + pair[1]) / 2.0);
    }
    candidates.push(values[values.len() - 1] + 1.0); // nothing classifies as snow

    let mut best: Option<(f64, usize)> = None;
    for candidate in candidates {
        let misclassified = samples
            .iter()
            .filter(|s| (s.index >= candidate) != s.is_snow)
            .count();

        let better = match best {
            None => true,
            Some((best_value, best_miss)) => {
                misclassified < best_miss
                    || (misclassified == best_miss
                        && (candidate - THRESHOLD_ANCHOR).abs()
                            < (best_value - THRESHOLD_ANCHOR).abs())
            }
        };
        if better {
            best = Some((candidate, misclassified));
        }
    }

    let (candidate, misclassified) = best.expect("at least one candidate");
    let value = snap_to_anchor(candidate, &values);
    debug!(
        threshold = value,
        misclassified,
        samples = samples.len(),
        "Calibrated snow threshold"
    );

    Ok(Threshold {
        value,
        samples: samples.len(),
        misclassified,
        calibrated_on: None,
    })
}

/// Move the threshold to the anchor when doing so classifies every observed
/// value the same way the candidate does.
///
/// The separating interval of a candidate `c` is `(lo, hi]` with `lo` the
/// largest observed value below `c` and `hi` the smallest at or above it;
/// every threshold in that interval splits the samples identically.
fn snap_to_anchor(candidate: f64, values: &[f64]) -> f64 {
    let lo = values
        .iter()
        .copied()
        .filter(|&v| v < candidate)
        .fold(f64::NEG_INFINITY, f64::max);
    let hi = values
        .iter()
        .copied()
        .filter(|&v| v >= candidate)
        .fold(f64::INFINITY, f64::min);

    if THRESHOLD_ANCHOR > lo && THRESHOLD_ANCHOR <= hi {
        THRESHOLD_ANCHOR
    } else {
        candidate
    }
}
