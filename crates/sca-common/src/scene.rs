//! Downloaded scene: a raster plus its acquisition metadata.

use crate::raster::Raster;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A single downloaded image tile.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Vendor scene id.
    pub id: String,
    /// Capture timestamp.
    pub acquired: DateTime<Utc>,
    pub raster: Raster,
}

impl Scene {
    pub fn new(id: impl Into<String>, acquired: DateTime<Utc>, raster: Raster) -> Self {
        Self {
            id: id.into(),
            acquired,
            raster,
        }
    }

    /// UTC calendar date the scene was captured on. Same-date scenes merge
    /// into one mosaic.
    pub fn acquisition_date(&self) -> NaiveDate {
        self.acquired.date_naive()
    }
}

/// Filename for a downloaded scene, e.g. "20210714T213045_2457B1.tif".
///
/// The timestamp prefix lets later stages recover acquisition time without
/// re-querying the vendor API.
pub fn scene_filename(id: &str, acquired: DateTime<Utc>) -> String {
    format!("{}_{}.tif", acquired.format("%Y%m%dT%H%M%S"), id)
}

/// Parse a scene filename back into (acquired, id).
///
/// Returns None for files that do not follow the download naming scheme.
pub fn parse_scene_filename(name: &str) -> Option<(DateTime<Utc>, String)> {
    let stem = name.strip_suffix(".tif")?;
    let (stamp, id) = stem.split_once('_')?;
    if id.is_empty() {
        return None;
    }

    let naive = NaiveDateTime::parse_from_str(stamp, "%Y%m%dT%H%M%S").ok()?;
    Some((naive.and_utc(), id.to_string()))
}
