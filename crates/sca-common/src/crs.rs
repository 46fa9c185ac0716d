//! Coordinate Reference System identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A CRS identified by EPSG code.
///
/// Glacier sites are processed in the UTM zone of the AOI centroid, so any
/// projected EPSG code is accepted; geographic codes appear only in vendor
/// metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs {
    pub epsg: u32,
}

impl Crs {
    pub fn new(epsg: u32) -> Self {
        Self { epsg }
    }

    /// WGS84 geographic (lat/lon in degrees).
    pub fn wgs84() -> Self {
        Self { epsg: 4326 }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self.epsg, 4326 | 4269)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geographic_codes() {
        assert!(Crs::wgs84().is_geographic());
        assert!(!Crs::new(32606).is_geographic());
    }

    #[test]
    fn test_display() {
        assert_eq!(Crs::new(32606).to_string(), "EPSG:32606");
    }
}
