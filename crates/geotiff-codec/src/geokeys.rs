//! GeoKeyDirectory construction and parsing.
//!
//! The directory is a flat u16 array: a 4-value header
//! (version, revision, minor revision, key count) followed by one
//! (key id, tag location, count, value) quad per key. Values small enough to
//! fit in a SHORT are stored inline with tag location 0.

use sca_common::Crs;

const GT_MODEL_TYPE: u16 = 1024;
const GT_RASTER_TYPE: u16 = 1025;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// Build a GeoKeyDirectory describing the given CRS.
pub fn build(crs: Crs) -> Vec<u16> {
    let (model_type, crs_key) = if crs.is_geographic() {
        (MODEL_TYPE_GEOGRAPHIC, GEOGRAPHIC_TYPE)
    } else {
        (MODEL_TYPE_PROJECTED, PROJECTED_CS_TYPE)
    };

    vec![
        1, 1, 0, 3, // header: version 1.1.0, 3 keys
        GT_MODEL_TYPE, 0, 1, model_type,
        GT_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA,
        crs_key, 0, 1, crs.epsg as u16,
    ]
}

/// Extract the EPSG code from a GeoKeyDirectory, if one is present.
///
/// Prefers the projected CS key over the geographic one, matching how UTM
/// scene files carry both.
pub fn parse(directory: &[u16]) -> Option<Crs> {
    if directory.len() < 4 {
        return None;
    }

    let key_count = directory[3] as usize;
    let mut geographic = None;

    for entry in directory[4..].chunks_exact(4).take(key_count) {
        let (key_id, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 {
            // value stored in another tag, not an inline EPSG code
            continue;
        }
        match key_id {
            PROJECTED_CS_TYPE => return Some(Crs::new(value as u32)),
            GEOGRAPHIC_TYPE => geographic = Some(Crs::new(value as u32)),
            _ => {}
        }
    }

    geographic
}
