//! AOI polygon loading.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Load the exterior ring of an AOI polygon from a GeoJSON file.
///
/// Accepts a bare Polygon geometry, a Feature wrapping one, or a
/// FeatureCollection (first feature wins, matching how digitized AOI
/// shapefiles export to GeoJSON). Coordinates must already be in the
/// working CRS.
pub fn load_polygon_ring(path: &Path) -> Result<Vec<[f64; 2]>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read AOI file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse AOI file: {}", path.display()))?;

    let geometry = unwrap_geometry(&value)
        .with_context(|| format!("No polygon geometry in {}", path.display()))?;

    if geometry["type"] != "Polygon" {
        bail!(
            "AOI geometry must be a Polygon, found {} in {}",
            geometry["type"],
            path.display()
        );
    }

    let ring = geometry["coordinates"][0]
        .as_array()
        .context("Polygon has no exterior ring")?;

    let mut vertices = Vec::with_capacity(ring.len());
    for position in ring {
        let coords = position.as_array().context("Malformed ring position")?;
        if coords.len() < 2 {
            bail!("Ring position with fewer than 2 coordinates");
        }
        let x = coords[0].as_f64().context("Non-numeric x coordinate")?;
        let y = coords[1].as_f64().context("Non-numeric y coordinate")?;
        vertices.push([x, y]);
    }

    if vertices.len() < 3 {
        bail!("AOI ring has fewer than 3 vertices");
    }

    Ok(vertices)
}

fn unwrap_geometry(value: &Value) -> Option<&Value> {
    match value["type"].as_str()? {
        "Polygon" => Some(value),
        "Feature" => Some(&value["geometry"]),
        "FeatureCollection" => value["features"].get(0).map(|f| &f["geometry"]),
        _ => None,
    }
}
