//! Wire types for the imagery API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use sca_common::BoundingBox;

/// Parameters of a scene search.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// AOI in geographic coordinates, as the vendor expects.
    pub aoi: BoundingBox,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Maximum acceptable cloud cover fraction in [0, 1].
    pub max_cloud_cover: f64,
}

impl SearchQuery {
    /// Build the JSON filter posted to the search endpoint.
    pub fn filter_json(&self) -> serde_json::Value {
        json!({
            "filter": {
                "type": "and",
                "clauses": [
                    {
                        "type": "date_range",
                        "field": "acquired",
                        "gte": self.start.to_rfc3339(),
                        "lte": self.end.to_rfc3339(),
                    },
                    {
                        "type": "geometry",
                        "geometry": {
                            "type": "Polygon",
                            "coordinates": [self.aoi.corner_ring()],
                        },
                    },
                    {
                        "type": "range",
                        "field": "cloud_cover",
                        "lte": self.max_cloud_cover,
                    },
                ],
            },
        })
    }
}

/// One page of search results.
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    pub scenes: Vec<SceneRecord>,
    /// Absolute URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
}

/// Scene metadata returned by the vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneRecord {
    pub id: String,
    pub acquired: DateTime<Utc>,
    pub cloud_cover: f64,
    /// Footprint in geographic coordinates.
    pub bbox: BoundingBox,
    pub download_url: String,
}
