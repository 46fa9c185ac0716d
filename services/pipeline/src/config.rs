//! Site configuration loading.
//!
//! One YAML file per study site carries everything the run needs: API
//! credentials source, date window, AOI, directories, and calibration inputs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use sca_common::BoundingBox;

/// Root configuration loaded from a site YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub site: SiteInfo,
    pub api: ApiConfig,
    pub query: QueryConfig,
    pub aoi: AoiConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Basic site identification.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Vendor API access.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Name of the environment variable holding the API key. The key itself
    /// never lives in the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_api_key_env() -> String {
    "IMAGERY_API_KEY".to_string()
}

impl ApiConfig {
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .with_context(|| format!("API key environment variable {} not set", self.api_key_env))
    }
}

/// Scene query window.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Maximum cloud cover fraction in [0, 1].
    #[serde(default = "default_max_cloud_cover")]
    pub max_cloud_cover: f64,
    /// Optional seasonal window: only download scenes captured in
    /// month_start..=month_end.
    #[serde(default)]
    pub month_start: Option<u32>,
    #[serde(default)]
    pub month_end: Option<u32>,
}

fn default_max_cloud_cover() -> f64 {
    0.5
}

impl QueryConfig {
    /// Check a capture month against the optional seasonal window.
    pub fn month_in_window(&self, month: u32) -> bool {
        match (self.month_start, self.month_end) {
            (Some(start), Some(end)) => month >= start && month <= end,
            (Some(start), None) => month >= start,
            (None, Some(end)) => month <= end,
            (None, None) => true,
        }
    }
}

/// Area of interest, in two reference frames.
///
/// The vendor search runs in geographic coordinates; masking and area math
/// run on the scene grids in the working (UTM) CRS. No reprojection happens
/// in the pipeline, so both are configured explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct AoiConfig {
    /// Search footprint in lon/lat.
    pub search_bbox: BoundingBox,
    /// Polygon file (GeoJSON) with the AOI ring in the working CRS.
    #[serde(default)]
    pub polygon_file: Option<PathBuf>,
    /// Rectangular AOI in the working CRS, used when no polygon is given.
    #[serde(default)]
    pub mask_bbox: Option<BoundingBox>,
}

/// Working directories, all created on demand.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_scenes_dir")]
    pub scenes_dir: PathBuf,
    #[serde(default = "default_mosaics_dir")]
    pub mosaics_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            scenes_dir: default_scenes_dir(),
            mosaics_dir: default_mosaics_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_scenes_dir() -> PathBuf {
    PathBuf::from("data/scenes")
}

fn default_mosaics_dir() -> PathBuf {
    PathBuf::from("data/mosaics")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/outputs")
}

/// Threshold calibration inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationConfig {
    /// Labeled snow / non-snow coordinates (CSV: x,y,label).
    #[serde(default)]
    pub reference_points: Option<PathBuf>,
    /// Mosaic date the reference points were digitized against.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Fixed threshold override; skips calibration entirely.
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Output options.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputConfig {
    /// Also write a classified raster per date next to the CSV series.
    #[serde(default)]
    pub write_classified: bool,
}

impl SiteConfig {
    /// Load a site configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(site = %config.site.name, path = %path.display(), "Loaded site config");
        Ok(config)
    }
}
