//! The four pipeline stages, run strictly in sequence.
//!
//! Each stage consumes the previous stage's files from the configured
//! directories, so stages can also be re-run individually. Per-date failures
//! are logged and skipped; failures that invalidate the whole run (no API
//! key, empty reference set) abort.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use tracing::{info, warn};
use walkdir::WalkDir;

use geotiff_codec::{read_raster, write_classified, write_raster};
use sca_classify::{
    calibrate_threshold, classify_snow, estimate_area, load_reference_points,
    sample_reference_points, AoiMask, SnowCoverRecord, Threshold,
};
use sca_common::{parse_scene_filename, BoundingBox, Raster, Scene};
use sca_mosaic::{group_by_date, merge_scenes};
use scene_api::{ImageryClient, SearchQuery};

use crate::aoi::load_polygon_ring;
use crate::config::SiteConfig;

pub const THRESHOLD_FILENAME: &str = "threshold.json";
pub const SERIES_FILENAME: &str = "snow_covered_area.csv";

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stage {
    Acquire,
    Mosaic,
    Calibrate,
    Estimate,
}

/// Query the vendor API and download matching scenes.
///
/// Returns the number of scenes on disk afterwards (downloads already
/// present are skipped by the client).
pub async fn run_acquire(config: &SiteConfig) -> Result<usize> {
    let api_key = config.api.api_key()?;
    let client = ImageryClient::new(&config.api.base_url, api_key)?;

    let start = config
        .query
        .start_date
        .and_hms_opt(0, 0, 0)
        .expect("midnight exists")
        .and_utc();
    let end = config
        .query
        .end_date
        .and_hms_opt(23, 59, 59)
        .expect("valid time")
        .and_utc();

    let query = SearchQuery {
        aoi: config.aoi.search_bbox,
        start,
        end,
        max_cloud_cover: config.query.max_cloud_cover,
    };

    let scenes = client
        .search(&query)
        .await
        .context("Scene search against the vendor API failed")?;

    let mut downloaded = 0;
    for scene in &scenes {
        if !config.query.month_in_window(scene.acquired.month()) {
            continue;
        }
        client
            .download_scene(scene, &config.paths.scenes_dir)
            .await
            .with_context(|| format!("Failed to download scene {}", scene.id))?;
        downloaded += 1;
    }

    info!(
        found = scenes.len(),
        downloaded,
        dir = %config.paths.scenes_dir.display(),
        "Acquisition complete"
    );
    Ok(downloaded)
}

/// Merge same-date scenes into one mosaic per date.
///
/// Dates with incompatible tiles or no valid AOI data are skipped with a
/// warning; existing mosaics are not rebuilt.
pub fn run_mosaic(config: &SiteConfig) -> Result<usize> {
    let scenes = load_scenes(&config.paths.scenes_dir)?;
    if scenes.is_empty() {
        warn!(dir = %config.paths.scenes_dir.display(), "No scenes found to mosaic");
        return Ok(0);
    }

    let retain_bbox = working_extent(config)?;
    std::fs::create_dir_all(&config.paths.mosaics_dir)?;

    let mut written = 0;
    for mut group in group_by_date(scenes) {
        let out_path = config.paths.mosaics_dir.join(format!("{}.tif", group.date));
        if out_path.exists() {
            info!(date = %group.date, "Mosaic already exists, skipping");
            continue;
        }

        if let Some(bbox) = &retain_bbox {
            group.retain_scenes_with_data(bbox);
        }
        if group.scenes.is_empty() {
            warn!(date = %group.date, "No scenes with valid AOI data, skipping date");
            continue;
        }

        match merge_scenes(group.date, &group.scenes) {
            Ok(mosaic) => {
                write_raster(&out_path, &mosaic)
                    .with_context(|| format!("Failed to write mosaic {}", out_path.display()))?;
                info!(
                    date = %group.date,
                    tiles = group.scenes.len(),
                    width = mosaic.width,
                    height = mosaic.height,
                    "Wrote mosaic"
                );
                written += 1;
            }
            Err(e) => warn!(date = %group.date, error = %e, "Skipping date, mosaic failed"),
        }
    }

    info!(written, "Mosaicking complete");
    Ok(written)
}

/// Derive (or adopt) the snow threshold and persist it.
pub fn run_calibrate(config: &SiteConfig) -> Result<Threshold> {
    std::fs::create_dir_all(&config.paths.output_dir)?;
    let out_path = config.paths.output_dir.join(THRESHOLD_FILENAME);

    if let Some(value) = config.calibration.threshold {
        let threshold = Threshold::fixed(value);
        threshold.save(&out_path)?;
        info!(threshold = value, "Using fixed threshold from config");
        return Ok(threshold);
    }

    let points_path = config
        .calibration
        .reference_points
        .as_ref()
        .context("calibration.reference_points is required when no fixed threshold is set")?;
    let date = config
        .calibration
        .date
        .context("calibration.date is required when no fixed threshold is set")?;

    let mosaic_path = config.paths.mosaics_dir.join(format!("{}.tif", date));
    let mosaic = read_raster(&mosaic_path).with_context(|| {
        format!(
            "Missing calibration mosaic {}; run the mosaic stage first",
            mosaic_path.display()
        )
    })?;

    let points = load_reference_points(points_path)?;
    let samples = sample_reference_points(&mosaic, &points);
    let mut threshold = calibrate_threshold(&samples)?;
    threshold.calibrated_on = Some(date);
    threshold.save(&out_path)?;

    info!(
        threshold = threshold.value,
        samples = threshold.samples,
        misclassified = threshold.misclassified,
        "Calibration complete"
    );
    Ok(threshold)
}

/// Classify every mosaic and emit the snow-covered-area series.
pub fn run_estimate(config: &SiteConfig) -> Result<Vec<SnowCoverRecord>> {
    let threshold_path = config.paths.output_dir.join(THRESHOLD_FILENAME);
    let threshold = Threshold::load(&threshold_path).with_context(|| {
        format!(
            "No threshold at {}; run the calibrate stage first",
            threshold_path.display()
        )
    })?;

    let ring = match &config.aoi.polygon_file {
        Some(path) => Some(load_polygon_ring(path)?),
        None => None,
    };
    if ring.is_none() && config.aoi.mask_bbox.is_none() {
        warn!("No AOI polygon or mask bbox configured, counting the full mosaic extent");
    }

    let mosaics = list_mosaics(&config.paths.mosaics_dir)?;
    if mosaics.is_empty() {
        bail!(
            "No mosaics in {}; run the mosaic stage first",
            config.paths.mosaics_dir.display()
        );
    }

    let classified_dir = config.paths.output_dir.join("classified");
    if config.output.write_classified {
        std::fs::create_dir_all(&classified_dir)?;
    }

    let mut records = Vec::with_capacity(mosaics.len());
    for (date, path) in mosaics {
        let mosaic = match read_raster(&path) {
            Ok(raster) => raster,
            Err(e) => {
                warn!(date = %date, error = %e, "Unreadable mosaic, skipping date");
                continue;
            }
        };

        let mask = build_mask(&mosaic, &ring, &config.aoi.mask_bbox);
        let record = estimate_area(&mosaic, date, threshold.value, &mask);
        info!(
            date = %date,
            snow_area_m2 = record.snow_area_m2,
            snow_fraction = record.snow_fraction,
            "Estimated snow cover"
        );

        if config.output.write_classified {
            let plane = classify_snow(&mosaic, threshold.value, &mask);
            let out = classified_dir.join(format!("{}.tif", date));
            write_classified(&out, &plane, mosaic.width, mosaic.height, &mosaic.transform, mosaic.crs)
                .with_context(|| format!("Failed to write classified raster {}", out.display()))?;
        }

        records.push(record);
    }

    let series_path = config.paths.output_dir.join(SERIES_FILENAME);
    let mut writer = csv::Writer::from_path(&series_path)
        .with_context(|| format!("Failed to open {}", series_path.display()))?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(
        dates = records.len(),
        path = %series_path.display(),
        "Snow-covered-area series written"
    );
    Ok(records)
}

/// Read every downloaded scene in the directory; unreadable or foreign files
/// are skipped with a warning.
fn load_scenes(dir: &Path) -> Result<Vec<Scene>> {
    let mut scenes = Vec::new();
    if !dir.exists() {
        return Ok(scenes);
    }

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let Some((acquired, id)) = parse_scene_filename(&name) else {
            continue;
        };

        match read_raster(entry.path()) {
            Ok(raster) => scenes.push(Scene::new(id, acquired, raster)),
            Err(e) => warn!(file = %name, error = %e, "Unreadable scene, skipping"),
        }
    }

    Ok(scenes)
}

/// Mosaic files named `<date>.tif`, sorted chronologically.
fn list_mosaics(dir: &Path) -> Result<Vec<(NaiveDate, std::path::PathBuf)>> {
    let mut mosaics = Vec::new();
    if !dir.exists() {
        return Ok(mosaics);
    }

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(stem) = name.strip_suffix(".tif") else {
            continue;
        };
        match NaiveDate::parse_from_str(stem, "%Y-%m-%d") {
            Ok(date) => mosaics.push((date, entry.path().to_path_buf())),
            Err(_) => warn!(file = %name, "File does not look like a mosaic, skipping"),
        }
    }

    mosaics.sort_by_key(|(date, _)| *date);
    Ok(mosaics)
}

/// AOI extent in the working CRS, used to drop empty tiles before merging.
fn working_extent(config: &SiteConfig) -> Result<Option<BoundingBox>> {
    if let Some(path) = &config.aoi.polygon_file {
        let ring = load_polygon_ring(path)?;
        let first = ring[0];
        let bbox = ring.iter().fold(
            BoundingBox::new(first[0], first[1], first[0], first[1]),
            |acc, &[x, y]| acc.union(&BoundingBox::new(x, y, x, y)),
        );
        return Ok(Some(bbox));
    }
    Ok(config.aoi.mask_bbox)
}

fn build_mask(mosaic: &Raster, ring: &Option<Vec<[f64; 2]>>, bbox: &Option<BoundingBox>) -> AoiMask {
    match (ring, bbox) {
        (Some(ring), _) => AoiMask::from_polygon(mosaic, ring),
        (None, Some(bbox)) => AoiMask::from_bbox(mosaic, bbox),
        (None, None) => AoiMask::full(mosaic),
    }
}
