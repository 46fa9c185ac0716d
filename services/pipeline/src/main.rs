//! Snow-cover mapping pipeline.
//!
//! Runs four stages in order against one study site:
//! - acquire: search the vendor API and download matching scenes
//! - mosaic: merge same-date scenes into one raster per date
//! - calibrate: derive the snow threshold from labeled reference points
//! - estimate: classify each mosaic and emit the snow-covered-area series

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pipeline::config::SiteConfig;
use pipeline::stages::{self, Stage};

#[derive(Parser, Debug)]
#[command(name = "pipeline")]
#[command(about = "Glacier snow-cover mapping from 4-band satellite imagery")]
struct Args {
    /// Site configuration file
    #[arg(short, long, env = "SITE_CONFIG", default_value = "config/site.yaml")]
    config: PathBuf,

    /// Stages to run, in pipeline order (default: all)
    #[arg(long, value_enum, value_delimiter = ',')]
    stages: Vec<Stage>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = SiteConfig::load(&args.config)?;
    info!(site = %config.site.name, config = %args.config.display(), "Starting pipeline");

    let requested = if args.stages.is_empty() {
        vec![Stage::Acquire, Stage::Mosaic, Stage::Calibrate, Stage::Estimate]
    } else {
        args.stages
    };

    // Always execute in pipeline order, whatever order they were given in.
    for stage in [Stage::Acquire, Stage::Mosaic, Stage::Calibrate, Stage::Estimate] {
        if !requested.contains(&stage) {
            continue;
        }
        match stage {
            Stage::Acquire => {
                stages::run_acquire(&config).await?;
            }
            Stage::Mosaic => {
                stages::run_mosaic(&config)?;
            }
            Stage::Calibrate => {
                stages::run_calibrate(&config)?;
            }
            Stage::Estimate => {
                stages::run_estimate(&config)?;
            }
        }
    }

    info!("Pipeline complete");
    Ok(())
}
