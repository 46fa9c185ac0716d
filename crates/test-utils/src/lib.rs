//! Shared test utilities for the snow-cover mapping workspace.
//!
//! Provides deterministic raster, scene, and timestamp generators used by
//! unit and integration tests across the crates.

pub mod generators;

pub use generators::{
    raster_at, raster_from_nir_red, scene_at, scene_with, test_crs, uniform_raster, utc,
};
