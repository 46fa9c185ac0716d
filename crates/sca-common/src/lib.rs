//! Common types shared across the snow-cover mapping workspace.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod raster;
pub mod scene;

pub use bbox::BoundingBox;
pub use crs::Crs;
pub use error::{ScaError, ScaResult};
pub use raster::{Band, GeoTransform, Raster, NO_DATA};
pub use scene::{parse_scene_filename, scene_filename, Scene};
