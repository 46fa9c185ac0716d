//! Same-date mosaicking of downloaded scene tiles.
//!
//! Scenes are grouped by UTC acquisition date and merged onto a grid
//! covering the union of their extents. Tiles must share CRS and resolution;
//! a mismatched date is reported so the caller can skip it. Where tiles
//! overlap, the most recently captured tile wins.

pub mod group;
pub mod merge;

pub use group::{group_by_date, DateGroup};
pub use merge::merge_scenes;
