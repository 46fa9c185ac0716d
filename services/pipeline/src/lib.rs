//! Library surface of the pipeline service, split out so integration tests
//! can drive individual stages without spawning the binary.

pub mod aoi;
pub mod config;
pub mod stages;
