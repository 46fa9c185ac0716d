//! Client for the vendor imagery API.
//!
//! Scene search is a paginated JSON filter query; downloads are
//! API-key-authenticated GETs streamed to disk with bounded retry and
//! exponential backoff. Everything is sequential: the pipeline walks scenes
//! one at a time.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ImageryClient, RetryConfig};
pub use error::{ApiError, ApiResult};
pub use types::{SceneRecord, SearchPage, SearchQuery};
