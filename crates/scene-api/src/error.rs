//! Error type for imagery API operations.

use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Download of {url} failed after {attempts} attempts: {message}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        message: String,
    },
}

impl ApiError {
    /// Server-side and transport failures are worth retrying; client errors
    /// (bad key, bad filter) are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ApiError::Status { status, .. } => *status >= 500 || *status == 429,
            ApiError::Io(_) => true,
            ApiError::RetriesExhausted { .. } => false,
        }
    }
}
