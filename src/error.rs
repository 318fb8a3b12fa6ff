//! Error types for Canvas API access.
//!
//! Listing calls distinguish the two conditions that only mean "this course has no such
//! data for us" (404 and 403) from everything else, so the aggregator can degrade a single
//! category to an empty table while genuine failures still end the run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvasError {
    /// The requested resource does not exist (HTTP 404).
    #[error("Resource not found: {url}")]
    NotFound { url: String },

    /// The session may not read the requested resource (HTTP 403).
    #[error("Access forbidden: {url}")]
    Forbidden { url: String },

    /// The token was rejected (HTTP 401).
    #[error("Invalid or expired credentials for {url}")]
    Unauthorized { url: String },

    /// Any other non-success status.
    #[error("HTTP request to {url} failed with status code: {status}")]
    Status { status: u16, url: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode Canvas response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Credentials error: {0}")]
    Credentials(String),
}

impl CanvasError {
    /// Maps a non-success HTTP status to the matching error variant.
    pub fn from_status(status: u16, url: &str) -> Self {
        let url = url.to_string();
        match status {
            401 => CanvasError::Unauthorized { url },
            403 => CanvasError::Forbidden { url },
            404 => CanvasError::NotFound { url },
            _ => CanvasError::Status { status, url },
        }
    }

    /// True for the conditions that degrade a category to an empty result
    /// (resource does not exist, or access is forbidden).
    pub fn is_absent_resource(&self) -> bool {
        matches!(
            self,
            CanvasError::NotFound { .. } | CanvasError::Forbidden { .. }
        )
    }
}

pub type CanvasResult<T> = Result<T, CanvasError>;
