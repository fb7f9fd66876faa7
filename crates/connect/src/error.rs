//! Error types for the connect crate.

use quotebook_core::errors::Error;
use quotebook_core::sync::SyncError;
use thiserror::Error;

/// Result type alias for remote fetch operations.
pub type Result<T> = std::result::Result<T, ConnectError>;

/// Errors that can occur while fetching the remote record set.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response from the remote
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl ConnectError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}

impl From<ConnectError> for Error {
    fn from(err: ConnectError) -> Self {
        Error::Sync(SyncError::FetchFailed(err.to_string()))
    }
}
