//! Error types for remote fetches.

use thiserror::Error;

/// Errors returned by a remote source.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The source has no record under this key.
    #[error("{resource} not found upstream")]
    NotFound {
        /// Resource path that was requested (e.g. "pokemon/9999").
        resource: String,
    },

    /// Network failure, timeout or server error that outlived every retry.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The source rejected the request.
    #[error("request rejected with HTTP {status}: {url}")]
    Request { status: u16, url: String },

    /// The response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Whether retrying later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_))
    }
}

/// Result type for remote fetches.
pub type Result<T> = std::result::Result<T, Error>;
