//! Error types for ingestion.

use thiserror::Error;

/// Result type for ingestion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a single-key ingestion or a batch before it starts
#[derive(Debug, Error)]
pub enum Error {
    /// The top-level record could not be fetched
    #[error("fetch failed for {key}: {source}")]
    Fetch {
        key: String,
        #[source]
        source: pokedex_source::Error,
    },

    /// Range bounds rejected before any remote call
    #[error("invalid range {start}..={end}: {reason}")]
    InvalidRange { start: u32, end: u32, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("store error: {0}")]
    Store(#[from] pokedex_db::Error),
}

impl Error {
    pub(crate) fn fetch(key: impl ToString, source: pokedex_source::Error) -> Self {
        Error::Fetch {
            key: key.to_string(),
            source,
        }
    }
}
