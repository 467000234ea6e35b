//! Error types for pokedex-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    #[error("Unknown stat: {0}")]
    UnknownStat(String),

    #[error("Unknown type: {0}")]
    UnknownType(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
