//! Error types for database operations.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Native DB error.
    #[error("Database error: {0}")]
    Database(String),

    /// Record not found by key.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// Record kind (e.g. "species").
        kind: &'static str,
        /// Natural key that was looked up.
        key: String,
    },

    /// A unique key was already taken.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Malformed query arguments.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn not_found(kind: &'static str, key: impl ToString) -> Self {
        Error::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// Whether this error means the key already exists
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Error::ConstraintViolation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;
