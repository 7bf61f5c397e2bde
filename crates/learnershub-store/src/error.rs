//! Error types for Learners Hub storage.

use learnershub_core::LmsError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend I/O failed.
    #[error("database error: {0}")]
    Database(String),

    /// A value could not be serialized for writing.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Its key.
        id: String,
    },

    /// A compound operation hit a business rule.
    #[error(transparent)]
    Rule(#[from] LmsError),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Database(err.to_string())
    }
}
