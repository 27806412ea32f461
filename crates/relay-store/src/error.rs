//! Store error types

use thiserror::Error;

/// Session store error type
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error while writing a record
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Store result type
pub type StoreResult<T> = Result<T, StoreError>;
