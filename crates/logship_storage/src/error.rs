//! Error types for log storage operations.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No record is eligible for extraction.
    #[error("no eligible log records")]
    NotFound,

    /// The next eligible record does not fit into the supplied buffer.
    #[error("insufficient buffer: record needs {needed} bytes, {available} available")]
    InsufficientBuffer {
        /// Size of the record that did not fit.
        needed: usize,
        /// Space offered by the caller.
        available: usize,
    },

    /// A record buffer could not be allocated.
    #[error("failed to allocate a {size} byte record buffer")]
    AllocationFailed {
        /// Requested buffer size.
        size: usize,
    },

    /// The storage has been released and holds no resources.
    #[error("storage has been released")]
    Released,

    /// Implementation specific failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Returns true for the two outcomes that end a bucket normally:
    /// nothing left to extract, or the next record does not fit.
    pub fn is_benign_extraction_end(&self) -> bool {
        matches!(self, Self::NotFound | Self::InsufficientBuffer { .. })
    }
}
