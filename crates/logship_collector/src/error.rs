//! Error types for the log collector.

use crate::status::StatusError;
use logship_codec::CodecError;
use logship_storage::StorageError;
use thiserror::Error;

/// Result type for collector operations.
pub type CollectorResult<T> = Result<T, CollectorError>;

/// Errors that can occur while collecting or shipping logs.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// A required argument was missing or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The collector has no storage configured yet.
    #[error("log collector is not initialized")]
    NotInitialized,

    /// The record serialized to zero bytes.
    #[error("log record has no serialized content")]
    BadData,

    /// A record buffer could not be allocated.
    #[error("out of memory allocating a {size} byte record buffer")]
    NoMemory {
        /// Requested buffer size.
        size: usize,
    },

    /// Framing or serialization into an output buffer failed.
    #[error("write failed: {0}")]
    WriteFailed(#[source] CodecError),

    /// An incoming extension could not be parsed.
    #[error("read failed: {0}")]
    ReadFailed(#[source] CodecError),

    /// The bucket id seed could not be loaded.
    #[error("log bucket id unavailable: {0}")]
    BadState(#[source] StatusError),

    /// Not a single record could be packed into the bucket.
    #[error("empty log bucket: {0}")]
    EmptyBucket(#[source] StorageError),

    /// A record could not be encoded before being handed to the collector.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CollectorError {
    /// Maps a storage error, turning allocation failures into
    /// [`CollectorError::NoMemory`].
    pub(crate) fn from_allocation(error: StorageError) -> Self {
        match error {
            StorageError::AllocationFailed { size } => Self::NoMemory { size },
            other => Self::Storage(other),
        }
    }

    /// Returns true if the bucket was abandoned because nothing could be
    /// extracted. The records, if any, are still pending.
    pub fn is_empty_bucket(&self) -> bool {
        matches!(self, Self::EmptyBucket(_))
    }
}
