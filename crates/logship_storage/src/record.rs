//! Record buffers exchanged between the collector and storage.

use crate::error::StorageError;
use thiserror::Error;

/// A serialized log record buffer.
///
/// Buffers are allocated by [`crate::LogStorage::allocate_record_buffer`],
/// filled by the collector, then handed back with
/// [`crate::LogStorage::add_record`]. The payload is opaque to storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogRecord {
    data: Vec<u8>,
}

impl LogRecord {
    /// Wraps already serialized bytes.
    #[must_use]
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the record carries no payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the payload.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Returns the payload for in-place serialization.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the record and returns its payload.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

/// A record that storage refused to register.
///
/// The buffer is handed back so the caller can release it.
#[derive(Debug, Error)]
#[error("log record rejected: {error}")]
pub struct RejectedRecord {
    /// The buffer that was not registered.
    pub record: LogRecord,
    /// Why registration failed.
    #[source]
    pub error: StorageError,
}

impl RejectedRecord {
    /// Creates a rejection carrying the buffer back to the caller.
    pub fn new(record: LogRecord, error: StorageError) -> Self {
        Self { record, error }
    }
}
