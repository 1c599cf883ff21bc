//! Persisted client status consumed by the collector.

use parking_lot::RwLock;
use thiserror::Error;

/// Result type for status operations.
pub type StatusResult<T> = Result<T, StatusError>;

/// Errors reported by a status store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// The status could not be read or written.
    #[error("status unavailable: {0}")]
    Unavailable(String),
}

/// Cross-session client status.
///
/// The collector loads the last used bucket id once, the first time it
/// assembles a bucket, and writes every new id back so ids stay unique
/// across restarts.
pub trait StatusStore: Send + Sync {
    /// Returns the last bucket id used by a previous session.
    fn log_bucket_id(&self) -> StatusResult<u16>;

    /// Records the bucket id most recently assigned.
    fn set_log_bucket_id(&self, bucket_id: u16) -> StatusResult<()>;
}

/// A status store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStatusStore {
    log_bucket_id: RwLock<u16>,
}

impl MemoryStatusStore {
    /// Creates a store with no buckets recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that reports `bucket_id` as last used.
    pub fn with_log_bucket_id(bucket_id: u16) -> Self {
        Self {
            log_bucket_id: RwLock::new(bucket_id),
        }
    }
}

impl StatusStore for MemoryStatusStore {
    fn log_bucket_id(&self) -> StatusResult<u16> {
        Ok(*self.log_bucket_id.read())
    }

    fn set_log_bucket_id(&self, bucket_id: u16) -> StatusResult<()> {
        *self.log_bucket_id.write() = bucket_id;
        Ok(())
    }
}
