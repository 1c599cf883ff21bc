//! Configuration for log upload.

use crate::error::{CollectorError, CollectorResult};
use serde::{Deserialize, Serialize};

/// Limits applied to buffered and shipped logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogUploadProperties {
    /// Storage occupancy, in bytes, above which cleanup evicts records.
    pub max_log_storage_volume: usize,
    /// Byte budget for the records of one outbound bucket.
    pub max_log_bucket_size: usize,
}

impl LogUploadProperties {
    /// Creates upload properties.
    pub fn new(max_log_storage_volume: usize, max_log_bucket_size: usize) -> Self {
        Self {
            max_log_storage_volume,
            max_log_bucket_size,
        }
    }

    /// Sets the maximum storage volume.
    pub fn with_max_log_storage_volume(mut self, volume: usize) -> Self {
        self.max_log_storage_volume = volume;
        self
    }

    /// Sets the maximum bucket size.
    pub fn with_max_log_bucket_size(mut self, size: usize) -> Self {
        self.max_log_bucket_size = size;
        self
    }

    /// Checks that both limits are positive.
    pub fn validate(&self) -> CollectorResult<()> {
        if self.max_log_storage_volume == 0 {
            return Err(CollectorError::InvalidArgument(
                "max_log_storage_volume must be positive",
            ));
        }
        if self.max_log_bucket_size == 0 {
            return Err(CollectorError::InvalidArgument(
                "max_log_bucket_size must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for LogUploadProperties {
    fn default() -> Self {
        Self::new(64 * 1024, 8 * 1024)
    }
}
