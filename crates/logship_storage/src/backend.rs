//! Log storage trait definition.

use crate::error::StorageResult;
use crate::record::{LogRecord, RejectedRecord};

/// Identifier shared by every record shipped in one bucket.
pub type BucketId = u16;

/// Storage for serialized log records awaiting upload.
///
/// Storage owns accepted records. The collector only borrows them while a
/// bucket is being assembled, and refers to shipped records through the
/// bucket id they were tagged with.
///
/// # Invariants
///
/// - A record is either pending (untagged) or tagged with exactly one bucket id
/// - `write_next_record` only ever selects pending records
/// - `remove_by_bucket_id` and `unmark_by_bucket_id` touch only records
///   tagged with that id, and are no-ops for unknown ids
/// - Tagging, extraction and removal must be atomic with respect to each
///   other if the storage is shared between threads
///
/// # Implementors
///
/// - [`super::InMemoryLogStorage`] - Volatile FIFO storage
pub trait LogStorage: Send {
    /// Allocates a zero-filled buffer for a record of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::AllocationFailed`] if the buffer
    /// cannot be provided.
    fn allocate_record_buffer(&mut self, size: usize) -> StorageResult<LogRecord>;

    /// Registers a filled buffer as a pending record.
    ///
    /// # Errors
    ///
    /// On failure the buffer is returned inside [`RejectedRecord`].
    fn add_record(&mut self, record: LogRecord) -> Result<(), RejectedRecord>;

    /// Releases a buffer that was allocated but never registered.
    fn release_record_buffer(&mut self, record: LogRecord);

    /// Returns the number of bytes currently occupied by stored records.
    fn total_size(&self) -> usize;

    /// Returns the number of pending (untagged) records.
    fn records_count(&self) -> usize;

    /// Copies the next pending record into `buffer` and tags it with
    /// `bucket_id`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// - [`crate::StorageError::NotFound`] if no record is pending
    /// - [`crate::StorageError::InsufficientBuffer`] if the next record is
    ///   larger than `buffer`
    /// - Any other error for implementation failures
    fn write_next_record(&mut self, buffer: &mut [u8], bucket_id: BucketId)
        -> StorageResult<usize>;

    /// Permanently deletes every record tagged with `bucket_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion cannot be carried out.
    fn remove_by_bucket_id(&mut self, bucket_id: BucketId) -> StorageResult<()>;

    /// Returns every record tagged with `bucket_id` to the pending pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be untagged.
    fn unmark_by_bucket_id(&mut self, bucket_id: BucketId) -> StorageResult<()>;

    /// Evicts records until at most `volume` bytes remain.
    ///
    /// # Errors
    ///
    /// Returns an error if occupancy cannot be reduced.
    fn shrink_to_size(&mut self, volume: usize) -> StorageResult<()>;

    /// Drops every record and frees all resources held by the storage.
    fn release(&mut self);
}
