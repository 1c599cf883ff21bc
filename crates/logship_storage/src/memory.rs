//! In-memory log storage.

use crate::backend::{BucketId, LogStorage};
use crate::error::{StorageError, StorageResult};
use crate::record::{LogRecord, RejectedRecord};
use std::collections::VecDeque;

#[derive(Debug)]
struct StoredRecord {
    data: Vec<u8>,
    bucket_id: Option<BucketId>,
}

/// A volatile log storage.
///
/// Records are extracted in insertion order. Cleanup evicts the oldest
/// records first, whether or not they are currently part of a bucket.
///
/// This storage is suitable for:
/// - Unit and integration tests
/// - Command-line tooling
/// - Devices that accept losing buffered logs on restart
///
/// # Example
///
/// ```rust
/// use logship_storage::{InMemoryLogStorage, LogRecord, LogStorage};
///
/// let mut storage = InMemoryLogStorage::new();
/// storage.add_record(LogRecord::from_vec(b"boot".to_vec())).unwrap();
/// assert_eq!(storage.total_size(), 4);
/// assert_eq!(storage.records_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryLogStorage {
    records: VecDeque<StoredRecord>,
    total_size: usize,
    released: bool,
}

impl InMemoryLogStorage {
    /// Creates a new empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records, pending or tagged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of records tagged with `bucket_id`.
    #[must_use]
    pub fn bucket_len(&self, bucket_id: BucketId) -> usize {
        self.records
            .iter()
            .filter(|r| r.bucket_id == Some(bucket_id))
            .count()
    }

    /// Returns true once [`LogStorage::release`] has been called.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    fn check_live(&self) -> StorageResult<()> {
        if self.released {
            Err(StorageError::Released)
        } else {
            Ok(())
        }
    }
}

impl LogStorage for InMemoryLogStorage {
    fn allocate_record_buffer(&mut self, size: usize) -> StorageResult<LogRecord> {
        self.check_live()?;

        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| StorageError::AllocationFailed { size })?;
        data.resize(size, 0);
        Ok(LogRecord::from_vec(data))
    }

    fn add_record(&mut self, record: LogRecord) -> Result<(), RejectedRecord> {
        if let Err(error) = self.check_live() {
            return Err(RejectedRecord::new(record, error));
        }

        let data = record.into_inner();
        self.total_size += data.len();
        self.records.push_back(StoredRecord {
            data,
            bucket_id: None,
        });
        Ok(())
    }

    fn release_record_buffer(&mut self, record: LogRecord) {
        drop(record);
    }

    fn total_size(&self) -> usize {
        self.total_size
    }

    fn records_count(&self) -> usize {
        self.records.iter().filter(|r| r.bucket_id.is_none()).count()
    }

    fn write_next_record(
        &mut self,
        buffer: &mut [u8],
        bucket_id: BucketId,
    ) -> StorageResult<usize> {
        self.check_live()?;

        let record = self
            .records
            .iter_mut()
            .find(|r| r.bucket_id.is_none())
            .ok_or(StorageError::NotFound)?;

        let len = record.data.len();
        if len > buffer.len() {
            return Err(StorageError::InsufficientBuffer {
                needed: len,
                available: buffer.len(),
            });
        }

        buffer[..len].copy_from_slice(&record.data);
        record.bucket_id = Some(bucket_id);
        Ok(len)
    }

    fn remove_by_bucket_id(&mut self, bucket_id: BucketId) -> StorageResult<()> {
        let mut freed = 0;
        self.records.retain(|r| {
            if r.bucket_id == Some(bucket_id) {
                freed += r.data.len();
                false
            } else {
                true
            }
        });
        self.total_size -= freed;
        Ok(())
    }

    fn unmark_by_bucket_id(&mut self, bucket_id: BucketId) -> StorageResult<()> {
        self.records
            .iter_mut()
            .filter(|r| r.bucket_id == Some(bucket_id))
            .for_each(|r| r.bucket_id = None);
        Ok(())
    }

    fn shrink_to_size(&mut self, volume: usize) -> StorageResult<()> {
        self.check_live()?;

        while self.total_size > volume {
            match self.records.pop_front() {
                Some(evicted) => self.total_size -= evicted.data.len(),
                None => break,
            }
        }
        Ok(())
    }

    fn release(&mut self) {
        self.records.clear();
        self.total_size = 0;
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_with(payloads: &[&[u8]]) -> InMemoryLogStorage {
        let mut storage = InMemoryLogStorage::new();
        for payload in payloads {
            storage
                .add_record(LogRecord::from_vec(payload.to_vec()))
                .unwrap();
        }
        storage
    }

    #[test]
    fn memory_new_is_empty() {
        let storage = InMemoryLogStorage::new();
        assert!(storage.is_empty());
        assert_eq!(storage.total_size(), 0);
        assert_eq!(storage.records_count(), 0);
    }

    #[test]
    fn memory_allocate_is_zero_filled() {
        let mut storage = InMemoryLogStorage::new();
        let record = storage.allocate_record_buffer(6).unwrap();
        assert_eq!(record.as_slice(), &[0u8; 6]);
        storage.release_record_buffer(record);
        assert!(storage.is_empty());
    }

    #[test]
    fn memory_extraction_is_fifo_and_tags() {
        let mut storage = storage_with(&[b"first", b"second"]);
        let mut buf = [0u8; 32];

        let len = storage.write_next_record(&mut buf, 7).unwrap();
        assert_eq!(&buf[..len], b"first");
        assert_eq!(storage.records_count(), 1);
        assert_eq!(storage.bucket_len(7), 1);

        let len = storage.write_next_record(&mut buf, 7).unwrap();
        assert_eq!(&buf[..len], b"second");

        assert_eq!(
            storage.write_next_record(&mut buf, 7),
            Err(StorageError::NotFound)
        );
        // Tagged records still occupy storage until acknowledged.
        assert_eq!(storage.total_size(), 11);
    }

    #[test]
    fn memory_insufficient_buffer_leaves_record_pending() {
        let mut storage = storage_with(&[b"a longer record"]);
        let mut buf = [0u8; 4];

        let err = storage.write_next_record(&mut buf, 1).unwrap_err();
        assert_eq!(
            err,
            StorageError::InsufficientBuffer {
                needed: 15,
                available: 4
            }
        );
        assert_eq!(storage.records_count(), 1);
        assert_eq!(storage.bucket_len(1), 0);
    }

    #[test]
    fn memory_remove_by_bucket_id() {
        let mut storage = storage_with(&[b"aa", b"bbb", b"cccc"]);
        let mut buf = [0u8; 8];
        storage.write_next_record(&mut buf, 1).unwrap();
        storage.write_next_record(&mut buf, 2).unwrap();

        storage.remove_by_bucket_id(1).unwrap();
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.total_size(), 7);
        assert_eq!(storage.bucket_len(2), 1);
    }

    #[test]
    fn memory_unmark_returns_records_to_pending() {
        let mut storage = storage_with(&[b"aa", b"bbb"]);
        let mut buf = [0u8; 8];
        storage.write_next_record(&mut buf, 3).unwrap();
        storage.write_next_record(&mut buf, 3).unwrap();
        assert_eq!(storage.records_count(), 0);

        storage.unmark_by_bucket_id(3).unwrap();
        assert_eq!(storage.records_count(), 2);

        let len = storage.write_next_record(&mut buf, 4).unwrap();
        assert_eq!(&buf[..len], b"aa");
    }

    #[test]
    fn memory_unknown_bucket_is_noop() {
        let mut storage = storage_with(&[b"aa"]);
        storage.remove_by_bucket_id(99).unwrap();
        storage.unmark_by_bucket_id(99).unwrap();
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.records_count(), 1);
    }

    #[test]
    fn memory_shrink_evicts_oldest() {
        let mut storage = storage_with(&[b"0123456789", b"abcde", b"xyz"]);
        storage.shrink_to_size(8).unwrap();

        assert_eq!(storage.len(), 1);
        assert_eq!(storage.total_size(), 3);

        let mut buf = [0u8; 8];
        let len = storage.write_next_record(&mut buf, 1).unwrap();
        assert_eq!(&buf[..len], b"xyz");
    }

    #[test]
    fn memory_shrink_to_zero() {
        let mut storage = storage_with(&[b"abc", b"def"]);
        storage.shrink_to_size(0).unwrap();
        assert!(storage.is_empty());
        assert_eq!(storage.total_size(), 0);
    }

    #[test]
    fn memory_release_rejects_further_use() {
        let mut storage = storage_with(&[b"abc"]);
        storage.release();

        assert!(storage.is_released());
        assert_eq!(storage.total_size(), 0);
        assert_eq!(
            storage.allocate_record_buffer(4),
            Err(StorageError::Released)
        );

        let rejected = storage
            .add_record(LogRecord::from_vec(b"late".to_vec()))
            .unwrap_err();
        assert_eq!(rejected.error, StorageError::Released);
        assert_eq!(rejected.record.as_slice(), b"late");
    }
}
