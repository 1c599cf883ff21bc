//! Log bucket lifecycle and batching.

use crate::config::LogUploadProperties;
use crate::error::{CollectorError, CollectorResult};
use crate::record::UserLogRecord;
use crate::status::StatusStore;
use crate::strategy::{UploadDecision, UploadStrategy};
use crate::trigger::{SyncService, SyncTrigger};
use logship_codec::{
    align_down, aligned_size, framed_record_size, CodecError, DeliveryResult, MessageWriter,
    BUCKET_FIELDS_SIZE, EXTENSION_HEADER_SIZE, MAX_PADDING_LENGTH, RECORD_LENGTH_PREFIX_SIZE,
};
use logship_storage::{BucketId, LogStorage, StorageError};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

const LOGGING_SERVICES: [SyncService; 1] = [SyncService::Logging];

/// Outcome of packing one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketSummary {
    /// Id assigned to the bucket.
    pub bucket_id: BucketId,
    /// Number of records packed.
    pub record_count: u16,
}

struct LogBackend {
    storage: Box<dyn LogStorage>,
    strategy: Box<dyn UploadStrategy>,
    properties: LogUploadProperties,
}

/// Collects application logs and ships them in buckets.
///
/// The collector owns the bucket id counter and the storage it was
/// initialized with. It has no internal locking: every operation takes
/// `&mut self`, and callers that share a collector between contexts wrap it
/// in a mutex (see [`crate::SharedLogCollector`]).
///
/// # Lifecycle
///
/// 1. [`LogCollector::new`] with the status store holding the bucket id seed
/// 2. [`LogCollector::init`] with storage, strategy and limits
/// 3. [`LogCollector::add_record`] as the application logs
/// 4. [`LogCollector::serialize_request`] when a sync message is built
/// 5. [`LogCollector::handle_server_sync`] when the server acknowledges
pub struct LogCollector {
    log_bucket_id: Option<BucketId>,
    backend: Option<LogBackend>,
    status: Arc<dyn StatusStore>,
    sync_trigger: Option<Arc<dyn SyncTrigger>>,
}

impl LogCollector {
    /// Creates an uninitialized collector.
    pub fn new(status: Arc<dyn StatusStore>) -> Self {
        Self {
            log_bucket_id: None,
            backend: None,
            status,
            sync_trigger: None,
        }
    }

    /// Installs storage, upload strategy and limits.
    ///
    /// A previously installed storage is released first.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::InvalidArgument`] if a limit is zero; the
    /// current configuration is kept in that case.
    pub fn init(
        &mut self,
        storage: Box<dyn LogStorage>,
        strategy: Box<dyn UploadStrategy>,
        properties: LogUploadProperties,
    ) -> CollectorResult<()> {
        properties.validate()?;

        if let Some(mut previous) = self.backend.take() {
            previous.storage.release();
        }

        debug!(
            max_log_storage_volume = properties.max_log_storage_volume,
            max_log_bucket_size = properties.max_log_bucket_size,
            "Initialized log collector"
        );
        self.backend = Some(LogBackend {
            storage,
            strategy,
            properties,
        });
        Ok(())
    }

    /// Returns true once storage has been installed.
    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    /// The active upload limits.
    pub fn properties(&self) -> Option<&LogUploadProperties> {
        self.backend.as_ref().map(|b| &b.properties)
    }

    /// Read-only view of the installed storage.
    pub fn storage(&self) -> Option<&dyn LogStorage> {
        self.backend.as_ref().map(|b| b.storage.as_ref())
    }

    /// The id of the most recently assembled bucket in this session.
    pub fn last_bucket_id(&self) -> Option<BucketId> {
        self.log_bucket_id
    }

    /// Registers the hook used to request a sync round.
    pub fn set_sync_trigger(&mut self, trigger: Arc<dyn SyncTrigger>) {
        self.sync_trigger = Some(trigger);
    }

    /// Removes the sync hook. Upload decisions then have no effect.
    pub fn clear_sync_trigger(&mut self) {
        self.sync_trigger = None;
    }

    fn backend_mut(&mut self) -> CollectorResult<&mut LogBackend> {
        self.backend.as_mut().ok_or(CollectorError::NotInitialized)
    }

    /// Serializes `record` into storage.
    ///
    /// # Errors
    ///
    /// - [`CollectorError::NotInitialized`] before [`Self::init`]
    /// - [`CollectorError::BadData`] if the record serializes to nothing
    /// - [`CollectorError::NoMemory`] if storage cannot allocate a buffer
    /// - [`CollectorError::WriteFailed`] if serialization fails
    /// - [`CollectorError::Storage`] if storage refuses the record
    ///
    /// The record is not retained on any error.
    pub fn add_record<R>(&mut self, record: &R) -> CollectorResult<()>
    where
        R: UserLogRecord + ?Sized,
    {
        let backend = self.backend_mut()?;

        let size = record.serialized_size();
        trace!(size, "Adding new log record");
        if size == 0 {
            return Err(CollectorError::BadData);
        }

        let mut buffer = backend
            .storage
            .allocate_record_buffer(size)
            .map_err(CollectorError::from_allocation)?;

        let serialized = {
            let mut writer = MessageWriter::new(buffer.as_mut_slice());
            record.serialize(&mut writer).and_then(|()| {
                if writer.position() == size {
                    Ok(())
                } else {
                    Err(CodecError::invalid_structure(format!(
                        "record serialized {} of {} announced bytes",
                        writer.position(),
                        size
                    )))
                }
            })
        };
        if let Err(e) = serialized {
            backend.storage.release_record_buffer(buffer);
            return Err(CollectorError::WriteFailed(e));
        }

        if let Err(rejected) = backend.storage.add_record(buffer) {
            error!(error = %rejected.error, "Failed to add log record to storage");
            backend.storage.release_record_buffer(rejected.record);
            return Err(rejected.error.into());
        }

        self.update_storage();
        Ok(())
    }

    /// Upper bound of the logging extension size if a sync ran now.
    ///
    /// Counts the extension header, the id and count fields, and the pending
    /// records with their length prefix and worst-case padding, capped at the
    /// bucket size.
    ///
    /// The record count covers pending records only, while the storage size
    /// also includes records of buckets awaiting acknowledgment, so the
    /// estimate overshoots while a bucket is in flight.
    pub fn estimate_request_size(&self) -> CollectorResult<usize> {
        let backend = self.backend.as_ref().ok_or(CollectorError::NotInitialized)?;

        let records_count = backend.storage.records_count();
        let total_size = backend.storage.total_size();
        let actual_size =
            records_count * (RECORD_LENGTH_PREFIX_SIZE + MAX_PADDING_LENGTH) + total_size;

        Ok(EXTENSION_HEADER_SIZE
            + BUCKET_FIELDS_SIZE
            + actual_size.min(backend.properties.max_log_bucket_size))
    }

    fn next_bucket_id(&mut self) -> CollectorResult<BucketId> {
        let previous = match self.log_bucket_id {
            Some(id) => id,
            None => self
                .status
                .log_bucket_id()
                .map_err(CollectorError::BadState)?,
        };

        let bucket_id = previous.wrapping_add(1);
        self.log_bucket_id = Some(bucket_id);
        if let Err(e) = self.status.set_log_bucket_id(bucket_id) {
            warn!(bucket_id, error = %e, "Failed to persist log bucket id");
        }
        Ok(bucket_id)
    }

    /// Packs pending records into a new bucket.
    ///
    /// Writes the bucket id, the record count and the framed records at the
    /// writer's position. The framed records never take more than `budget`
    /// bytes, nor more than the writer has left after the id and count.
    ///
    /// # Errors
    ///
    /// - [`CollectorError::BadState`] if the bucket id seed cannot be loaded
    /// - [`CollectorError::EmptyBucket`] if the first record is missing or
    ///   does not fit
    /// - [`CollectorError::Storage`] for any other extraction failure; the
    ///   bucket is abandoned
    ///
    /// On error the writer is rewound to where it started and records
    /// already extracted into the bucket become pending again.
    pub fn build_bucket(
        &mut self,
        writer: &mut MessageWriter<'_>,
        budget: usize,
    ) -> CollectorResult<BucketSummary> {
        self.backend_mut()?;
        let bucket_id = self.next_bucket_id()?;

        let start = writer.position();
        let result = self.fill_bucket(writer, bucket_id, budget);
        if result.is_err() {
            writer.rewind(start);
            self.abandon_bucket(bucket_id);
        }
        result
    }

    /// Returns records tagged with a bucket that will never be sent to the
    /// pending pool.
    pub(crate) fn abandon_bucket(&mut self, bucket_id: BucketId) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        if let Err(e) = backend.storage.unmark_by_bucket_id(bucket_id) {
            error!(bucket_id, error = %e, "Failed to return abandoned records to storage");
        }
    }

    fn fill_bucket(
        &mut self,
        writer: &mut MessageWriter<'_>,
        bucket_id: BucketId,
        budget: usize,
    ) -> CollectorResult<BucketSummary> {
        let backend = self.backend_mut()?;

        writer
            .write_u16(bucket_id)
            .map_err(CollectorError::WriteFailed)?;
        let count_slot = writer.reserve(2).map_err(CollectorError::WriteFailed)?;

        let mut remaining = budget.min(writer.remaining());
        trace!(bucket_id, remaining, "Extracting log records");

        let mut record_count: u16 = 0;
        while record_count < u16::MAX {
            let room = align_down(remaining.saturating_sub(RECORD_LENGTH_PREFIX_SIZE));
            let window = writer
                .unfilled_mut()
                .get_mut(RECORD_LENGTH_PREFIX_SIZE..RECORD_LENGTH_PREFIX_SIZE + room)
                .unwrap_or_default();

            match backend.storage.write_next_record(window, bucket_id) {
                Ok(len) if len <= room && framed_record_size(len) <= remaining => {
                    let prefix = u32::try_from(len).map_err(|_| {
                        CollectorError::WriteFailed(CodecError::ValueTooLarge {
                            value: len as u64,
                            max: u64::from(u32::MAX),
                        })
                    })?;
                    writer
                        .write_u32(prefix)
                        .and_then(|()| writer.advance(len))
                        .and_then(|()| writer.write_zeros(aligned_size(len) - len))
                        .map_err(CollectorError::WriteFailed)?;

                    record_count += 1;
                    remaining -= framed_record_size(len);
                }
                Ok(len) => {
                    error!(bucket_id, len, room, "Storage wrote past the offered space");
                    return Err(StorageError::backend(format!(
                        "record of {} bytes reported for {} bytes of space",
                        len, room
                    ))
                    .into());
                }
                Err(e) if e.is_benign_extraction_end() => {
                    if record_count == 0 {
                        error!(bucket_id, error = %e, "Failed to write the log record");
                        return Err(CollectorError::EmptyBucket(e));
                    }
                    break;
                }
                Err(e) => {
                    error!(bucket_id, error = %e, "Failed to write the log record");
                    return Err(e.into());
                }
            }
        }

        writer
            .patch_u16(count_slot, record_count)
            .map_err(CollectorError::WriteFailed)?;

        Ok(BucketSummary {
            bucket_id,
            record_count,
        })
    }

    /// Applies the server's verdict for a bucket.
    ///
    /// Delivered buckets are removed from storage; failed ones return to
    /// the pending pool. Unknown ids change nothing. The upload strategy is
    /// consulted afterwards in either case.
    ///
    /// # Errors
    ///
    /// Returns storage errors after the strategy has run.
    pub fn resolve_bucket(
        &mut self,
        bucket_id: BucketId,
        result: DeliveryResult,
    ) -> CollectorResult<()> {
        let backend = self.backend_mut()?;

        let outcome = match result {
            DeliveryResult::Success => backend.storage.remove_by_bucket_id(bucket_id),
            DeliveryResult::Failure => backend.storage.unmark_by_bucket_id(bucket_id),
        };
        if let Err(e) = &outcome {
            error!(bucket_id, error = %e, "Failed to resolve log bucket");
        }

        self.update_storage();
        outcome.map_err(CollectorError::from)
    }

    fn update_storage(&mut self) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        match backend.strategy.decide(backend.storage.as_ref()) {
            UploadDecision::Cleanup => {
                warn!(
                    max_volume = backend.properties.max_log_storage_volume,
                    current_size = backend.storage.total_size(),
                    "Initiating log storage cleanup"
                );
                if let Err(e) = backend
                    .storage
                    .shrink_to_size(backend.properties.max_log_storage_volume)
                {
                    error!(error = %e, "Failed to cleanup log storage");
                }
            }
            UploadDecision::Upload => {
                info!("Initiating log upload");
                if let Some(trigger) = &self.sync_trigger {
                    trigger.request_sync(&LOGGING_SERVICES);
                }
            }
            UploadDecision::NoAction => {
                trace!("Upload will not be triggered now");
            }
        }
    }
}

impl Drop for LogCollector {
    fn drop(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            backend.storage.release();
        }
    }
}

impl std::fmt::Debug for LogCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogCollector")
            .field("log_bucket_id", &self.log_bucket_id)
            .field("properties", &self.properties())
            .field("has_sync_trigger", &self.sync_trigger.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{MemoryStatusStore, StatusError, StatusResult};
    use logship_codec::LogSyncRequest;
    use logship_storage::InMemoryLogStorage;
    use logship_testkit::{FaultyStorage, SharedFaultPlan};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct BrokenStatus;

    impl StatusStore for BrokenStatus {
        fn log_bucket_id(&self) -> StatusResult<u16> {
            Err(StatusError::Unavailable("no status file".into()))
        }

        fn set_log_bucket_id(&self, _bucket_id: u16) -> StatusResult<()> {
            Err(StatusError::Unavailable("no status file".into()))
        }
    }

    fn never_upload() -> Box<dyn UploadStrategy> {
        Box::new(|_: &dyn LogStorage| UploadDecision::NoAction)
    }

    fn collector(bucket_size: usize) -> LogCollector {
        let mut collector = LogCollector::new(Arc::new(MemoryStatusStore::new()));
        collector
            .init(
                Box::new(InMemoryLogStorage::new()),
                never_upload(),
                LogUploadProperties::new(4096, bucket_size),
            )
            .unwrap();
        collector
    }

    fn build(collector: &mut LogCollector, budget: usize) -> (CollectorResult<BucketSummary>, Vec<u8>) {
        let mut buf = vec![0u8; 256];
        let mut writer = MessageWriter::new(&mut buf);
        let result = collector.build_bucket(&mut writer, budget);
        let written = writer.written().to_vec();
        (result, written)
    }

    #[test]
    fn operations_require_init() {
        let mut collector = LogCollector::new(Arc::new(MemoryStatusStore::new()));
        assert!(!collector.is_initialized());
        assert!(matches!(
            collector.add_record("hello"),
            Err(CollectorError::NotInitialized)
        ));
        assert!(matches!(
            collector.estimate_request_size(),
            Err(CollectorError::NotInitialized)
        ));
        assert!(matches!(
            collector.resolve_bucket(1, DeliveryResult::Success),
            Err(CollectorError::NotInitialized)
        ));
        let (result, _) = build(&mut collector, 64);
        assert!(matches!(result, Err(CollectorError::NotInitialized)));
        assert_eq!(collector.last_bucket_id(), None);
    }

    #[test]
    fn init_rejects_zero_limits() {
        let mut collector = LogCollector::new(Arc::new(MemoryStatusStore::new()));
        let err = collector
            .init(
                Box::new(InMemoryLogStorage::new()),
                never_upload(),
                LogUploadProperties::new(0, 16),
            )
            .unwrap_err();
        assert!(matches!(err, CollectorError::InvalidArgument(_)));
        assert!(!collector.is_initialized());
    }

    #[test]
    fn add_record_grows_storage() {
        let mut collector = collector(1024);
        collector.add_record("0123456789").unwrap();
        collector.add_record(&[7u8; 20][..]).unwrap();

        let storage = collector.storage().unwrap();
        assert_eq!(storage.total_size(), 30);
        assert_eq!(storage.records_count(), 2);
    }

    #[test]
    fn empty_record_is_bad_data() {
        let mut collector = collector(1024);
        assert!(matches!(
            collector.add_record(""),
            Err(CollectorError::BadData)
        ));
        assert_eq!(collector.storage().unwrap().total_size(), 0);
    }

    #[test]
    fn empty_record_never_reaches_storage() {
        let plan = SharedFaultPlan::default();
        plan.lock().fail_allocate = true;
        let mut collector = LogCollector::new(Arc::new(MemoryStatusStore::new()));
        collector
            .init(
                Box::new(FaultyStorage::new(plan.clone())),
                never_upload(),
                LogUploadProperties::new(4096, 1024),
            )
            .unwrap();

        assert!(matches!(
            collector.add_record(&b""[..]),
            Err(CollectorError::BadData)
        ));
        assert_eq!(plan.lock().buffer_releases, 0);
    }

    #[test]
    fn failed_bucket_returns_records_to_pending() {
        let plan = SharedFaultPlan::default();
        let mut collector = LogCollector::new(Arc::new(MemoryStatusStore::new()));
        collector
            .init(
                Box::new(FaultyStorage::new(plan.clone())),
                never_upload(),
                LogUploadProperties::new(4096, 1024),
            )
            .unwrap();
        for payload in ["one", "two", "three"] {
            collector.add_record(payload).unwrap();
        }
        plan.lock().fail_extract_after = Some(2);

        let (result, written) = build(&mut collector, 1024);
        assert!(matches!(result, Err(CollectorError::Storage(_))));
        assert!(written.is_empty());
        assert_eq!(collector.storage().unwrap().records_count(), 3);
    }

    #[test]
    fn estimate_on_empty_storage_is_fixed_cost() {
        let collector = collector(1024);
        assert_eq!(
            collector.estimate_request_size().unwrap(),
            EXTENSION_HEADER_SIZE + BUCKET_FIELDS_SIZE
        );
    }

    #[test]
    fn estimate_counts_prefix_and_padding() {
        let mut collector = collector(1024);
        collector.add_record("0123456789").unwrap();
        collector.add_record("abc").unwrap();
        // 12 fixed + 2 * (4 + 3) + 13
        assert_eq!(collector.estimate_request_size().unwrap(), 12 + 14 + 13);
    }

    #[test]
    fn estimate_capped_by_bucket_size() {
        let mut collector = collector(16);
        collector.add_record(&[1u8; 100][..]).unwrap();
        assert_eq!(collector.estimate_request_size().unwrap(), 12 + 16);
    }

    #[test]
    fn build_two_records() {
        let mut collector = collector(1024);
        collector.add_record(&[0xAAu8; 10][..]).unwrap();
        collector.add_record(&[0xBBu8; 20][..]).unwrap();

        let (result, written) = build(&mut collector, 1024);
        let summary = result.unwrap();
        assert_eq!(summary.bucket_id, 1);
        assert_eq!(summary.record_count, 2);

        // id + count, then 4 + 10 + 2 and 4 + 20 + 0
        assert_eq!(written.len(), 4 + 16 + 24);
        assert_eq!(&written[..4], &[0, 1, 0, 2]);
        assert_eq!(&written[4..8], &[0, 0, 0, 10]);
        assert_eq!(&written[18..20], &[0, 0]);
        assert_eq!(&written[20..24], &[0, 0, 0, 20]);

        assert_eq!(collector.storage().unwrap().records_count(), 0);
        assert_eq!(collector.last_bucket_id(), Some(1));
    }

    #[test]
    fn build_stops_at_budget() {
        let mut collector = collector(1024);
        for _ in 0..4 {
            collector.add_record(&[1u8; 8][..]).unwrap();
        }

        // Each record frames to 12 bytes; 30 leaves room for two.
        let (result, written) = build(&mut collector, 30);
        assert_eq!(result.unwrap().record_count, 2);
        assert_eq!(written.len(), 4 + 24);
        assert_eq!(collector.storage().unwrap().records_count(), 2);
    }

    #[test]
    fn build_padding_fits_budget() {
        let mut collector = collector(1024);
        collector.add_record(&[1u8; 5][..]).unwrap();

        // 4 + 5 would fit in 9 bytes, but the padded frame needs 12.
        let (result, _) = build(&mut collector, 9);
        assert!(result.unwrap_err().is_empty_bucket());

        let (result, written) = build(&mut collector, 12);
        assert_eq!(result.unwrap().record_count, 1);
        assert_eq!(written.len(), 4 + 12);
    }

    #[test]
    fn build_fails_when_first_record_does_not_fit() {
        let mut collector = collector(1024);
        collector.add_record(&[1u8; 40][..]).unwrap();

        let (result, written) = build(&mut collector, 16);
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            CollectorError::EmptyBucket(StorageError::InsufficientBuffer { .. })
        ));
        assert!(written.is_empty());

        let storage = collector.storage().unwrap();
        assert_eq!(storage.total_size(), 40);
        assert_eq!(storage.records_count(), 1);
    }

    #[test]
    fn build_fails_on_empty_storage() {
        let mut collector = collector(1024);
        let (result, written) = build(&mut collector, 64);
        assert!(matches!(
            result,
            Err(CollectorError::EmptyBucket(StorageError::NotFound))
        ));
        assert!(written.is_empty());
    }

    #[test]
    fn build_limited_by_physical_space() {
        let mut collector = collector(1024);
        collector.add_record(&[1u8; 8][..]).unwrap();
        collector.add_record(&[2u8; 8][..]).unwrap();

        let mut buf = [0u8; 4 + 12 + 8];
        let mut writer = MessageWriter::new(&mut buf);
        let summary = collector.build_bucket(&mut writer, 1024).unwrap();
        assert_eq!(summary.record_count, 1);
        assert_eq!(writer.position(), 16);
    }

    #[test]
    fn bucket_ids_increase_and_persist() {
        let status = Arc::new(MemoryStatusStore::with_log_bucket_id(41));
        let mut collector = LogCollector::new(status.clone());
        collector
            .init(
                Box::new(InMemoryLogStorage::new()),
                never_upload(),
                LogUploadProperties::default(),
            )
            .unwrap();

        for expected in 42..45 {
            collector.add_record("entry").unwrap();
            let (result, _) = build(&mut collector, 1024);
            assert_eq!(result.unwrap().bucket_id, expected);
            assert_eq!(status.log_bucket_id().unwrap(), expected);
        }
    }

    #[test]
    fn bucket_id_wraps_without_reseeding() {
        let status = Arc::new(MemoryStatusStore::with_log_bucket_id(u16::MAX - 1));
        let mut collector = LogCollector::new(status);
        collector
            .init(
                Box::new(InMemoryLogStorage::new()),
                never_upload(),
                LogUploadProperties::default(),
            )
            .unwrap();

        let mut ids = Vec::new();
        for _ in 0..3 {
            collector.add_record("entry").unwrap();
            let (result, _) = build(&mut collector, 1024);
            ids.push(result.unwrap().bucket_id);
        }
        assert_eq!(ids, vec![u16::MAX, 0, 1]);
    }

    #[test]
    fn unavailable_seed_is_bad_state() {
        let mut collector = LogCollector::new(Arc::new(BrokenStatus));
        collector
            .init(
                Box::new(InMemoryLogStorage::new()),
                never_upload(),
                LogUploadProperties::default(),
            )
            .unwrap();
        collector.add_record("entry").unwrap();

        let (result, written) = build(&mut collector, 1024);
        assert!(matches!(result, Err(CollectorError::BadState(_))));
        assert!(written.is_empty());
        assert_eq!(collector.storage().unwrap().records_count(), 1);
    }

    #[test]
    fn resolve_success_removes_bucket() {
        let mut collector = collector(1024);
        collector.add_record("first").unwrap();
        let (first, _) = build(&mut collector, 1024);
        collector.add_record("second").unwrap();
        let (second, _) = build(&mut collector, 1024);

        collector
            .resolve_bucket(first.unwrap().bucket_id, DeliveryResult::Success)
            .unwrap();

        let storage = collector.storage().unwrap();
        assert_eq!(storage.total_size(), 6);
        assert_eq!(storage.records_count(), 0);
        assert_eq!(second.unwrap().bucket_id, 2);
    }

    #[test]
    fn resolve_failure_requeues_bucket() {
        let mut collector = collector(1024);
        collector.add_record("retry me").unwrap();
        let (first, _) = build(&mut collector, 1024);
        let first = first.unwrap();

        collector
            .resolve_bucket(first.bucket_id, DeliveryResult::Failure)
            .unwrap();
        assert_eq!(collector.storage().unwrap().records_count(), 1);

        let (second, written) = build(&mut collector, 1024);
        let second = second.unwrap();
        assert_eq!(second.record_count, 1);
        assert_eq!(second.bucket_id, first.bucket_id + 1);
        assert_eq!(&written[8..16], b"retry me");
    }

    #[test]
    fn resolve_unknown_bucket_is_noop() {
        let mut collector = collector(1024);
        collector.add_record("keep").unwrap();
        collector
            .resolve_bucket(999, DeliveryResult::Success)
            .unwrap();
        collector
            .resolve_bucket(999, DeliveryResult::Failure)
            .unwrap();
        assert_eq!(collector.storage().unwrap().total_size(), 4);
    }

    #[test]
    fn upload_decision_requests_logging_sync() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let mut collector = LogCollector::new(Arc::new(MemoryStatusStore::new()));
        collector
            .init(
                Box::new(InMemoryLogStorage::new()),
                Box::new(|_: &dyn LogStorage| UploadDecision::Upload),
                LogUploadProperties::default(),
            )
            .unwrap();

        // No trigger registered: nothing happens, nothing fails.
        collector.add_record("one").unwrap();

        collector.set_sync_trigger(Arc::new(move |services: &[SyncService]| {
            assert_eq!(services, &[SyncService::Logging]);
            seen.fetch_add(1, Ordering::SeqCst);
        }));
        collector.add_record("two").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        collector.clear_sync_trigger();
        collector.add_record("three").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cleanup_decision_shrinks_storage() {
        let mut collector = LogCollector::new(Arc::new(MemoryStatusStore::new()));
        collector
            .init(
                Box::new(InMemoryLogStorage::new()),
                Box::new(|storage: &dyn LogStorage| {
                    if storage.total_size() > 10 {
                        UploadDecision::Cleanup
                    } else {
                        UploadDecision::NoAction
                    }
                }),
                LogUploadProperties::new(10, 1024),
            )
            .unwrap();

        collector.add_record("aaaaaa").unwrap();
        collector.add_record("bbbbbb").unwrap();

        let storage = collector.storage().unwrap();
        assert_eq!(storage.total_size(), 6);
        assert_eq!(storage.records_count(), 1);
    }

    #[test]
    fn built_bucket_decodes() {
        let mut collector = collector(1024);
        collector.add_record("alpha").unwrap();
        collector.add_record("beta").unwrap();

        let mut buf = vec![0u8; collector.estimate_request_size().unwrap()];
        let mut writer = MessageWriter::new(&mut buf);
        let summary = collector.serialize_request(&mut writer).unwrap();
        let len = writer.position();

        let request = LogSyncRequest::decode(&buf[..len]).unwrap();
        assert_eq!(request.bucket_id, summary.bucket_id);
        assert_eq!(request.records, vec![&b"alpha"[..], &b"beta"[..]]);
    }
}
