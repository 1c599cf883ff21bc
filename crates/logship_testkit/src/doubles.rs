//! Test doubles for collector collaborators.
//!
//! Every double keeps its state behind an `Arc`, so a test can hand one
//! clone to the collector and inspect or reprogram another.

use logship_collector::{
    StatusError, StatusResult, StatusStore, SyncService, SyncTrigger, UploadDecision,
    UploadStrategy,
};
use logship_storage::{
    BucketId, InMemoryLogStorage, LogRecord, LogStorage, RejectedRecord, StorageError,
    StorageResult,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Faults to inject and calls observed by a [`FaultyStorage`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FaultPlan {
    /// Buffer allocation reports `AllocationFailed`.
    pub fail_allocate: bool,
    /// Record registration is rejected.
    pub fail_add: bool,
    /// Extraction fails with a backend error once this many records have
    /// been extracted.
    pub fail_extract_after: Option<usize>,
    /// Bucket removal fails.
    pub fail_remove: bool,
    /// Bucket unmarking fails.
    pub fail_unmark: bool,
    /// Cleanup fails.
    pub fail_shrink: bool,

    /// Successful extractions so far.
    pub extractions: usize,
    /// Buffers handed back through `release_record_buffer`.
    pub buffer_releases: usize,
    /// Calls to `shrink_to_size`.
    pub shrinks: usize,
    /// Calls to `release`.
    pub releases: usize,
}

/// Shared handle to a [`FaultPlan`].
pub type SharedFaultPlan = Arc<Mutex<FaultPlan>>;

/// In-memory storage that fails on command.
#[derive(Debug)]
pub struct FaultyStorage {
    inner: InMemoryLogStorage,
    plan: SharedFaultPlan,
}

impl FaultyStorage {
    /// Wraps a fresh [`InMemoryLogStorage`], following `plan`.
    pub fn new(plan: SharedFaultPlan) -> Self {
        Self {
            inner: InMemoryLogStorage::new(),
            plan,
        }
    }

    fn injected(operation: &str) -> StorageError {
        StorageError::backend(format!("injected {} failure", operation))
    }
}

impl LogStorage for FaultyStorage {
    fn allocate_record_buffer(&mut self, size: usize) -> StorageResult<LogRecord> {
        if self.plan.lock().fail_allocate {
            return Err(StorageError::AllocationFailed { size });
        }
        self.inner.allocate_record_buffer(size)
    }

    fn add_record(&mut self, record: LogRecord) -> Result<(), RejectedRecord> {
        if self.plan.lock().fail_add {
            return Err(RejectedRecord::new(record, Self::injected("add")));
        }
        self.inner.add_record(record)
    }

    fn release_record_buffer(&mut self, record: LogRecord) {
        self.plan.lock().buffer_releases += 1;
        self.inner.release_record_buffer(record);
    }

    fn total_size(&self) -> usize {
        self.inner.total_size()
    }

    fn records_count(&self) -> usize {
        self.inner.records_count()
    }

    fn write_next_record(
        &mut self,
        buffer: &mut [u8],
        bucket_id: BucketId,
    ) -> StorageResult<usize> {
        let mut plan = self.plan.lock();
        if plan.fail_extract_after.is_some_and(|limit| plan.extractions >= limit) {
            return Err(Self::injected("extract"));
        }
        let len = self.inner.write_next_record(buffer, bucket_id)?;
        plan.extractions += 1;
        Ok(len)
    }

    fn remove_by_bucket_id(&mut self, bucket_id: BucketId) -> StorageResult<()> {
        if self.plan.lock().fail_remove {
            return Err(Self::injected("remove"));
        }
        self.inner.remove_by_bucket_id(bucket_id)
    }

    fn unmark_by_bucket_id(&mut self, bucket_id: BucketId) -> StorageResult<()> {
        if self.plan.lock().fail_unmark {
            return Err(Self::injected("unmark"));
        }
        self.inner.unmark_by_bucket_id(bucket_id)
    }

    fn shrink_to_size(&mut self, volume: usize) -> StorageResult<()> {
        let mut plan = self.plan.lock();
        plan.shrinks += 1;
        if plan.fail_shrink {
            return Err(Self::injected("shrink"));
        }
        self.inner.shrink_to_size(volume)
    }

    fn release(&mut self) {
        self.plan.lock().releases += 1;
        self.inner.release();
    }
}

/// A sync trigger that records every request.
#[derive(Debug, Default, Clone)]
pub struct RecordingTrigger {
    requests: Arc<Mutex<Vec<Vec<SyncService>>>>,
}

impl RecordingTrigger {
    /// Creates a trigger with no recorded requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sync requests so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    /// The services of every request, in order.
    pub fn requests(&self) -> Vec<Vec<SyncService>> {
        self.requests.lock().clone()
    }
}

impl SyncTrigger for RecordingTrigger {
    fn request_sync(&self, services: &[SyncService]) {
        self.requests.lock().push(services.to_vec());
    }
}

/// Storage occupancy seen by a [`ScriptedStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupancy {
    /// Stored bytes.
    pub total_size: usize,
    /// Pending records.
    pub records_count: usize,
}

#[derive(Debug, Default)]
struct Script {
    decisions: VecDeque<UploadDecision>,
    observed: Vec<Occupancy>,
}

/// An upload strategy that replays queued decisions.
///
/// Once the queue is empty it answers [`UploadDecision::NoAction`].
#[derive(Debug, Default, Clone)]
pub struct ScriptedStrategy {
    script: Arc<Mutex<Script>>,
}

impl ScriptedStrategy {
    /// Creates a strategy with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the next decisions.
    pub fn push(&self, decisions: impl IntoIterator<Item = UploadDecision>) {
        self.script.lock().decisions.extend(decisions);
    }

    /// Occupancy passed to every consultation, in order.
    pub fn observed(&self) -> Vec<Occupancy> {
        self.script.lock().observed.clone()
    }

    /// Number of consultations.
    pub fn consultations(&self) -> usize {
        self.script.lock().observed.len()
    }
}

impl UploadStrategy for ScriptedStrategy {
    fn decide(&self, storage: &dyn LogStorage) -> UploadDecision {
        let mut script = self.script.lock();
        script.observed.push(Occupancy {
            total_size: storage.total_size(),
            records_count: storage.records_count(),
        });
        script
            .decisions
            .pop_front()
            .unwrap_or(UploadDecision::NoAction)
    }
}

/// A status store whose reads and writes can be made to fail.
#[derive(Debug, Default)]
pub struct FlakyStatusStore {
    log_bucket_id: Mutex<u16>,
    /// Loading the bucket id fails.
    pub fail_load: Mutex<bool>,
    /// Persisting the bucket id fails.
    pub fail_store: Mutex<bool>,
    stores: Mutex<usize>,
}

impl FlakyStatusStore {
    /// Creates a store seeded with `bucket_id`.
    pub fn with_log_bucket_id(bucket_id: u16) -> Self {
        Self {
            log_bucket_id: Mutex::new(bucket_id),
            ..Self::default()
        }
    }

    /// Number of successful writes.
    pub fn stores(&self) -> usize {
        *self.stores.lock()
    }
}

impl StatusStore for FlakyStatusStore {
    fn log_bucket_id(&self) -> StatusResult<u16> {
        if *self.fail_load.lock() {
            return Err(StatusError::Unavailable("injected load failure".into()));
        }
        Ok(*self.log_bucket_id.lock())
    }

    fn set_log_bucket_id(&self, bucket_id: u16) -> StatusResult<()> {
        if *self.fail_store.lock() {
            return Err(StatusError::Unavailable("injected store failure".into()));
        }
        *self.log_bucket_id.lock() = bucket_id;
        *self.stores.lock() += 1;
        Ok(())
    }
}
