//! Upload strategies.

use logship_storage::LogStorage;

/// What to do with the buffered logs after storage changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadDecision {
    /// Leave storage as it is.
    NoAction,
    /// Ask for a sync round so a bucket gets shipped.
    Upload,
    /// Evict records down to the configured storage volume.
    Cleanup,
}

/// Decides when buffered logs are shipped or evicted.
///
/// Strategies are pure functions of the storage occupancy. Closures taking
/// `&dyn LogStorage` implement this trait directly.
pub trait UploadStrategy: Send {
    /// Inspects storage and returns the next action.
    fn decide(&self, storage: &dyn LogStorage) -> UploadDecision;
}

impl<F> UploadStrategy for F
where
    F: Fn(&dyn LogStorage) -> UploadDecision + Send,
{
    fn decide(&self, storage: &dyn LogStorage) -> UploadDecision {
        self(storage)
    }
}

/// Uploads once enough data is buffered and cleans up past a hard limit.
///
/// - `Cleanup` when occupancy exceeds `max_volume`
/// - `Upload` when occupancy reaches `volume_threshold`, or the pending
///   record count reaches the optional count threshold
/// - `NoAction` otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeUploadStrategy {
    volume_threshold: usize,
    max_volume: usize,
    count_threshold: Option<usize>,
}

impl VolumeUploadStrategy {
    /// Creates a strategy with upload and cleanup volumes in bytes.
    pub fn new(volume_threshold: usize, max_volume: usize) -> Self {
        Self {
            volume_threshold,
            max_volume,
            count_threshold: None,
        }
    }

    /// Also uploads once `count` records are pending.
    pub fn with_count_threshold(mut self, count: usize) -> Self {
        self.count_threshold = Some(count);
        self
    }
}

impl UploadStrategy for VolumeUploadStrategy {
    fn decide(&self, storage: &dyn LogStorage) -> UploadDecision {
        let total = storage.total_size();
        if total > self.max_volume {
            return UploadDecision::Cleanup;
        }
        if total >= self.volume_threshold {
            return UploadDecision::Upload;
        }
        match self.count_threshold {
            Some(count) if storage.records_count() >= count => UploadDecision::Upload,
            _ => UploadDecision::NoAction,
        }
    }
}
