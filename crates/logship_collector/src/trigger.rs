//! Sync scheduling hook.

/// Client capabilities that can ask for a sync round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SyncService {
    /// Log upload.
    Logging,
}

/// Schedules a sync round for a set of services.
///
/// Implemented by the channel layer. Closures taking `&[SyncService]`
/// implement it directly.
pub trait SyncTrigger: Send + Sync {
    /// Requests that the given services be included in the next sync.
    fn request_sync(&self, services: &[SyncService]);
}

impl<F> SyncTrigger for F
where
    F: Fn(&[SyncService]) + Send + Sync,
{
    fn request_sync(&self, services: &[SyncService]) {
        self(services)
    }
}
