//! # logship Collector
//!
//! Client-side log shipping engine.
//!
//! The collector batches application log records into numbered buckets,
//! frames one bucket per client sync message, and applies the server's
//! per-bucket acknowledgment: delivered buckets are dropped from storage,
//! failed buckets are released for a later retry. After every change to
//! storage an [`UploadStrategy`] decides whether to request a sync round,
//! evict old records, or do nothing.
//!
//! ## Collaborators
//!
//! - [`LogStorage`](logship_storage::LogStorage): owns the buffered records
//! - [`StatusStore`]: persists the last bucket id across restarts
//! - [`UploadStrategy`]: turns storage occupancy into an [`UploadDecision`]
//! - [`SyncTrigger`]: asks the channel layer for a sync round
//!
//! ## Concurrency
//!
//! A [`LogCollector`] holds no lock. Operations take `&mut self` and are
//! meant to run on one control thread. When an application thread logs
//! while a network thread processes acknowledgments, share the collector
//! as a [`SharedLogCollector`].
//!
//! ## Example
//!
//! ```rust
//! use logship_collector::{
//!     LogCollector, LogUploadProperties, MemoryStatusStore, VolumeUploadStrategy,
//! };
//! use logship_codec::{LogSyncRequest, MessageWriter};
//! use logship_storage::InMemoryLogStorage;
//! use std::sync::Arc;
//!
//! let mut collector = LogCollector::new(Arc::new(MemoryStatusStore::new()));
//! collector
//!     .init(
//!         Box::new(InMemoryLogStorage::new()),
//!         Box::new(VolumeUploadStrategy::new(4 * 1024, 64 * 1024)),
//!         LogUploadProperties::default(),
//!     )
//!     .unwrap();
//!
//! collector.add_record("service started").unwrap();
//!
//! let mut buf = vec![0u8; collector.estimate_request_size().unwrap()];
//! let mut writer = MessageWriter::new(&mut buf);
//! let summary = collector.serialize_request(&mut writer).unwrap();
//!
//! let request = LogSyncRequest::decode(&buf[..summary.encoded_len()]).unwrap();
//! assert_eq!(request.records, vec![&b"service started"[..]]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collector;
mod config;
mod error;
mod extension;
mod record;
mod status;
mod strategy;
mod trigger;

pub use collector::{BucketSummary, LogCollector};
pub use config::LogUploadProperties;
pub use error::{CollectorError, CollectorResult};
pub use extension::RequestSummary;
pub use record::{CborLogRecord, UserLogRecord};
pub use status::{MemoryStatusStore, StatusError, StatusResult, StatusStore};
pub use strategy::{UploadDecision, UploadStrategy, VolumeUploadStrategy};
pub use trigger::{SyncService, SyncTrigger};

use parking_lot::Mutex;
use std::sync::Arc;

/// A collector shared between logging and network contexts.
pub type SharedLogCollector = Arc<Mutex<LogCollector>>;

/// Wraps a collector for shared use.
pub fn shared(collector: LogCollector) -> SharedLogCollector {
    Arc::new(Mutex::new(collector))
}
