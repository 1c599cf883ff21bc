//! Collector fixtures.

use logship_codec::{LogSyncRequest, MessageWriter};
use logship_collector::{
    LogCollector, LogUploadProperties, MemoryStatusStore, RequestSummary, UploadDecision,
};
use logship_storage::{InMemoryLogStorage, LogStorage};
use std::sync::Arc;

/// Properties roomy enough that limits never interfere.
pub fn roomy_properties() -> LogUploadProperties {
    LogUploadProperties::new(1024 * 1024, 64 * 1024)
}

/// An in-memory collector that never uploads or cleans up.
pub fn memory_collector(properties: LogUploadProperties) -> LogCollector {
    let mut collector = LogCollector::new(Arc::new(MemoryStatusStore::new()));
    collector
        .init(
            Box::new(InMemoryLogStorage::new()),
            Box::new(|_: &dyn LogStorage| UploadDecision::NoAction),
            properties,
        )
        .expect("Failed to initialize collector");
    collector
}

/// A collector over `storage` with [`roomy_properties`].
pub fn collector_with_storage(storage: Box<dyn LogStorage>) -> LogCollector {
    let mut collector = LogCollector::new(Arc::new(MemoryStatusStore::new()));
    collector
        .init(
            storage,
            Box::new(|_: &dyn LogStorage| UploadDecision::NoAction),
            roomy_properties(),
        )
        .expect("Failed to initialize collector");
    collector
}

/// Adds each payload as a record.
pub fn add_all<P: AsRef<[u8]>>(collector: &mut LogCollector, payloads: &[P]) {
    for payload in payloads {
        collector
            .add_record(payload.as_ref())
            .expect("Failed to add record");
    }
}

/// A serialized logging extension with owned bytes.
#[derive(Debug, Clone)]
pub struct SerializedRequest {
    /// What the collector reported.
    pub summary: RequestSummary,
    /// The encoded extension, header included.
    pub bytes: Vec<u8>,
}

impl SerializedRequest {
    /// Decodes the extension.
    pub fn decode(&self) -> LogSyncRequest<'_> {
        LogSyncRequest::decode(&self.bytes).expect("Collector produced an undecodable request")
    }
}

/// Serializes the next request into a buffer sized by the collector's own
/// estimate.
pub fn serialize_next(
    collector: &mut LogCollector,
) -> logship_collector::CollectorResult<SerializedRequest> {
    let mut bytes = vec![0u8; collector.estimate_request_size()?];
    let mut writer = MessageWriter::new(&mut bytes);
    let summary = collector.serialize_request(&mut writer)?;
    bytes.truncate(summary.encoded_len());
    Ok(SerializedRequest { summary, bytes })
}
