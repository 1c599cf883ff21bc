//! Logging extension framing.
//!
//! The collector speaks one extension of the client sync message. Outgoing,
//! it carries a single bucket behind a generic extension header whose length
//! is backpatched once the bucket is packed. Incoming, it carries the
//! server's delivery status for one bucket.

use crate::collector::LogCollector;
use crate::error::{CollectorError, CollectorResult};
use logship_codec::{
    ExtensionHeader, LogDeliveryStatus, MessageReader, MessageWriter, DELIVERY_STATUS_SIZE,
    EXTENSION_HEADER_SIZE, LOGGING_EXTENSION_TYPE, RECEIVE_UPDATES_FLAG,
};
use logship_storage::BucketId;
use tracing::{debug, info, trace};

/// Outcome of serializing a logging extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSummary {
    /// Id of the bucket carried by the extension.
    pub bucket_id: BucketId,
    /// Number of records in the bucket.
    pub record_count: u16,
    /// Payload length written into the extension header.
    pub extension_length: u32,
}

impl RequestSummary {
    /// Total bytes written, header included.
    pub fn encoded_len(&self) -> usize {
        EXTENSION_HEADER_SIZE + self.extension_length as usize
    }
}

impl LogCollector {
    /// Writes a logging extension carrying the next bucket.
    ///
    /// The bucket holds at most `max_log_bucket_size` bytes of framed
    /// records, further limited by the space left in `writer`.
    ///
    /// # Errors
    ///
    /// Everything [`LogCollector::build_bucket`] reports, plus
    /// [`CollectorError::WriteFailed`] if the header does not fit. The
    /// writer is left at its starting position on error.
    pub fn serialize_request(
        &mut self,
        writer: &mut MessageWriter<'_>,
    ) -> CollectorResult<RequestSummary> {
        let budget = self
            .properties()
            .ok_or(CollectorError::NotInitialized)?
            .max_log_bucket_size;

        let start = writer.position();
        let result = self.write_extension(writer, budget);
        if result.is_err() {
            writer.rewind(start);
        }
        result
    }

    fn write_extension(
        &mut self,
        writer: &mut MessageWriter<'_>,
        budget: usize,
    ) -> CollectorResult<RequestSummary> {
        let length_slot = ExtensionHeader::new(LOGGING_EXTENSION_TYPE, RECEIVE_UPDATES_FLAG, 0)
            .encode(writer)
            .map_err(CollectorError::WriteFailed)?;
        let payload_start = writer.position();

        let bucket = self.build_bucket(writer, budget)?;

        let payload_len = writer.position() - payload_start;
        let patched = u32::try_from(payload_len)
            .map_err(|_| logship_codec::CodecError::ValueTooLarge {
                value: payload_len as u64,
                max: u64::from(u32::MAX),
            })
            .and_then(|len| writer.patch_u32(length_slot, len).map(|()| len));
        let extension_length = match patched {
            Ok(len) => len,
            Err(e) => {
                self.abandon_bucket(bucket.bucket_id);
                return Err(CollectorError::WriteFailed(e));
            }
        };

        debug!(
            bucket_id = bucket.bucket_id,
            record_count = bucket.record_count,
            extension_length,
            "Created log sync request"
        );
        Ok(RequestSummary {
            bucket_id: bucket.bucket_id,
            record_count: bucket.record_count,
            extension_length,
        })
    }

    /// Processes the logging extension of a server sync message.
    ///
    /// `reader` is positioned at the extension payload. Payloads shorter
    /// than a delivery status carry nothing to process and are skipped
    /// without consuming bytes. Otherwise exactly one delivery status is
    /// consumed and applied with [`LogCollector::resolve_bucket`].
    ///
    /// # Errors
    ///
    /// - [`CollectorError::NotInitialized`] before init
    /// - [`CollectorError::ReadFailed`] if the reader holds fewer bytes than
    ///   the announced length
    /// - storage errors from resolving the bucket
    pub fn handle_server_sync(
        &mut self,
        reader: &mut MessageReader<'_>,
        extension_options: u32,
        extension_length: usize,
    ) -> CollectorResult<()> {
        info!(extension_options, extension_length, "Received logging server sync");

        if extension_length < DELIVERY_STATUS_SIZE {
            trace!("No log delivery status in server sync");
            return Ok(());
        }
        if !self.is_initialized() {
            return Err(CollectorError::NotInitialized);
        }

        let status = LogDeliveryStatus::decode(reader).map_err(CollectorError::ReadFailed)?;
        debug!(
            bucket_id = status.bucket_id,
            delivered = status.result.is_success(),
            "Log bucket delivery status"
        );
        self.resolve_bucket(status.bucket_id, status.result)
    }
}
