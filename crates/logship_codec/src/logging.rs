//! Wire layout of the logging extension.
//!
//! Client request payload, following the extension header:
//!
//! ```text
//! | bucket_id: u16 | record_count: u16 |
//! | len: u32 | payload (len bytes) | 0..=3 zero bytes |   x record_count
//! ```
//!
//! Server acknowledgment payload:
//!
//! ```text
//! | bucket_id: u16 | result: u8 | reserved: u8 |
//! ```

use crate::error::{CodecError, CodecResult};
use crate::header::{aligned_size, ExtensionHeader};
use crate::reader::MessageReader;
use crate::writer::MessageWriter;

/// Extension type tag of the logging extension.
pub const LOGGING_EXTENSION_TYPE: u8 = 4;

/// Option bit telling the server the client accepts log delivery updates.
pub const RECEIVE_UPDATES_FLAG: u32 = 0x01;

/// Size of the bucket id and record count fields.
pub const BUCKET_FIELDS_SIZE: usize = 4;

/// Size of the length prefix in front of every record.
pub const RECORD_LENGTH_PREFIX_SIZE: usize = 4;

/// Largest padding a record can carry.
pub const MAX_PADDING_LENGTH: usize = 3;

/// Minimum payload length of a delivery acknowledgment.
pub const DELIVERY_STATUS_SIZE: usize = 4;

/// Size of a record once framed: prefix, payload and padding.
pub const fn framed_record_size(len: usize) -> usize {
    RECORD_LENGTH_PREFIX_SIZE + aligned_size(len)
}

/// Outcome the server reports for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryResult {
    /// The bucket was stored by the server.
    Success,
    /// The bucket was not stored and should be sent again.
    Failure,
}

impl DeliveryResult {
    /// Maps a wire result code. Zero is success, anything else failure.
    pub fn from_code(code: u8) -> Self {
        if code == 0 {
            Self::Success
        } else {
            Self::Failure
        }
    }

    /// The canonical wire code.
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0x00,
            Self::Failure => 0x01,
        }
    }

    /// Returns true for [`DeliveryResult::Success`].
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// The server's acknowledgment for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogDeliveryStatus {
    /// Bucket the acknowledgment refers to.
    pub bucket_id: u16,
    /// Delivery outcome.
    pub result: DeliveryResult,
}

impl LogDeliveryStatus {
    /// Creates an acknowledgment.
    pub fn new(bucket_id: u16, result: DeliveryResult) -> Self {
        Self { bucket_id, result }
    }

    /// Writes the acknowledgment payload.
    pub fn encode(&self, writer: &mut MessageWriter<'_>) -> CodecResult<()> {
        if writer.remaining() < DELIVERY_STATUS_SIZE {
            return Err(CodecError::BufferOverflow {
                needed: DELIVERY_STATUS_SIZE,
                remaining: writer.remaining(),
            });
        }
        writer.write_u16(self.bucket_id)?;
        writer.write_u8(self.result.code())?;
        writer.write_u8(0)
    }

    /// Reads an acknowledgment payload.
    ///
    /// The result code is the first byte of the 16-bit slot after the bucket
    /// id (payload offset 2); offset 3 is never interpreted. Servers that
    /// send the code as a big-endian u16 would put it at offset 3 instead,
    /// which has not been confirmed against the server implementation.
    pub fn decode(reader: &mut MessageReader<'_>) -> CodecResult<Self> {
        if reader.remaining() < DELIVERY_STATUS_SIZE {
            return Err(CodecError::UnexpectedEof {
                needed: DELIVERY_STATUS_SIZE,
                remaining: reader.remaining(),
            });
        }
        let bucket_id = reader.read_u16()?;
        let slot = reader.read_bytes(2)?;
        Ok(Self {
            bucket_id,
            result: DeliveryResult::from_code(slot[0]),
        })
    }
}

/// A decoded logging extension as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSyncRequest<'a> {
    /// The extension header.
    pub header: ExtensionHeader,
    /// Bucket id shared by every record.
    pub bucket_id: u16,
    /// Record payloads, without prefix or padding.
    pub records: Vec<&'a [u8]>,
}

impl<'a> LogSyncRequest<'a> {
    /// Parses a full logging extension, header included.
    ///
    /// # Errors
    ///
    /// Fails on truncated input, a foreign extension type, non-zero padding,
    /// or bytes left over after the announced record count.
    pub fn decode(bytes: &'a [u8]) -> CodecResult<Self> {
        let mut reader = MessageReader::new(bytes);
        let header = ExtensionHeader::decode(&mut reader)?;
        if header.extension_type != LOGGING_EXTENSION_TYPE {
            return Err(CodecError::invalid_structure(format!(
                "expected logging extension type {}, found {}",
                LOGGING_EXTENSION_TYPE, header.extension_type
            )));
        }

        let payload = reader.read_bytes(header.payload_length as usize)?;
        let mut payload = MessageReader::new(payload);
        let bucket_id = payload.read_u16()?;
        let count = payload.read_u16()?;

        let mut records = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let len = payload.read_u32()? as usize;
            records.push(payload.read_bytes(len)?);
            let padding = payload.read_bytes(aligned_size(len) - len)?;
            if padding.iter().any(|b| *b != 0) {
                return Err(CodecError::invalid_structure("non-zero record padding"));
            }
        }

        if !payload.is_empty() {
            return Err(CodecError::invalid_structure(format!(
                "{} trailing bytes after {} records",
                payload.remaining(),
                count
            )));
        }

        Ok(Self {
            header,
            bucket_id,
            records,
        })
    }

    /// Number of records in the bucket.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Sum of the record payload lengths.
    pub fn records_size(&self) -> usize {
        self.records.iter().map(|r| r.len()).sum()
    }

    /// Returns true if the client asked for delivery updates.
    pub fn receives_updates(&self) -> bool {
        self.header.options & RECEIVE_UPDATES_FLAG != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::EXTENSION_HEADER_SIZE;

    fn hand_built_request() -> Vec<u8> {
        let mut bytes = vec![LOGGING_EXTENSION_TYPE, 0, 0, 1, 0, 0, 0, 16];
        bytes.extend_from_slice(&[0x00, 0x07, 0x00, 0x02]);
        bytes.extend_from_slice(&[0, 0, 0, 3, b'a', b'b', b'c', 0]);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes
    }

    #[test]
    fn decode_request() {
        let bytes = hand_built_request();
        let request = LogSyncRequest::decode(&bytes).unwrap();

        assert_eq!(request.bucket_id, 7);
        assert_eq!(request.record_count(), 2);
        assert_eq!(request.records[0], b"abc");
        assert!(request.records[1].is_empty());
        assert_eq!(request.records_size(), 3);
        assert!(request.receives_updates());
        assert_eq!(
            request.header.payload_length as usize,
            bytes.len() - EXTENSION_HEADER_SIZE
        );
    }

    #[test]
    fn decode_request_rejects_foreign_type() {
        let mut bytes = hand_built_request();
        bytes[0] = 6;
        assert!(matches!(
            LogSyncRequest::decode(&bytes),
            Err(CodecError::InvalidStructure { .. })
        ));
    }

    #[test]
    fn decode_request_rejects_dirty_padding() {
        let mut bytes = hand_built_request();
        bytes[19] = 0xFF;
        assert!(LogSyncRequest::decode(&bytes).is_err());
    }

    #[test]
    fn decode_request_rejects_trailing_bytes() {
        let mut bytes = hand_built_request();
        bytes[7] = 20;
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        assert!(LogSyncRequest::decode(&bytes).is_err());
    }

    #[test]
    fn decode_request_rejects_truncation() {
        let bytes = hand_built_request();
        assert!(matches!(
            LogSyncRequest::decode(&bytes[..bytes.len() - 1]),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn delivery_status_layout() {
        let mut buf = [0u8; 4];
        let mut writer = MessageWriter::new(&mut buf);
        LogDeliveryStatus::new(0x0102, DeliveryResult::Failure)
            .encode(&mut writer)
            .unwrap();
        assert_eq!(buf, [0x01, 0x02, 0x01, 0x00]);
    }

    #[test]
    fn delivery_status_reads_code_at_offset_two() {
        let status = LogDeliveryStatus::decode(&mut MessageReader::new(&[0, 9, 0, 0])).unwrap();
        assert_eq!(status, LogDeliveryStatus::new(9, DeliveryResult::Success));

        let status = LogDeliveryStatus::decode(&mut MessageReader::new(&[0, 9, 2, 0])).unwrap();
        assert_eq!(status.result, DeliveryResult::Failure);

        // Offset 3 is not part of the result code.
        let status = LogDeliveryStatus::decode(&mut MessageReader::new(&[0, 9, 0, 1])).unwrap();
        assert_eq!(status.result, DeliveryResult::Success);
    }

    #[test]
    fn delivery_status_needs_four_bytes() {
        let mut reader = MessageReader::new(&[0, 1, 0]);
        assert!(LogDeliveryStatus::decode(&mut reader).is_err());
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn framed_sizes() {
        assert_eq!(framed_record_size(0), 4);
        assert_eq!(framed_record_size(10), 16);
        assert_eq!(framed_record_size(20), 24);
    }
}
