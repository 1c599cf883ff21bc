//! Application log records.

use crate::error::{CollectorError, CollectorResult};
use logship_codec::{CodecResult, MessageWriter};
use serde::Serialize;

/// A log record produced by the application.
///
/// The collector asks for the serialized size first, has storage allocate
/// a buffer of exactly that size, then serializes into it.
pub trait UserLogRecord {
    /// Number of bytes [`Self::serialize`] will write.
    fn serialized_size(&self) -> usize;

    /// Writes the serialized record.
    fn serialize(&self, writer: &mut MessageWriter<'_>) -> CodecResult<()>;
}

impl UserLogRecord for [u8] {
    fn serialized_size(&self) -> usize {
        self.len()
    }

    fn serialize(&self, writer: &mut MessageWriter<'_>) -> CodecResult<()> {
        writer.write_bytes(self)
    }
}

impl UserLogRecord for Vec<u8> {
    fn serialized_size(&self) -> usize {
        self.len()
    }

    fn serialize(&self, writer: &mut MessageWriter<'_>) -> CodecResult<()> {
        writer.write_bytes(self)
    }
}

impl UserLogRecord for str {
    fn serialized_size(&self) -> usize {
        self.len()
    }

    fn serialize(&self, writer: &mut MessageWriter<'_>) -> CodecResult<()> {
        writer.write_bytes(self.as_bytes())
    }
}

impl UserLogRecord for String {
    fn serialized_size(&self) -> usize {
        self.len()
    }

    fn serialize(&self, writer: &mut MessageWriter<'_>) -> CodecResult<()> {
        writer.write_bytes(self.as_bytes())
    }
}

/// A structured record encoded as CBOR.
///
/// ```
/// use logship_collector::{CborLogRecord, UserLogRecord};
///
/// #[derive(serde::Serialize)]
/// struct Reading {
///     sensor: &'static str,
///     value: i32,
/// }
///
/// let record = CborLogRecord::new(&Reading { sensor: "t0", value: 21 }).unwrap();
/// assert!(record.serialized_size() > 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CborLogRecord {
    bytes: Vec<u8>,
}

impl CborLogRecord {
    /// Encodes `value` as CBOR.
    pub fn new<T: Serialize + ?Sized>(value: &T) -> CollectorResult<Self> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(value, &mut bytes)
            .map_err(|e| CollectorError::Serialization(e.to_string()))?;
        Ok(Self { bytes })
    }

    /// The encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl UserLogRecord for CborLogRecord {
    fn serialized_size(&self) -> usize {
        self.bytes.len()
    }

    fn serialize(&self, writer: &mut MessageWriter<'_>) -> CodecResult<()> {
        writer.write_bytes(&self.bytes)
    }
}
