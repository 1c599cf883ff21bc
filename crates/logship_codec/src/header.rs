//! Platform extension header framing and alignment.

use crate::error::{CodecError, CodecResult};
use crate::reader::MessageReader;
use crate::writer::{MessageWriter, Slot};

/// Size of an encoded extension header in bytes.
pub const EXTENSION_HEADER_SIZE: usize = 8;

/// Largest value the 24-bit options field can carry.
pub const MAX_EXTENSION_OPTIONS: u32 = 0x00FF_FFFF;

/// Alignment of records inside an extension payload.
pub const ALIGNMENT: usize = 4;

/// Rounds `len` up to the next multiple of [`ALIGNMENT`].
pub const fn aligned_size(len: usize) -> usize {
    len.next_multiple_of(ALIGNMENT)
}

/// Rounds `len` down to a multiple of [`ALIGNMENT`].
pub const fn align_down(len: usize) -> usize {
    len - len % ALIGNMENT
}

/// Header that precedes every extension in a sync message.
///
/// Layout (8 bytes, big-endian):
///
/// ```text
/// | type: u8 | options: u24 | payload_length: u32 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionHeader {
    /// Extension type tag.
    pub extension_type: u8,
    /// Extension specific option bits (24 significant bits).
    pub options: u32,
    /// Length of the payload that follows the header.
    pub payload_length: u32,
}

impl ExtensionHeader {
    /// Creates a header.
    pub fn new(extension_type: u8, options: u32, payload_length: u32) -> Self {
        Self {
            extension_type,
            options,
            payload_length,
        }
    }

    /// Writes the header and returns the slot holding the payload length,
    /// so it can be backpatched once the payload is known.
    ///
    /// # Errors
    ///
    /// Fails if the options do not fit in 24 bits or the writer is full.
    pub fn encode(&self, writer: &mut MessageWriter<'_>) -> CodecResult<Slot> {
        if self.options > MAX_EXTENSION_OPTIONS {
            return Err(CodecError::ValueTooLarge {
                value: u64::from(self.options),
                max: u64::from(MAX_EXTENSION_OPTIONS),
            });
        }
        if writer.remaining() < EXTENSION_HEADER_SIZE {
            return Err(CodecError::BufferOverflow {
                needed: EXTENSION_HEADER_SIZE,
                remaining: writer.remaining(),
            });
        }

        writer.write_u32((u32::from(self.extension_type) << 24) | self.options)?;
        let length = writer.reserve(4)?;
        writer.patch_u32(length, self.payload_length)?;
        Ok(length)
    }

    /// Reads a header.
    pub fn decode(reader: &mut MessageReader<'_>) -> CodecResult<Self> {
        if reader.remaining() < EXTENSION_HEADER_SIZE {
            return Err(CodecError::UnexpectedEof {
                needed: EXTENSION_HEADER_SIZE,
                remaining: reader.remaining(),
            });
        }

        let type_and_options = reader.read_u32()?;
        let payload_length = reader.read_u32()?;
        Ok(Self {
            extension_type: (type_and_options >> 24) as u8,
            options: type_and_options & MAX_EXTENSION_OPTIONS,
            payload_length,
        })
    }
}
