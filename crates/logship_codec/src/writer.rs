//! Bounds-checked message writer.

use crate::error::{CodecError, CodecResult};

/// A placeholder reserved in the output buffer and filled in later.
///
/// Slots are plain offsets into the writer's buffer, so they stay valid for
/// as long as the writer does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    offset: usize,
    len: usize,
}

impl Slot {
    /// Offset of the slot from the start of the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Width of the slot in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true for a zero-width slot.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Writes big-endian fields into a caller supplied buffer.
///
/// Every write checks the remaining capacity first and fails with
/// [`CodecError::BufferOverflow`] instead of writing partially.
///
/// # Example
///
/// ```
/// use logship_codec::MessageWriter;
///
/// let mut buf = [0u8; 8];
/// let mut writer = MessageWriter::new(&mut buf);
/// let len = writer.reserve(4).unwrap();
/// writer.write_u16(0xBEEF).unwrap();
/// writer.patch_u32(len, 2).unwrap();
/// assert_eq!(writer.written(), &[0, 0, 0, 2, 0xBE, 0xEF]);
/// ```
#[derive(Debug)]
pub struct MessageWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> MessageWriter<'a> {
    /// Creates a writer positioned at the start of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Creates a writer positioned at `pos` inside `buf`.
    ///
    /// # Errors
    ///
    /// Returns an error if `pos` lies past the end of `buf`.
    pub fn at(buf: &'a mut [u8], pos: usize) -> CodecResult<Self> {
        if pos > buf.len() {
            return Err(CodecError::BufferOverflow {
                needed: pos,
                remaining: buf.len(),
            });
        }
        Ok(Self { buf, pos })
    }

    /// Current write position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total size of the underlying buffer.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes left between the position and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Bytes written so far, from the start of the buffer.
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    /// Moves the position back to `pos`, discarding later writes.
    ///
    /// Positions ahead of the current one are ignored.
    pub fn rewind(&mut self, pos: usize) {
        if pos < self.pos {
            self.pos = pos;
        }
    }

    fn ensure(&self, needed: usize) -> CodecResult<()> {
        if needed > self.remaining() {
            return Err(CodecError::BufferOverflow {
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.ensure(bytes.len())?;
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    /// Writes a single byte.
    pub fn write_u8(&mut self, value: u8) -> CodecResult<()> {
        self.write_bytes(&[value])
    }

    /// Writes a big-endian `u16`.
    pub fn write_u16(&mut self, value: u16) -> CodecResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Writes a big-endian `u32`.
    pub fn write_u32(&mut self, value: u32) -> CodecResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Writes `count` zero bytes.
    pub fn write_zeros(&mut self, count: usize) -> CodecResult<()> {
        self.ensure(count)?;
        self.buf[self.pos..self.pos + count].fill(0);
        self.pos += count;
        Ok(())
    }

    /// Reserves a zero-filled slot of `len` bytes to be patched later.
    pub fn reserve(&mut self, len: usize) -> CodecResult<Slot> {
        let offset = self.pos;
        self.write_zeros(len)?;
        Ok(Slot { offset, len })
    }

    fn patch(&mut self, slot: Slot, bytes: &[u8]) -> CodecResult<()> {
        if slot.len != bytes.len() {
            return Err(CodecError::invalid_structure(format!(
                "slot of {} bytes cannot hold a {} byte field",
                slot.len,
                bytes.len()
            )));
        }
        if slot.offset + slot.len > self.pos {
            return Err(CodecError::invalid_structure(
                "slot lies beyond the written region",
            ));
        }
        self.buf[slot.offset..slot.offset + slot.len].copy_from_slice(bytes);
        Ok(())
    }

    /// Fills a previously reserved 2-byte slot with a big-endian `u16`.
    pub fn patch_u16(&mut self, slot: Slot, value: u16) -> CodecResult<()> {
        self.patch(slot, &value.to_be_bytes())
    }

    /// Fills a previously reserved 4-byte slot with a big-endian `u32`.
    pub fn patch_u32(&mut self, slot: Slot, value: u32) -> CodecResult<()> {
        self.patch(slot, &value.to_be_bytes())
    }

    /// Unwritten space after the position, for producers that fill the
    /// buffer in place. Follow with [`Self::advance`].
    pub fn unfilled_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.pos..]
    }

    /// Commits `count` bytes filled through [`Self::unfilled_mut`].
    pub fn advance(&mut self, count: usize) -> CodecResult<()> {
        self.ensure(count)?;
        self.pos += count;
        Ok(())
    }
}
