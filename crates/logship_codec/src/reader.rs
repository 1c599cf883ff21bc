//! Bounds-checked message reader.

use crate::error::{CodecError, CodecResult};
use bytes::Buf;

/// Reads big-endian fields from a borrowed byte slice.
///
/// Every read checks the remaining input first and fails with
/// [`CodecError::UnexpectedEof`] instead of panicking.
#[derive(Debug, Clone)]
pub struct MessageReader<'a> {
    data: &'a [u8],
    consumed: usize,
}

impl<'a> MessageReader<'a> {
    /// Creates a reader over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, consumed: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.consumed
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// Returns true once all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The unread input.
    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    fn ensure(&self, needed: usize) -> CodecResult<()> {
        if needed > self.data.len() {
            return Err(CodecError::UnexpectedEof {
                needed,
                remaining: self.data.len(),
            });
        }
        Ok(())
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> CodecResult<u8> {
        self.ensure(1)?;
        self.consumed += 1;
        Ok(self.data.get_u8())
    }

    /// Reads a big-endian `u16`.
    pub fn read_u16(&mut self) -> CodecResult<u16> {
        self.ensure(2)?;
        self.consumed += 2;
        Ok(self.data.get_u16())
    }

    /// Reads a big-endian `u32`.
    pub fn read_u32(&mut self) -> CodecResult<u32> {
        self.ensure(4)?;
        self.consumed += 4;
        Ok(self.data.get_u32())
    }

    /// Reads `len` raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        self.ensure(len)?;
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        self.consumed += len;
        Ok(head)
    }

    /// Skips `len` bytes.
    pub fn skip(&mut self, len: usize) -> CodecResult<()> {
        self.read_bytes(len).map(|_| ())
    }
}
