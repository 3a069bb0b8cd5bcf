use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use super::error::{Result, VpkError};

/// Sequential reader over an immutable byte buffer.
///
/// Fixed-width reads fail with [`VpkError::OutOfBounds`] when the buffer is
/// exhausted. String reads never fail: an unterminated trailing string is
/// returned as-is, and reading at or past the end yields an empty string.
pub struct ByteCursor<'a> {
    inner: Cursor<&'a [u8]>,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(data),
        }
    }

    /// Current read offset. May exceed the buffer length after [`skip`](Self::skip).
    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.get_ref().is_empty()
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        let offset = self.position();
        self.inner
            .read_u32::<LittleEndian>()
            .map_err(|_| self.out_of_bounds(offset, 4))
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        let offset = self.position();
        self.inner
            .read_u16::<LittleEndian>()
            .map_err(|_| self.out_of_bounds(offset, 2))
    }

    /// Read bytes up to a `0x00` terminator (consumed, not returned).
    ///
    /// Each byte maps to one character (Latin-1), so arbitrary bytes survive
    /// the conversion.
    pub fn read_null_terminated_string(&mut self) -> String {
        let data = *self.inner.get_ref();
        let start = (self.position() as usize).min(data.len());
        let rest = &data[start..];

        let (text, consumed) = match rest.iter().position(|&b| b == 0) {
            Some(nul) => (&rest[..nul], nul + 1),
            None => (rest, rest.len()),
        };

        if consumed > 0 {
            self.inner.set_position((start + consumed) as u64);
        }
        text.iter().map(|&b| b as char).collect()
    }

    /// Advance without checking the remaining length; the next fixed-width
    /// read reports the overrun.
    pub fn skip(&mut self, n: u64) {
        let pos = self.position().saturating_add(n);
        self.inner.set_position(pos);
    }

    fn out_of_bounds(&self, offset: u64, needed: usize) -> VpkError {
        VpkError::OutOfBounds {
            offset,
            needed,
            len: self.len(),
        }
    }
}
