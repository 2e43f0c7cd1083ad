//! Page Buffer
//!
//! A fixed-capacity byte buffer with a read/write cursor.
//!
//! Capacity is the caller's responsibility: pages are pre-sized (usually to
//! one or more blocks), so the primitives do not grow the buffer. Reading or
//! writing past the end is a programming error and panics.

use bytes::{Buf, BufMut, Bytes};

use crate::error::{Result, StoreError};

use super::codec;
use super::{LENGTH_FILLER, LENGTH_INT};

/// Persistent content of one page plus the current read/write position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBuffer {
    /// The page bytes (length == capacity)
    data: Vec<u8>,
    /// Current read or write position
    pos: usize,
}

impl PageBuffer {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a zero-filled page of exactly `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity],
            pos: 0,
        }
    }

    /// Wrap existing bytes without copying
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    // =========================================================================
    // Fixed-width Primitives
    // =========================================================================

    /// Append one byte
    pub fn write_byte(&mut self, x: u8) {
        self.data[self.pos] = x;
        self.pos += 1;
    }

    /// Read one byte
    pub fn read_byte(&mut self) -> u8 {
        let x = self.data[self.pos];
        self.pos += 1;
        x
    }

    /// Write an unsigned 16-bit value, big-endian
    pub fn write_short_int(&mut self, x: u16) {
        (&mut self.data[self.pos..]).put_u16(x);
        self.pos += 2;
    }

    /// Read an unsigned 16-bit value, big-endian
    pub fn read_short_int(&mut self) -> u16 {
        let x = (&self.data[self.pos..]).get_u16();
        self.pos += 2;
        x
    }

    /// Write a signed 32-bit value, big-endian
    pub fn write_int(&mut self, x: i32) {
        (&mut self.data[self.pos..]).put_i32(x);
        self.pos += LENGTH_INT;
    }

    /// Read a signed 32-bit value, big-endian
    pub fn read_int(&mut self) -> i32 {
        let x = (&self.data[self.pos..]).get_i32();
        self.pos += LENGTH_INT;
        x
    }

    /// Write a long as two ints: high word, then low word
    pub fn write_long(&mut self, x: i64) {
        self.write_int((x >> 32) as i32);
        self.write_int(x as i32);
    }

    /// Read a long written by [`write_long`](Self::write_long)
    pub fn read_long(&mut self) -> i64 {
        let high = self.read_int() as i64;
        let low = self.read_int() as u32 as i64;
        (high << 32) | low
    }

    /// Overwrite an int at an absolute offset. The position is not changed.
    pub fn set_int(&mut self, at: usize, x: i32) {
        (&mut self.data[at..at + LENGTH_INT]).put_i32(x);
    }

    // =========================================================================
    // Byte Ranges
    // =========================================================================

    /// Append all of `buf`
    pub fn write(&mut self, buf: &[u8]) {
        self.write_range(buf, 0, buf.len());
    }

    /// Append `len` bytes of `buf` starting at `off`
    pub fn write_range(&mut self, buf: &[u8], off: usize, len: usize) {
        self.data[self.pos..self.pos + len].copy_from_slice(&buf[off..off + len]);
        self.pos += len;
    }

    /// Copy `len` bytes from the current position into `buf[off..]`
    pub fn read(&mut self, buf: &mut [u8], off: usize, len: usize) {
        buf[off..off + len].copy_from_slice(&self.data[self.pos..self.pos + len]);
        self.pos += len;
    }

    /// Append the content of `page` up to its position, leaving out the
    /// trailing filler.
    ///
    /// # Panics
    /// Panics if `page` holds fewer than `LENGTH_FILLER` bytes.
    pub fn write_page_no_size(&mut self, page: &PageBuffer) {
        let len = page
            .pos
            .checked_sub(LENGTH_FILLER)
            .unwrap_or_else(|| panic!("page of {} bytes has no filler to drop", page.pos));
        self.write_range(&page.data, 0, len);
    }

    /// Copy `len` bytes from `source` to `destination` within the page.
    /// The ranges may overlap.
    pub fn move_bytes(&mut self, source: usize, destination: usize, len: usize) {
        self.data.copy_within(source..source + len, destination);
    }

    /// Shift `len` bytes at `source` by `offset` bytes
    pub fn offset(&mut self, source: usize, offset: isize, len: usize) {
        let destination = source
            .checked_add_signed(offset)
            .unwrap_or_else(|| panic!("shift of {} by {} leaves the page", source, offset));
        self.move_bytes(source, destination, len);
    }

    /// Zero `len` bytes starting at `offset`
    pub fn zero_fill(&mut self, offset: usize, len: usize) {
        self.data[offset..offset + len].fill(0);
    }

    // =========================================================================
    // Strings
    // =========================================================================

    /// Write a length-prefixed string
    pub fn write_string(&mut self, s: &str) {
        let units = s.encode_utf16().count();
        self.write_int(units as i32);
        let out = &mut self.data[self.pos..];
        self.pos += s.encode_utf16().fold(0, |p, c| codec::put_unit(out, p, c));
    }

    /// Read a length-prefixed string.
    ///
    /// On error the position is left where it was.
    pub fn read_string(&mut self) -> Result<String> {
        if self.pos + LENGTH_INT > self.data.len() {
            return Err(StoreError::Corrupt(format!(
                "string length prefix at {} runs past the page end {}",
                self.pos,
                self.data.len()
            )));
        }
        let count = (&self.data[self.pos..]).get_u32() as usize;
        let (units, end) = codec::decode_counted(&self.data, self.pos + LENGTH_INT, count)?;
        let s = codec::units_to_string(&units)?;
        self.pos = end;
        Ok(s)
    }

    /// Bytes `s` occupies when written with [`write_string`](Self::write_string)
    pub fn string_len(&self, s: &str) -> usize {
        codec::string_len(s)
    }

    // =========================================================================
    // Position Control
    // =========================================================================

    /// Current read or write position
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Set the current read or write position
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Move the position by `delta` bytes
    pub fn seek(&mut self, delta: isize) -> &mut Self {
        self.pos = self
            .pos
            .checked_add_signed(delta)
            .unwrap_or_else(|| panic!("seek by {} from {} leaves the page", delta, self.pos));
        self
    }

    /// Set the position to 0
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Treat the page as holding `len` bytes of content
    pub fn fill(&mut self, len: usize) {
        self.pos = len;
    }

    /// Length of the content, which is the current position
    pub fn length(&self) -> usize {
        self.pos
    }

    /// Shrink the page to `size` bytes if the content is longer.
    ///
    /// The backing storage is replaced by an exactly sized copy of the prefix.
    pub fn truncate(&mut self, size: usize) {
        if self.pos > size {
            self.data = self.data[..size].to_vec();
            self.pos = size;
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Total capacity of the page in bytes
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// The whole page, independent of the position
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable view of the whole page
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the page into an immutable shared buffer
    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.data)
    }

    /// Consume the page into its backing vector
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for PageBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}
