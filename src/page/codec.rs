//! String codec
//!
//! Modified UTF-8 over UTF-16 code units. The length-prefixed form lives on
//! [`PageBuffer`](super::PageBuffer); these functions handle the bare body so
//! it can be embedded inside other length-prefixed structures.

use crate::error::{Result, StoreError};

use super::LENGTH_INT;

// =============================================================================
// Encoding
// =============================================================================

/// Encoded width of a single unit
#[inline]
fn unit_width(c: u16) -> usize {
    if c > 0 && c < 0x80 {
        1
    } else if c >= 0x800 {
        3
    } else {
        2
    }
}

/// Write one unit at `out[p..]`, returning the new offset
#[inline]
pub(crate) fn put_unit(out: &mut [u8], mut p: usize, c: u16) -> usize {
    if c > 0 && c < 0x80 {
        out[p] = c as u8;
        p += 1;
    } else if c >= 0x800 {
        out[p] = (0xe0 | (c >> 12)) as u8;
        out[p + 1] = (0x80 | ((c >> 6) & 0x3f)) as u8;
        out[p + 2] = (0x80 | (c & 0x3f)) as u8;
        p += 3;
    } else {
        out[p] = (0xc0 | (c >> 6)) as u8;
        out[p + 1] = (0x80 | (c & 0x3f)) as u8;
        p += 2;
    }
    p
}

/// Encode the body of `s` (no length prefix).
///
/// With `out = None` nothing is written and only the encoded length is
/// computed. Returns the number of body bytes.
///
/// # Panics
/// Panics if `out` is too small for the encoded body.
pub fn encode_string(s: &str, out: Option<&mut [u8]>) -> usize {
    match out {
        None => encoded_len(s),
        Some(out) => s.encode_utf16().fold(0, |p, c| put_unit(out, p, c)),
    }
}

/// Encode the body of `s` into a freshly allocated, exactly sized vector
pub fn encode_string_to_vec(s: &str) -> Vec<u8> {
    let mut out = vec![0u8; encoded_len(s)];
    encode_string(s, Some(&mut out));
    out
}

/// Number of body bytes `s` encodes to
pub fn encoded_len(s: &str) -> usize {
    s.encode_utf16().map(unit_width).sum()
}

/// Bytes a length-prefixed string occupies in a page: the 4-byte unit count
/// plus one base byte per unit plus the extra continuation bytes.
pub fn string_len(s: &str) -> usize {
    let mut units = 0;
    let mut plus = LENGTH_INT;
    for c in s.encode_utf16() {
        units += 1;
        if c >= 0x800 {
            plus += 2;
        } else if c == 0 || c >= 0x80 {
            plus += 1;
        }
    }
    units + plus
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a single unit starting at `buf[p]`, bounded by `end`.
/// Returns the unit and the offset after it.
#[inline]
fn take_unit(buf: &[u8], p: usize, end: usize) -> Result<(u16, usize)> {
    if p >= end {
        return Err(StoreError::Corrupt(format!("string ends early at offset {}", p)));
    }
    let x = buf[p] as u16;
    let width = if x < 0x80 {
        1
    } else if x >= 0xe0 {
        3
    } else {
        2
    };
    if p + width > end {
        return Err(StoreError::Corrupt(format!(
            "string sequence at offset {} needs {} bytes, only {} available",
            p,
            width,
            end - p
        )));
    }
    let c = match width {
        1 => x,
        3 => ((x & 0xf) << 12) + ((buf[p + 1] as u16 & 0x3f) << 6) + (buf[p + 2] as u16 & 0x3f),
        _ => ((x & 0x1f) << 6) + (buf[p + 1] as u16 & 0x3f),
    };
    Ok((c, p + width))
}

/// Decode the first `len` body bytes of `buf` into UTF-16 units
pub fn decode_units(buf: &[u8], len: usize) -> Result<Vec<u16>> {
    if len > buf.len() {
        return Err(StoreError::Corrupt(format!(
            "string body of {} bytes exceeds buffer of {}",
            len,
            buf.len()
        )));
    }
    let mut units = Vec::with_capacity(len);
    let mut p = 0;
    while p < len {
        let (c, next) = take_unit(buf, p, len)?;
        units.push(c);
        p = next;
    }
    Ok(units)
}

/// Decode the first `len` body bytes of `buf` into a string
pub fn decode_string(buf: &[u8], len: usize) -> Result<String> {
    units_to_string(&decode_units(buf, len)?)
}

/// Decode exactly `count` units starting at `buf[start]`.
/// Returns the units and the offset just past the last one.
pub(crate) fn decode_counted(buf: &[u8], start: usize, count: usize) -> Result<(Vec<u16>, usize)> {
    // Every unit needs at least one byte, so a count beyond the remaining
    // input is corrupt before we allocate for it.
    let remaining = buf.len().saturating_sub(start);
    if count > remaining {
        return Err(StoreError::Corrupt(format!(
            "string of {} units cannot fit in the {} remaining bytes",
            count, remaining
        )));
    }
    let mut units = Vec::with_capacity(count);
    let mut p = start;
    for _ in 0..count {
        let (c, next) = take_unit(buf, p, buf.len())?;
        units.push(c);
        p = next;
    }
    Ok((units, p))
}

pub(crate) fn units_to_string(units: &[u16]) -> Result<String> {
    String::from_utf16(units)
        .map_err(|_| StoreError::Corrupt("string contains an unpaired surrogate".to_string()))
}
