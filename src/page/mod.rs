//! Page Module
//!
//! In-memory page buffers and the binary encoding used for page content.
//!
//! ## Responsibilities
//! - Fixed-width big-endian primitives (short, int, long)
//! - Length-prefixed strings in a modified UTF-8 form
//! - Concatenating pages without their trailing filler
//!
//! ## String Wire Format
//! ```text
//! ┌───────────────────────┬──────────────────────────────────────┐
//! │ Unit count (4, BE)    │ Body: 1, 2 or 3 bytes per UTF-16 unit │
//! └───────────────────────┴──────────────────────────────────────┘
//!
//!   unit 0x0001..=0x007F  →  0xxxxxxx
//!   unit 0x0000, 0x0080..=0x07FF  →  110xxxxx 10xxxxxx
//!   unit 0x0800..=0xFFFF  →  1110xxxx 10xxxxxx 10xxxxxx
//! ```
//!
//! Units are UTF-16 code units, not code points: a character outside the
//! Basic Multilingual Plane is written as two surrogates of three bytes each.
//! NUL is always written as two bytes, so the body never contains a zero byte.

mod buffer;
pub mod codec;

pub use buffer::PageBuffer;

/// Trailing bytes reserved in every page for the checksum and filler
pub const LENGTH_FILLER: usize = 2;

/// Encoded width of an int value
pub const LENGTH_INT: usize = 4;

/// Encoded width of a long value
pub const LENGTH_LONG: usize = 8;
