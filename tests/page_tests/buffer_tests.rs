//! Tests for PageBuffer
//!
//! These tests verify:
//! - Fixed-width primitive encoding and byte order
//! - Position tracking across reads, writes and seeks
//! - Truncation, fill and reset
//! - Page concatenation without the filler
//! - In-place edits (set_int, move, zero fill)

use pagestore::page::{PageBuffer, LENGTH_FILLER, LENGTH_INT, LENGTH_LONG};

// =============================================================================
// Helper Functions
// =============================================================================

fn page() -> PageBuffer {
    PageBuffer::with_capacity(256)
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_with_capacity_is_zero_filled() {
    let page = PageBuffer::with_capacity(32);

    assert_eq!(page.capacity(), 32);
    assert_eq!(page.pos(), 0);
    assert!(page.as_bytes().iter().all(|&b| b == 0));
}

#[test]
fn test_from_vec_wraps_bytes() {
    let mut page = PageBuffer::from_vec(vec![0, 0, 0, 7]);

    assert_eq!(page.capacity(), 4);
    assert_eq!(page.pos(), 0);
    assert_eq!(page.read_int(), 7);
}

// =============================================================================
// Primitive Round Trip Tests
// =============================================================================

#[test]
fn test_int_round_trip_boundaries() {
    let values = [0, 1, -1, 42, i32::MIN, i32::MAX, 0x7f, 0x80, -0x80, 0x1234_5678];
    let mut page = page();

    for &v in &values {
        page.write_int(v);
    }
    page.reset();
    for &v in &values {
        assert_eq!(page.read_int(), v);
    }
}

#[test]
fn test_long_round_trip_boundaries() {
    let values = [
        0i64,
        1,
        -1,
        i64::MIN,
        i64::MAX,
        0xFFFF_FFFF,
        0x1_0000_0000,
        -0x1_0000_0000,
        0x8000_0000,
        0x0123_4567_89ab_cdef,
    ];
    let mut page = page();

    for &v in &values {
        page.write_long(v);
    }
    page.reset();
    for &v in &values {
        assert_eq!(page.read_long(), v);
    }
}

#[test]
fn test_short_int_round_trip_boundaries() {
    let values = [0u16, 1, 0x7f, 0x80, 0xff, 0x100, 0x7fff, 0x8000, u16::MAX];
    let mut page = page();

    for &v in &values {
        page.write_short_int(v);
    }
    page.reset();
    for &v in &values {
        assert_eq!(page.read_short_int(), v);
    }
}

#[test]
fn test_byte_round_trip() {
    let mut page = page();

    for b in 0..=255u8 {
        page.write_byte(b);
    }
    page.reset();
    for b in 0..=255u8 {
        assert_eq!(page.read_byte(), b);
    }
}

// =============================================================================
// Byte Order Tests
// =============================================================================

#[test]
fn test_int_is_big_endian() {
    let mut page = page();
    page.write_int(0x0102_0304);

    assert_eq!(&page.as_bytes()[..4], &[1, 2, 3, 4]);
}

#[test]
fn test_negative_int_is_twos_complement() {
    let mut page = page();
    page.write_int(-2);

    assert_eq!(&page.as_bytes()[..4], &[0xff, 0xff, 0xff, 0xfe]);
}

#[test]
fn test_long_is_high_word_then_low_word() {
    let mut page = page();
    page.write_long(0x0102_0304_0506_0708);

    assert_eq!(&page.as_bytes()[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_long_low_word_is_not_sign_extended() {
    // Low word 0xFFFF_FFFF must not bleed into the high word on read
    let mut page = PageBuffer::from_vec(vec![0, 0, 0, 1, 0xff, 0xff, 0xff, 0xff]);

    assert_eq!(page.read_long(), 0x1_FFFF_FFFF);
}

#[test]
fn test_short_int_layout() {
    let mut page = page();
    page.write_short_int(0xABCD);

    assert_eq!(&page.as_bytes()[..2], &[0xab, 0xcd]);
}

// =============================================================================
// Position Tests
// =============================================================================

#[test]
fn test_position_advances_by_encoded_width() {
    let mut page = page();

    page.write_byte(1);
    assert_eq!(page.pos(), 1);
    page.write_short_int(2);
    assert_eq!(page.pos(), 3);
    page.write_int(3);
    assert_eq!(page.pos(), 3 + LENGTH_INT);
    page.write_long(4);
    assert_eq!(page.pos(), 3 + LENGTH_INT + LENGTH_LONG);
    page.write(&[9; 10]);
    assert_eq!(page.pos(), 25);

    page.reset();
    page.read_byte();
    page.read_short_int();
    page.read_int();
    page.read_long();
    let mut out = [0u8; 10];
    page.read(&mut out, 0, 10);
    assert_eq!(page.pos(), 25);
    assert_eq!(out, [9; 10]);
}

#[test]
fn test_reset_returns_to_zero() {
    let mut page = page();
    page.write_long(1);
    page.reset();

    assert_eq!(page.pos(), 0);
    assert_eq!(page.length(), 0);
}

#[test]
fn test_seek_is_relative() {
    let mut page = page();
    page.seek(10).seek(-4);
    assert_eq!(page.pos(), 6);

    page.set_pos(100);
    assert_eq!(page.pos(), 100);
}

#[test]
fn test_fill_sets_length() {
    let mut page = page();
    page.set_pos(50);

    page.fill(20);
    assert_eq!(page.length(), 20);

    page.fill(80);
    assert_eq!(page.length(), 80);
}

#[test]
#[should_panic]
fn test_write_past_capacity_panics() {
    let mut page = PageBuffer::with_capacity(3);
    page.write_int(1);
}

// =============================================================================
// Truncate Tests
// =============================================================================

#[test]
fn test_truncate_shrinks_when_position_is_past_size() {
    let mut page = page();
    page.write(&[1, 2, 3, 4, 5, 6]);

    page.truncate(4);

    assert_eq!(page.pos(), 4);
    assert_eq!(page.capacity(), 4);
    assert_eq!(page.as_bytes(), &[1, 2, 3, 4]);
}

#[test]
fn test_truncate_is_noop_when_position_within_size() {
    let mut page = page();
    page.write(&[1, 2, 3]);

    page.truncate(10);

    assert_eq!(page.pos(), 3);
    assert_eq!(page.capacity(), 256);
}

// =============================================================================
// Page Concatenation Tests
// =============================================================================

#[test]
fn test_write_page_no_size_drops_filler() {
    let mut source = PageBuffer::with_capacity(16);
    source.write_int(0x0a0b_0c0d);
    source.write_short_int(0xEEEE); // filler
    assert_eq!(source.pos(), 4 + LENGTH_FILLER);

    let mut target = page();
    target.write_byte(0x55);
    target.write_page_no_size(&source);

    assert_eq!(target.pos(), 1 + 4);
    assert_eq!(&target.as_bytes()[..6], &[0x55, 0x0a, 0x0b, 0x0c, 0x0d, 0x00]);
}

#[test]
#[should_panic]
fn test_write_page_no_size_requires_filler() {
    let mut source = PageBuffer::with_capacity(16);
    source.write_byte(1);

    page().write_page_no_size(&source);
}

// =============================================================================
// In-place Edit Tests
// =============================================================================

#[test]
fn test_set_int_keeps_position() {
    let mut page = page();
    page.write_int(0);
    page.write_int(7);

    page.set_int(0, 99);

    assert_eq!(page.pos(), 8);
    page.reset();
    assert_eq!(page.read_int(), 99);
    assert_eq!(page.read_int(), 7);
}

#[test]
fn test_move_bytes_handles_overlap() {
    let mut page = PageBuffer::from_vec(vec![1, 2, 3, 4, 5, 0, 0]);

    page.move_bytes(0, 2, 5);

    assert_eq!(page.as_bytes(), &[1, 2, 1, 2, 3, 4, 5]);
}

#[test]
fn test_offset_shifts_left() {
    let mut page = PageBuffer::from_vec(vec![0, 0, 7, 8, 9]);

    page.offset(2, -2, 3);

    assert_eq!(&page.as_bytes()[..3], &[7, 8, 9]);
}

#[test]
fn test_zero_fill_range() {
    let mut page = PageBuffer::from_vec(vec![1; 8]);

    page.zero_fill(2, 3);

    assert_eq!(page.as_bytes(), &[1, 1, 0, 0, 0, 1, 1, 1]);
}

#[test]
fn test_write_range_and_read_with_offsets() {
    let mut page = page();
    page.write_range(b"xxhelloxx", 2, 5);
    assert_eq!(page.pos(), 5);

    page.reset();
    let mut out = [b'-'; 9];
    page.read(&mut out, 2, 5);
    assert_eq!(&out, b"--hello--");
}

#[test]
fn test_into_bytes_keeps_content() {
    let mut page = PageBuffer::with_capacity(4);
    page.write_int(5);

    let bytes = page.into_bytes();

    assert_eq!(&bytes[..], &[0, 0, 0, 5]);
}
