//! Tests for the in-memory file system
//!
//! These tests verify:
//! - Open semantics per access mode
//! - Contents shared between handles and across reopen
//! - I/O counters
//! - Read-only marking, failure injection and deletion

use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use pagestore::fs::{FileSystem, IoStats, MemoryFileSystem, StoreFile};
use pagestore::AccessMode;

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_writable_open_creates_file() {
    let fs = MemoryFileSystem::new();
    let path = Path::new("new.db");

    assert!(!fs.exists(path));
    let file = fs.open(path, AccessMode::ReadWrite).unwrap();

    assert!(fs.exists(path));
    assert_eq!(file.size().unwrap(), 0);
}

#[test]
fn test_read_only_open_of_missing_file_fails() {
    let fs = MemoryFileSystem::new();

    let err = fs.open(Path::new("missing.db"), AccessMode::ReadOnly).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_read_only_handle_rejects_writes() {
    let fs = MemoryFileSystem::new();
    let path = Path::new("ro.db");
    fs.put_contents(path, vec![1, 2, 3]);

    let mut file = fs.open(path, AccessMode::ReadOnly).unwrap();

    assert_eq!(file.write(b"x").unwrap_err().kind(), ErrorKind::PermissionDenied);
    assert_eq!(file.set_len(0).unwrap_err().kind(), ErrorKind::PermissionDenied);
    assert_eq!(fs.contents(path).unwrap(), vec![1, 2, 3]);
}

#[test]
fn test_marked_read_only_path_refuses_writable_open() {
    let fs = MemoryFileSystem::new();
    let path = Path::new("locked.db");
    fs.put_contents(path, vec![0; 4]);

    fs.set_read_only(path, true);
    assert!(!fs.can_write(path));
    assert_eq!(
        fs.open(path, AccessMode::ReadWrite).unwrap_err().kind(),
        ErrorKind::PermissionDenied
    );
    assert!(fs.open(path, AccessMode::ReadOnly).is_ok());

    fs.set_read_only(path, false);
    assert!(fs.can_write(path));
    assert!(fs.open(path, AccessMode::ReadWrite).is_ok());
}

// =============================================================================
// Content Tests
// =============================================================================

#[test]
fn test_handles_share_contents() {
    let fs = MemoryFileSystem::new();
    let path = Path::new("shared.db");
    let mut writer = fs.open(path, AccessMode::ReadWrite).unwrap();
    let mut reader = fs.open(path, AccessMode::ReadOnly).unwrap();

    writer.write_all(b"hello").unwrap();

    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).unwrap();
    assert_eq!(buf, b"hello");
}

#[test]
fn test_contents_survive_dropped_handle() {
    let fs = MemoryFileSystem::new();
    let path = Path::new("persist.db");
    {
        let mut file = fs.open(path, AccessMode::ReadWrite).unwrap();
        file.write_all(b"data").unwrap();
    }

    let mut file = fs.open(path, AccessMode::ReadWrite).unwrap();
    assert_eq!(file.size().unwrap(), 4);

    file.seek(SeekFrom::End(0)).unwrap();
    file.write_all(b"more").unwrap();
    assert_eq!(fs.contents(path).unwrap(), b"datamore");
}

#[test]
fn test_read_at_end_returns_zero() {
    let fs = MemoryFileSystem::new();
    let path = Path::new("eof.db");
    fs.put_contents(path, vec![1, 2]);
    let mut file = fs.open(path, AccessMode::ReadOnly).unwrap();

    file.seek(SeekFrom::Start(10)).unwrap();
    let mut buf = [0u8; 4];

    assert_eq!(file.read(&mut buf).unwrap(), 0);
}

#[test]
fn test_set_len_truncates_and_extends_with_zeros() {
    let fs = MemoryFileSystem::new();
    let path = Path::new("len.db");
    let mut file = fs.open(path, AccessMode::ReadWrite).unwrap();
    file.write_all(&[7; 8]).unwrap();

    file.set_len(3).unwrap();
    assert_eq!(fs.contents(path).unwrap(), vec![7; 3]);

    file.set_len(6).unwrap();
    assert_eq!(fs.contents(path).unwrap(), vec![7, 7, 7, 0, 0, 0]);
    assert_eq!(StoreFile::position(&mut file).unwrap(), 8);
}

#[test]
fn test_seek_before_start_is_invalid() {
    let fs = MemoryFileSystem::new();
    let mut file = fs.open(Path::new("neg.db"), AccessMode::ReadWrite).unwrap();

    let err = file.seek(SeekFrom::Current(-1)).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_remove_file() {
    let fs = MemoryFileSystem::new();
    let path = Path::new("gone.db");
    fs.put_contents(path, vec![1]);

    fs.remove_file(path).unwrap();

    assert!(!fs.exists(path));
    assert!(fs.contents(path).is_none());
    assert_eq!(fs.remove_file(path).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_create_dir_all_records_ancestors() {
    let fs = MemoryFileSystem::new();

    fs.create_dir_all(Path::new("a/b/c")).unwrap();

    assert!(fs.dir_exists(Path::new("a")));
    assert!(fs.dir_exists(Path::new("a/b")));
    assert!(fs.dir_exists(Path::new("a/b/c")));
    assert!(fs.exists(Path::new("a/b")));
}

// =============================================================================
// Counter Tests
// =============================================================================

#[test]
fn test_counters_track_each_call() {
    let fs = MemoryFileSystem::new();
    let mut file = fs.open(Path::new("count.db"), AccessMode::ReadWrite).unwrap();

    file.write_all(b"abcd").unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut buf = [0u8; 4];
    file.read_exact(&mut buf).unwrap();
    file.sync_data().unwrap();
    file.sync_all().unwrap();

    assert_eq!(
        fs.stats(),
        IoStats {
            seeks: 1,
            reads: 1,
            writes: 1,
            syncs: 2,
        }
    );
}

#[test]
fn test_counters_are_shared_by_clones() {
    let fs = MemoryFileSystem::new();
    let other = fs.clone();
    let mut file = other.open(Path::new("c.db"), AccessMode::ReadWrite).unwrap();

    file.write_all(b"x").unwrap();

    assert_eq!(fs.stats().writes, 1);
}

#[test]
fn test_reset_stats() {
    let fs = MemoryFileSystem::new();
    let mut file = fs.open(Path::new("r.db"), AccessMode::ReadWrite).unwrap();
    file.write_all(b"x").unwrap();

    fs.reset_stats();

    assert_eq!(fs.stats(), IoStats::default());
}

#[test]
fn test_injected_sync_failure_is_counted() {
    let fs = MemoryFileSystem::new();
    let mut file = fs.open(Path::new("s.db"), AccessMode::ReadWrite).unwrap();

    fs.set_fail_sync(true);
    assert!(file.sync_all().is_err());
    assert!(file.sync_data().is_err());

    fs.set_fail_sync(false);
    assert!(file.sync_all().is_ok());
    assert_eq!(fs.stats().syncs, 3);
}

#[test]
fn test_injected_read_failure() {
    let fs = MemoryFileSystem::new();
    let path = Path::new("rf.db");
    fs.put_contents(path, vec![1, 2, 3, 4]);
    let mut file = fs.open(path, AccessMode::ReadOnly).unwrap();
    let mut buf = [0u8; 4];

    fs.set_fail_read(true);
    assert!(file.read(&mut buf).is_err());
    assert_eq!(StoreFile::position(&mut file).unwrap(), 0);

    fs.set_fail_read(false);
    file.read_exact(&mut buf).unwrap();
    assert_eq!(buf, [1, 2, 3, 4]);
}
