//! File System Module
//!
//! The provider a [`BlockFile`](crate::file::BlockFile) opens its handle
//! through. It is passed in explicitly, so tests can swap the operating
//! system for an in-memory implementation that records the I/O it sees.
//!
//! ## Providers
//! - [`OsFileSystem`]: `std::fs` files
//! - [`MemoryFileSystem`]: shared in-memory files with I/O counters

mod memory;

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, Write};
use std::path::Path;

use crate::config::AccessMode;

pub use memory::{IoStats, MemoryFile, MemoryFileSystem};

// =============================================================================
// Traits
// =============================================================================

/// An open file handle with a cursor
pub trait StoreFile: Read + Write + Seek {
    /// Current length of the file in bytes
    fn size(&self) -> io::Result<u64>;

    /// Truncate or extend the file. Does not move the cursor.
    fn set_len(&mut self, len: u64) -> io::Result<()>;

    /// Flush data and metadata to the device
    fn sync_all(&mut self) -> io::Result<()>;

    /// Flush data to the device
    fn sync_data(&mut self) -> io::Result<()>;

    /// Current cursor position, without repositioning the handle
    fn position(&mut self) -> io::Result<u64> {
        self.stream_position()
    }
}

/// Opens files and answers questions about paths
pub trait FileSystem {
    type File: StoreFile;

    /// Open `path`. Writable modes create the file if it is missing.
    fn open(&self, path: &Path, mode: AccessMode) -> io::Result<Self::File>;

    /// Create a directory and all of its parents
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Whether `path` exists
    fn exists(&self, path: &Path) -> bool;

    /// Whether an existing `path` may be opened for writing
    fn can_write(&self, path: &Path) -> bool;

    /// Delete the file at `path`
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

// =============================================================================
// Operating System Provider
// =============================================================================

/// Files on the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    type File = File;

    fn open(&self, path: &Path, mode: AccessMode) -> io::Result<File> {
        // Sync mode opens like read-write; BlockFile syncs after each write.
        match mode {
            AccessMode::ReadOnly => OpenOptions::new().read(true).open(path),
            AccessMode::ReadWrite | AccessMode::ReadWriteSync => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(path),
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn can_write(&self, path: &Path) -> bool {
        fs::metadata(path)
            .map(|m| !m.permissions().readonly())
            .unwrap_or(false)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

impl StoreFile for File {
    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn set_len(&mut self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }

    fn sync_all(&mut self) -> io::Result<()> {
        File::sync_all(self)
    }

    fn sync_data(&mut self) -> io::Result<()> {
        File::sync_data(self)
    }
}
