//! In-memory file system
//!
//! Files live in shared buffers so a handle can be closed and reopened
//! against the same contents. Every handle reports its I/O into counters
//! shared by the whole file system.

use std::collections::{HashMap, HashSet};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::AccessMode;

use super::{FileSystem, StoreFile};

type SharedContents = Arc<Mutex<Vec<u8>>>;

/// Snapshot of the I/O issued through a [`MemoryFileSystem`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoStats {
    /// Cursor moves (`Seek::seek` calls)
    pub seeks: u64,
    /// `Read::read` calls
    pub reads: u64,
    /// `Write::write` calls
    pub writes: u64,
    /// `sync_all` / `sync_data` calls, failed ones included
    pub syncs: u64,
}

#[derive(Debug, Default)]
struct Counters {
    seeks: AtomicU64,
    reads: AtomicU64,
    writes: AtomicU64,
    syncs: AtomicU64,
    fail_sync: AtomicBool,
    fail_read: AtomicBool,
}

#[derive(Debug, Default)]
struct State {
    files: HashMap<PathBuf, SharedContents>,
    dirs: HashSet<PathBuf>,
    read_only: HashSet<PathBuf>,
}

/// A file system held entirely in memory.
///
/// Cloning yields another handle to the same files and counters.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    state: Arc<Mutex<State>>,
    counters: Arc<Counters>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters accumulated since creation or the last [`reset_stats`](Self::reset_stats)
    pub fn stats(&self) -> IoStats {
        IoStats {
            seeks: self.counters.seeks.load(Ordering::SeqCst),
            reads: self.counters.reads.load(Ordering::SeqCst),
            writes: self.counters.writes.load(Ordering::SeqCst),
            syncs: self.counters.syncs.load(Ordering::SeqCst),
        }
    }

    pub fn reset_stats(&self) {
        self.counters.seeks.store(0, Ordering::SeqCst);
        self.counters.reads.store(0, Ordering::SeqCst);
        self.counters.writes.store(0, Ordering::SeqCst);
        self.counters.syncs.store(0, Ordering::SeqCst);
    }

    /// Make every subsequent sync fail with an I/O error
    pub fn set_fail_sync(&self, fail: bool) {
        self.counters.fail_sync.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent read fail with an I/O error
    pub fn set_fail_read(&self, fail: bool) {
        self.counters.fail_read.store(fail, Ordering::SeqCst);
    }

    /// Mark an existing path as not writable (or writable again)
    pub fn set_read_only(&self, path: &Path, read_only: bool) {
        let mut state = self.state.lock();
        if read_only {
            state.read_only.insert(path.to_path_buf());
        } else {
            state.read_only.remove(path);
        }
    }

    /// Copy of a file's contents
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        let state = self.state.lock();
        state.files.get(path).map(|data| data.lock().clone())
    }

    /// Replace a file's contents, creating it if needed
    pub fn put_contents(&self, path: &Path, contents: Vec<u8>) {
        let mut state = self.state.lock();
        let existing = state.files.get(path).cloned();
        match existing {
            Some(data) => *data.lock() = contents,
            None => {
                state
                    .files
                    .insert(path.to_path_buf(), Arc::new(Mutex::new(contents)));
            }
        }
    }

    /// Whether a directory was created
    pub fn dir_exists(&self, path: &Path) -> bool {
        self.state.lock().dirs.contains(path)
    }
}

impl FileSystem for MemoryFileSystem {
    type File = MemoryFile;

    fn open(&self, path: &Path, mode: AccessMode) -> io::Result<MemoryFile> {
        let mut state = self.state.lock();
        let writable = mode.is_writable();
        if writable && state.read_only.contains(path) {
            return Err(io::Error::new(
                ErrorKind::PermissionDenied,
                format!("{} is read-only", path.display()),
            ));
        }
        let existing = state.files.get(path).cloned();
        let data = match existing {
            Some(data) => data,
            None if writable => {
                let data: SharedContents = Arc::default();
                state.files.insert(path.to_path_buf(), Arc::clone(&data));
                data
            }
            None => {
                return Err(io::Error::new(
                    ErrorKind::NotFound,
                    format!("{} does not exist", path.display()),
                ))
            }
        };
        Ok(MemoryFile {
            data,
            pos: 0,
            writable,
            counters: Arc::clone(&self.counters),
        })
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state.lock();
        for dir in path.ancestors().filter(|p| !p.as_os_str().is_empty()) {
            state.dirs.insert(dir.to_path_buf());
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.state.lock();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn can_write(&self, path: &Path) -> bool {
        !self.state.lock().read_only.contains(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        match self.state.lock().files.remove(path) {
            Some(_) => Ok(()),
            None => Err(io::Error::new(
                ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )),
        }
    }
}

/// A handle onto one in-memory file
#[derive(Debug)]
pub struct MemoryFile {
    data: SharedContents,
    pos: u64,
    writable: bool,
    counters: Arc<Counters>,
}

impl MemoryFile {
    fn check_sync(&self) -> io::Result<()> {
        self.counters.syncs.fetch_add(1, Ordering::SeqCst);
        if self.counters.fail_sync.load(Ordering::SeqCst) {
            return Err(io::Error::new(ErrorKind::Other, "injected sync failure"));
        }
        Ok(())
    }

    fn check_writable(&self) -> io::Result<()> {
        if !self.writable {
            return Err(io::Error::new(
                ErrorKind::PermissionDenied,
                "handle was opened read-only",
            ));
        }
        Ok(())
    }
}

impl Read for MemoryFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.counters.reads.fetch_add(1, Ordering::SeqCst);
        if self.counters.fail_read.load(Ordering::SeqCst) {
            return Err(io::Error::new(ErrorKind::Other, "injected read failure"));
        }
        let data = self.data.lock();
        let start = (self.pos as usize).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for MemoryFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_writable()?;
        self.counters.writes.fetch_add(1, Ordering::SeqCst);
        let mut data = self.data.lock();
        let start = self.pos as usize;
        let end = start + buf.len();
        if end > data.len() {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.counters.seeks.fetch_add(1, Ordering::SeqCst);
        let len = self.data.lock().len() as i128;
        let target = match pos {
            SeekFrom::Start(p) => p as i128,
            SeekFrom::End(delta) => len + delta as i128,
            SeekFrom::Current(delta) => self.pos as i128 + delta as i128,
        };
        if target < 0 {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                "seek before the start of the file",
            ));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
}

impl StoreFile for MemoryFile {
    fn size(&self) -> io::Result<u64> {
        Ok(self.data.lock().len() as u64)
    }

    fn set_len(&mut self, len: u64) -> io::Result<()> {
        self.check_writable()?;
        self.data.lock().resize(len as usize, 0);
        Ok(())
    }

    fn sync_all(&mut self) -> io::Result<()> {
        self.check_sync()
    }

    fn sync_data(&mut self) -> io::Result<()> {
        self.check_sync()
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }
}
