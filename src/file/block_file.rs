//! Block File
//!
//! Random access over a file in whole blocks, with header validation.

use std::fmt;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{AccessMode, Config};
use crate::error::{Result, StoreError};
use crate::fs::{FileSystem, OsFileSystem, StoreFile};
use crate::page::PageBuffer;

use super::cipher::{HeaderCipher, NoCipher};

/// Outcome of [`BlockFile::sync`].
///
/// Sync is best effort: a failure is logged and handed back here instead of
/// being returned as an error.
#[derive(Debug)]
pub enum SyncOutcome {
    /// The device acknowledged the flush
    Synced,
    /// The flush failed (or the file was closed) and was ignored
    Ignored(io::Error),
}

impl SyncOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced)
    }
}

/// A file accessed in whole blocks.
///
/// Every offset and length passed to [`seek`](Self::seek),
/// [`read_fully`](Self::read_fully), [`write`](Self::write) and
/// [`set_len`](Self::set_len) must be a multiple of the block size; anything
/// else fails with [`StoreError::Unaligned`] before touching the file.
///
/// ## Concurrency
/// None. The cursor is shared state and every operation takes `&mut self`;
/// callers sharing a file across threads must wrap it themselves.
pub struct BlockFile<FS: FileSystem = OsFileSystem> {
    /// Provider used to (re)open the handle
    fs: FS,
    /// Backing file path
    path: PathBuf,
    /// Open handle, `None` while closed
    file: Option<FS::File>,
    /// Where the handle's cursor is believed to be
    file_pos: u64,
    /// Cached file length
    file_len: u64,
    /// Effective access mode (may be downgraded to read-only on open)
    mode: AccessMode,
    config: Config,
    cipher: Box<dyn HeaderCipher>,
}

impl BlockFile<OsFileSystem> {
    /// Open a file on the local file system
    pub fn open_path(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        Self::open(OsFileSystem, path, config)
    }
}

impl<FS: FileSystem> BlockFile<FS> {
    /// Open (creating if needed) a block file through `fs`
    ///
    /// 1. Validate the config
    /// 2. For writable modes, create missing parent directories
    /// 3. Downgrade to read-only if the file exists but is not writable
    /// 4. Open the handle and cache the current length
    pub fn open(fs: FS, path: impl AsRef<Path>, config: Config) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref().to_path_buf();
        let mut mode = config.access_mode;

        if mode.is_writable() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs.create_dir_all(parent)?;
            }
            if fs.exists(&path) && !fs.can_write(&path) {
                warn!(path = %path.display(), "file is not writable, opening read-only");
                mode = AccessMode::ReadOnly;
            }
        }

        let file = fs.open(&path, mode)?;
        let file_len = file.size()?;
        debug!(path = %path.display(), ?mode, file_len, "opened block file");

        Ok(Self {
            fs,
            path,
            file: Some(file),
            file_pos: 0,
            file_len,
            mode,
            config,
            cipher: Box::new(NoCipher),
        })
    }

    /// Replace the header cipher (the default is [`NoCipher`])
    pub fn with_cipher(mut self, cipher: impl HeaderCipher + 'static) -> Self {
        self.cipher = Box::new(cipher);
        self
    }

    // =========================================================================
    // Header Protocol
    // =========================================================================

    /// Write the header of a new file, or validate the header of an existing one.
    ///
    /// A file shorter than the header is treated as new. Otherwise the magic
    /// block is compared ([`StoreError::VersionMismatch`]), the salt is read
    /// and fed to the cipher, and the third block is read through the cipher
    /// and compared again ([`StoreError::EncryptionMismatch`]).
    pub fn init(&mut self) -> Result<()> {
        let magic = self.magic_block();
        let header_len = self.config.header_length();

        if self.file_len < header_len {
            self.ensure_writable()?;
            info!(path = %self.path.display(), "writing new file header");
            self.seek(0)?;
            self.write(&magic)?;
            let salt = self.cipher.generate_salt(&magic);
            if salt.len() != magic.len() {
                return Err(StoreError::Config(format!(
                    "salt is {} bytes, expected one block of {}",
                    salt.len(),
                    magic.len()
                )));
            }
            self.write(&salt)?;
            self.cipher.init_key(&salt);
            self.write_maybe_encrypted(&magic)?;
        } else {
            debug!(path = %self.path.display(), "validating file header");
            self.seek(0)?;
            let mut block = vec![0u8; magic.len()];
            self.read_fully(&mut block)?;
            if block != magic {
                return Err(StoreError::VersionMismatch {
                    path: self.path.clone(),
                });
            }
            let mut salt = vec![0u8; magic.len()];
            self.read_fully(&mut salt)?;
            self.cipher.init_key(&salt);
            self.read_maybe_encrypted(&mut block)?;
            if block != magic {
                return Err(StoreError::EncryptionMismatch {
                    path: self.path.clone(),
                });
            }
        }
        Ok(())
    }

    /// The configured magic padded with zeros to one block
    fn magic_block(&self) -> Vec<u8> {
        let mut block = vec![0u8; self.config.block_size];
        block[..self.config.magic.len()].copy_from_slice(&self.config.magic);
        block
    }

    fn write_maybe_encrypted(&mut self, buf: &[u8]) -> Result<()> {
        if !self.cipher.is_encrypted() {
            return self.write(buf);
        }
        let mut data = buf.to_vec();
        self.cipher.encrypt(self.file_pos, &mut data);
        self.write(&data)
    }

    fn read_maybe_encrypted(&mut self, buf: &mut [u8]) -> Result<()> {
        let offset = self.file_pos;
        self.read_fully(buf)?;
        if self.cipher.is_encrypted() {
            self.cipher.decrypt(offset, buf);
        }
        Ok(())
    }

    // =========================================================================
    // Aligned I/O
    // =========================================================================

    /// Move to an absolute, block-aligned offset.
    /// The handle is only repositioned if the offset differs from the current one.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        self.check_aligned("seek offset", pos)?;
        if pos != self.file_pos {
            self.handle()?.seek(SeekFrom::Start(pos))?;
            self.file_pos = pos;
            self.debug_check_position();
        }
        Ok(())
    }

    /// Fill `buf` entirely from the current position.
    ///
    /// If the read fails part way the handle is closed, since its position
    /// is unknown.
    pub fn read_fully(&mut self, buf: &mut [u8]) -> Result<()> {
        self.check_aligned("read length", buf.len() as u64)?;
        let filled = match read_until_full(self.handle()?, buf) {
            Ok(filled) => filled,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "read failed, closing file");
                self.close_silently();
                return Err(e.into());
            }
        };
        self.file_pos += filled as u64;
        if filled < buf.len() {
            return Err(StoreError::ShortRead {
                expected: buf.len(),
                actual: filled,
            });
        }
        self.debug_check_position();
        Ok(())
    }

    /// Write `buf` at the current position, extending the file if needed.
    ///
    /// In sync mode the data reaches the device before this returns. If the
    /// write fails the handle is closed, since its position is unknown.
    pub fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.check_aligned("write length", buf.len() as u64)?;
        self.ensure_writable()?;
        let sync = self.mode.is_sync();
        let file = self.handle()?;
        let written = file
            .write_all(buf)
            .and_then(|_| if sync { file.sync_data() } else { Ok(()) });
        if let Err(e) = written {
            warn!(path = %self.path.display(), error = %e, "write failed, closing file");
            self.close_silently();
            return Err(e.into());
        }
        self.file_pos += buf.len() as u64;
        self.file_len = self.file_len.max(self.file_pos);
        self.debug_check_position();
        Ok(())
    }

    /// Truncate or extend the file to `new_len` bytes.
    ///
    /// In sync mode growth is done by writing zero chunks, after which the
    /// position is restored. If growth fails the handle is closed and
    /// [`open_file`](Self::open_file) picks up the real length. The position
    /// is clamped if it ends up past the new end.
    pub fn set_len(&mut self, new_len: u64) -> Result<()> {
        self.check_aligned("length", new_len)?;
        self.ensure_writable()?;

        if self.mode.is_sync() && new_len > self.file_len {
            let start = self.file_len;
            let restore = self.file_pos;
            let chunk = self.config.sync_chunk_size as u64;
            debug!(start, new_len, chunk, "extending sync file with zero chunks");

            let file = self.handle()?;
            let grown = extend_with_zeros(file, start, new_len, chunk)
                .and_then(|_| file.seek(SeekFrom::Start(restore)).map(drop));
            if let Err(e) = grown {
                warn!(path = %self.path.display(), error = %e, "growth failed, closing file");
                self.close_silently();
                return Err(e.into());
            }
        } else {
            debug!(from = self.file_len, to = new_len, "setting file length");
            self.handle()?.set_len(new_len)?;
        }

        self.file_len = new_len;
        if self.file_pos > new_len {
            let clamped = self.handle()?.seek(SeekFrom::Start(new_len));
            if let Err(e) = clamped {
                self.close_silently();
                return Err(e.into());
            }
            self.file_pos = new_len;
        }
        self.debug_check_position();
        Ok(())
    }

    // =========================================================================
    // Pages
    // =========================================================================

    /// Write a whole page starting at block `index`.
    /// The page capacity must be a multiple of the block size.
    pub fn write_page(&mut self, index: u64, page: &PageBuffer) -> Result<()> {
        self.seek(self.block_offset(index)?)?;
        self.write(page.as_bytes())
    }

    /// Read `blocks` blocks starting at block `index` into a new page
    pub fn read_page(&mut self, index: u64, blocks: usize) -> Result<PageBuffer> {
        self.seek(self.block_offset(index)?)?;
        let mut data = vec![0u8; blocks * self.config.block_size];
        self.read_fully(&mut data)?;
        Ok(PageBuffer::from_vec(data))
    }

    fn block_offset(&self, index: u64) -> Result<u64> {
        index
            .checked_mul(self.config.block_size as u64)
            .ok_or_else(|| {
                StoreError::Io(io::Error::new(
                    ErrorKind::InvalidInput,
                    format!("block index {} overflows the file offset", index),
                ))
            })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Flush and release the handle. Closing a closed file does nothing.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            debug!(path = %self.path.display(), "closed block file");
        }
        Ok(())
    }

    /// Close, logging a failure instead of returning it
    pub fn close_silently(&mut self) {
        if let Err(e) = self.close() {
            warn!(path = %self.path.display(), error = %e, "ignoring close failure");
        }
    }

    /// Close and delete the backing file. A failed delete is logged.
    pub fn close_and_delete(&mut self) {
        self.close_silently();
        if let Err(e) = self.fs.remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "could not delete file");
        }
    }

    /// Reopen a closed file and return to the remembered position.
    /// The cached length is refreshed from the reopened handle.
    pub fn open_file(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }
        let mut file = self.fs.open(&self.path, self.mode)?;
        self.file_len = file.size()?;
        if self.file_pos != 0 {
            file.seek(SeekFrom::Start(self.file_pos))?;
        }
        self.file = Some(file);
        debug!(path = %self.path.display(), pos = self.file_pos, "reopened block file");
        self.debug_check_position();
        Ok(())
    }

    /// Ask the device to persist everything written so far.
    ///
    /// Failures are logged and returned as [`SyncOutcome::Ignored`], never
    /// as an error.
    pub fn sync(&mut self) -> SyncOutcome {
        let result = match self.file.as_mut() {
            Some(file) => file.sync_all(),
            None => Err(io::Error::new(ErrorKind::NotConnected, "file is closed")),
        };
        match result {
            Ok(()) => SyncOutcome::Synced,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring sync failure");
                SyncOutcome::Ignored(e)
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Cached position of the handle's cursor
    pub fn file_pointer(&self) -> u64 {
        self.file_pos
    }

    /// Cached file length
    pub fn length(&self) -> u64 {
        self.file_len
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Effective access mode
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn is_read_only(&self) -> bool {
        !self.mode.is_writable()
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_encrypted()
    }

    pub fn block_size(&self) -> usize {
        self.config.block_size
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn handle(&mut self) -> Result<&mut FS::File> {
        match self.file.as_mut() {
            Some(file) => Ok(file),
            None => Err(StoreError::Closed {
                path: self.path.clone(),
            }),
        }
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.mode.is_writable() {
            Ok(())
        } else {
            Err(StoreError::ReadOnly {
                path: self.path.clone(),
            })
        }
    }

    fn check_aligned(&self, what: &'static str, value: u64) -> Result<()> {
        if value % self.config.block_size as u64 != 0 {
            return Err(StoreError::Unaligned {
                what,
                value,
                block_size: self.config.block_size,
            });
        }
        Ok(())
    }

    /// Debug builds: the handle's cursor must match the cached position
    fn debug_check_position(&mut self) {
        if cfg!(debug_assertions) {
            if let Some(file) = self.file.as_mut() {
                if let Ok(actual) = file.position() {
                    debug_assert_eq!(
                        actual, self.file_pos,
                        "cached position out of sync with handle"
                    );
                }
            }
        }
    }
}

impl<FS: FileSystem> fmt::Debug for BlockFile<FS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockFile")
            .field("path", &self.path)
            .field("open", &self.file.is_some())
            .field("file_pos", &self.file_pos)
            .field("file_len", &self.file_len)
            .field("mode", &self.mode)
            .field("block_size", &self.config.block_size)
            .finish()
    }
}

/// Write zeros from `start` up to `end` in chunks of at most `chunk` bytes,
/// then flush them to the device. Leaves the cursor at `end`.
fn extend_with_zeros<F: StoreFile>(
    file: &mut F,
    start: u64,
    end: u64,
    chunk: u64,
) -> io::Result<()> {
    let zeros = vec![0u8; chunk.min(end - start) as usize];
    file.seek(SeekFrom::Start(start))?;
    let mut at = start;
    while at < end {
        let n = (end - at).min(chunk) as usize;
        file.write_all(&zeros[..n])?;
        at += n as u64;
    }
    file.sync_data()
}

/// Read until `buf` is full or the input ends. Returns the bytes read.
fn read_until_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
