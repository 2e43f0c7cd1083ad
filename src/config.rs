//! Configuration for pagestore
//!
//! Centralized block file configuration with sensible defaults.

use crate::error::{Result, StoreError};
use crate::file::HEADER_BLOCKS;

/// Default block size in bytes. Every offset and length handled by a
/// [`BlockFile`](crate::file::BlockFile) is a multiple of this.
pub const DEFAULT_BLOCK_SIZE: usize = 16;

/// Default magic signature, exactly one default block long.
pub const DEFAULT_MAGIC: &[u8] = b"-- PAGES 1/B --\n";

/// Default chunk size used when growing a synchronous file (16 KiB)
pub const DEFAULT_SYNC_CHUNK_SIZE: usize = 16 * 1024;

/// Main configuration for a block file
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Layout Configuration
    // -------------------------------------------------------------------------
    /// Size of one block in bytes
    pub block_size: usize,

    /// Signature written to (and validated against) the header blocks.
    /// Padded with zeros up to one block on disk.
    pub magic: Vec<u8>,

    // -------------------------------------------------------------------------
    // Access Configuration
    // -------------------------------------------------------------------------
    /// How the file is opened
    pub access_mode: AccessMode,

    /// Largest zero-fill write issued when growing a file in sync mode
    pub sync_chunk_size: usize,
}

/// File access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Reads only; writes fail with `StoreError::ReadOnly`
    ReadOnly,

    /// Reads and buffered writes
    ReadWrite,

    /// Reads and writes that reach the device before returning
    ReadWriteSync,
}

impl AccessMode {
    /// Whether this mode permits writes
    pub fn is_writable(self) -> bool {
        !matches!(self, AccessMode::ReadOnly)
    }

    /// Whether writes are synchronous
    pub fn is_sync(self) -> bool {
        matches!(self, AccessMode::ReadWriteSync)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            magic: DEFAULT_MAGIC.to_vec(),
            access_mode: AccessMode::ReadWrite,
            sync_chunk_size: DEFAULT_SYNC_CHUNK_SIZE,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the settings are usable together
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(StoreError::Config("block size must be non-zero".to_string()));
        }
        if self.magic.is_empty() {
            return Err(StoreError::Config("magic must not be empty".to_string()));
        }
        if self.magic.len() > self.block_size {
            return Err(StoreError::Config(format!(
                "magic is {} bytes but a block holds only {}",
                self.magic.len(),
                self.block_size
            )));
        }
        if self.sync_chunk_size == 0 || self.sync_chunk_size % self.block_size != 0 {
            return Err(StoreError::Config(format!(
                "sync chunk size {} must be a non-zero multiple of the block size {}",
                self.sync_chunk_size, self.block_size
            )));
        }
        Ok(())
    }

    /// Total header length: magic, salt and check block
    pub fn header_length(&self) -> u64 {
        HEADER_BLOCKS * self.block_size as u64
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the block size (in bytes)
    ///
    /// The sync chunk size is rounded down to a multiple of the new block
    /// size (and to at least one block) unless set explicitly afterwards.
    pub fn block_size(mut self, size: usize) -> Self {
        self.config.block_size = size;
        if size > 0 {
            let chunk = self.config.sync_chunk_size / size * size;
            self.config.sync_chunk_size = chunk.max(size);
        }
        self
    }

    /// Set the magic signature
    pub fn magic(mut self, magic: impl Into<Vec<u8>>) -> Self {
        self.config.magic = magic.into();
        self
    }

    /// Set the access mode
    pub fn access_mode(mut self, mode: AccessMode) -> Self {
        self.config.access_mode = mode;
        self
    }

    /// Set the zero-fill chunk size used when growing a sync file
    pub fn sync_chunk_size(mut self, size: usize) -> Self {
        self.config.sync_chunk_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
