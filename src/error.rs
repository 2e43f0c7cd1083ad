//! Error types for pagestore
//!
//! Provides a unified error type for page and block file operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for pagestore operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    // -------------------------------------------------------------------------
    // Block File Errors
    // -------------------------------------------------------------------------
    #[error("Unaligned {what}: {value} is not a multiple of the block size {block_size}")]
    Unaligned {
        what: &'static str,
        value: u64,
        block_size: usize,
    },

    #[error("Incompatible file format (magic header mismatch): {}", path.display())]
    VersionMismatch { path: PathBuf },

    #[error("Header consistency check failed (wrong key or corrupt file): {}", path.display())]
    EncryptionMismatch { path: PathBuf },

    #[error("File is opened read-only: {}", path.display())]
    ReadOnly { path: PathBuf },

    #[error("File is closed: {}", path.display())]
    Closed { path: PathBuf },

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt page data: {0}")]
    Corrupt(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
