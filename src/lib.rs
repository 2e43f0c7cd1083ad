//! # pagestore
//!
//! The storage core of a paged index:
//! - Page buffers with fixed-width big-endian primitives
//! - A modified UTF-8 string codec over UTF-16 code units
//! - Block-aligned random access files with header validation
//! - Pluggable file-system provider and header cipher
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Record / Page Logic (caller)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ structured values
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        PageBuffer                            │
//! │          (ints, longs, strings → block-sized bytes)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ whole blocks
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        BlockFile                             │
//! │      (header check, aligned seek/read/write/set_len)         │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │  FileSystem     │                │  HeaderCipher   │
//!   │ (OS / memory)   │                │   (NoCipher)    │
//!   └─────────────────┘                └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod page;
pub mod fs;
pub mod file;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::{AccessMode, Config};
pub use file::{BlockFile, SyncOutcome};
pub use page::PageBuffer;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of pagestore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
