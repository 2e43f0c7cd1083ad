//! Block File Module
//!
//! Block-aligned random access to a single file.
//!
//! ## Responsibilities
//! - Write the header of a new file, validate it on every reopen
//! - Seek, read, write and resize strictly in whole blocks
//! - Track the cursor and length without asking the OS each time
//! - Close and reopen while keeping the position
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Block 0: magic, zero padded            │
//! ├────────────────────────────────────────┤
//! │ Block 1: salt                          │
//! ├────────────────────────────────────────┤
//! │ Block 2: magic, through the cipher     │
//! ├────────────────────────────────────────┤
//! │ Block 3..: page data                   │
//! │ ... (owned by the caller) ...          │
//! └────────────────────────────────────────┘
//! ```

mod block_file;
mod cipher;

pub use block_file::{BlockFile, SyncOutcome};
pub use cipher::{HeaderCipher, NoCipher};

/// Number of blocks taken by the file header
pub const HEADER_BLOCKS: u64 = 3;
