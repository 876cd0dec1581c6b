//! Write-Ahead Log (WAL) Module
//!
//! The append-only cell log behind [`FileBackend`](crate::backend::FileBackend).
//!
//! ## Responsibilities
//! - Append every new cell before it becomes visible
//! - CRC32 checksums for corruption detection
//! - Log Sequence Numbers (LSN) for ordering
//! - Crash recovery: replay valid records, truncate a torn tail
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Record 1                                │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Cell   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Record 2                                │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Cell   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//! Integers are little-endian; the CRC covers the bincode-encoded cell.

mod entry;
mod writer;
mod reader;
mod recovery;

pub use entry::{compute_crc, WalEntry, HEADER_SIZE, MAX_RECORD_SIZE};
pub use writer::WalWriter;
pub use reader::{WalIterator, WalReader};
pub use recovery::{RecoveryResult, WalRecovery};
