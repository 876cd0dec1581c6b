//! WAL Recovery
//!
//! Handles crash recovery by replaying the WAL.

use std::fs::OpenOptions;
use std::path::Path;

use super::{WalEntry, WalReader};
use crate::error::{Result, StoreError};

/// Handles WAL recovery after crash
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of records successfully recovered
    pub entries_recovered: u64,

    /// Number of bad records found (recovery stops at the first one)
    pub entries_corrupted: u64,

    /// Last valid LSN (0 for an empty log)
    pub last_lsn: u64,

    /// Whether the WAL was truncated (torn tail removed)
    pub was_truncated: bool,

    /// Length of the valid prefix in bytes
    pub valid_len: u64,
}

impl WalRecovery {
    /// Recover records from a WAL file
    ///
    /// This will:
    /// 1. Read all valid records
    /// 2. Stop at the first torn, out-of-order or checksum-failing record
    /// 3. Truncate everything from that record on
    /// 4. Return the valid records in order
    pub fn recover(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        if !path.exists() {
            return Ok((Vec::new(), RecoveryResult::default()));
        }

        let (entries, mut result) = Self::scan(path)?;

        let file_len = std::fs::metadata(path)?.len();
        if result.entries_corrupted > 0 || file_len > result.valid_len {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(result.valid_len)?;
            file.sync_all()?;
            result.was_truncated = true;
            tracing::warn!(
                path = %path.display(),
                valid_len = result.valid_len,
                dropped = file_len - result.valid_len,
                "truncated damaged WAL tail"
            );
        }

        Ok((entries, result))
    }

    /// Verify integrity of a WAL file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::scan(path).map(|(_, result)| result)
    }

    fn scan(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let mut reader = WalReader::open(path)?;
        let mut entries = Vec::new();
        let mut result = RecoveryResult::default();

        loop {
            match reader.next_entry() {
                Ok(Some(entry)) => {
                    if entry.lsn <= result.last_lsn {
                        tracing::warn!(
                            lsn = entry.lsn,
                            last_lsn = result.last_lsn,
                            "out-of-order LSN in WAL"
                        );
                        result.entries_corrupted += 1;
                        break;
                    }
                    result.last_lsn = entry.lsn;
                    result.entries_recovered += 1;
                    result.valid_len = reader.position();
                    entries.push(entry);
                }
                Ok(None) => break,
                Err(StoreError::WalCorruption(reason)) => {
                    tracing::warn!(path = %path.display(), "WAL corruption: {}", reason);
                    result.entries_corrupted += 1;
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok((entries, result))
    }
}
