//! WAL Entry definitions
//!
//! Defines the structure of individual WAL records.

use crate::cell::Cell;
use crate::error::{Result, StoreError};

/// Header size: LSN (8) + CRC (4) + payload length (4)
pub const HEADER_SIZE: usize = 16;

/// Largest payload accepted when reading (16 MB)
pub const MAX_RECORD_SIZE: u32 = 16 * 1024 * 1024;

/// A single record in the WAL
#[derive(Debug, Clone, PartialEq)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The stamped cell, `added` included
    pub cell: Cell,
}

impl WalEntry {
    pub fn new(lsn: u64, cell: Cell) -> Self {
        Self { lsn, cell }
    }

    /// Encode header and payload into one buffer
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(&self.cell)?;
        if payload.len() > MAX_RECORD_SIZE as usize {
            return Err(StoreError::Serialization(format!(
                "WAL record too large: {} bytes (max {})",
                payload.len(),
                MAX_RECORD_SIZE
            )));
        }

        let mut record = Vec::with_capacity(HEADER_SIZE + payload.len());
        record.extend_from_slice(&self.lsn.to_le_bytes());
        record.extend_from_slice(&compute_crc(&payload).to_le_bytes());
        record.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        record.extend_from_slice(&payload);
        Ok(record)
    }

    /// Decode a record from its header fields and payload
    pub fn decode(lsn: u64, crc: u32, payload: &[u8]) -> Result<Self> {
        let actual = compute_crc(payload);
        if actual != crc {
            return Err(StoreError::WalCorruption(format!(
                "CRC mismatch for LSN {}: expected {:08x}, got {:08x}",
                lsn, crc, actual
            )));
        }
        let cell: Cell = bincode::deserialize(payload).map_err(|e| {
            StoreError::WalCorruption(format!("undecodable cell at LSN {}: {}", lsn, e))
        })?;
        Ok(Self { lsn, cell })
    }
}

/// CRC32 of a record payload
pub fn compute_crc(payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(payload);
    hasher.finalize()
}
