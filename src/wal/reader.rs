//! WAL Reader
//!
//! Handles reading records from the WAL file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use super::{WalEntry, HEADER_SIZE, MAX_RECORD_SIZE};
use crate::error::{Result, StoreError};

/// Reads records from the WAL file
pub struct WalReader {
    reader: BufReader<File>,
    /// Offset just past the last record that decoded cleanly
    position: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
        })
    }

    /// Read the next record
    ///
    /// `Ok(None)` at a clean end of file; `WalCorruption` for a torn or
    /// checksum-failing record.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        let mut header = [0u8; HEADER_SIZE];
        let read = self.read_fully(&mut header)?;
        if read == 0 {
            return Ok(None);
        }
        if read < HEADER_SIZE {
            return Err(StoreError::WalCorruption(format!(
                "torn header at offset {} ({} of {} bytes)",
                self.position, read, HEADER_SIZE
            )));
        }

        let lsn = u64::from_le_bytes(header[0..8].try_into().unwrap_or_default());
        let crc = u32::from_le_bytes(header[8..12].try_into().unwrap_or_default());
        let len = u32::from_le_bytes(header[12..16].try_into().unwrap_or_default());

        if len > MAX_RECORD_SIZE {
            return Err(StoreError::WalCorruption(format!(
                "record length {} at offset {} exceeds {}",
                len, self.position, MAX_RECORD_SIZE
            )));
        }

        let mut payload = vec![0u8; len as usize];
        let read = self.read_fully(&mut payload)?;
        if read < payload.len() {
            return Err(StoreError::WalCorruption(format!(
                "torn payload for LSN {} ({} of {} bytes)",
                lsn, read, len
            )));
        }

        let entry = WalEntry::decode(lsn, crc, &payload)?;
        self.position += (HEADER_SIZE + payload.len()) as u64;
        Ok(Some(entry))
    }

    /// Offset just past the last clean record
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Iterate over records until end of file or the first bad record
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }

    /// Read until `buf` is full or EOF, returning the bytes read
    fn read_fully(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

/// Iterator over WAL records
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
