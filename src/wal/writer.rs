//! WAL Writer
//!
//! Handles appending records to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::WalEntry;
use crate::cell::Cell;
use crate::config::WalSyncStrategy;
use crate::error::Result;

/// Appends records to the WAL file
pub struct WalWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    /// LSN the next append will receive
    next_lsn: u64,
    sync_strategy: WalSyncStrategy,
    /// Records written since the last fsync
    unsynced: usize,
    /// File length covered by appends that fully succeeded
    position: u64,
}

impl WalWriter {
    /// Open or create a WAL file for appending
    ///
    /// `next_lsn` continues the sequence found by recovery (1 for a new log).
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy, next_lsn: u64) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let position = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            next_lsn: next_lsn.max(1),
            sync_strategy,
            unsynced: 0,
            position,
        })
    }

    /// Append a cell, returning the LSN it was written under
    ///
    /// The record reaches the OS before this returns; fsync follows the
    /// configured strategy. On error neither the LSN nor `position` advance,
    /// so `position` always marks the end of the last good record.
    pub fn append(&mut self, cell: &Cell) -> Result<u64> {
        let lsn = self.next_lsn;
        let record = WalEntry::new(lsn, cell.clone()).encode()?;

        self.writer.write_all(&record)?;
        self.writer.flush()?;
        self.unsynced += 1;

        let due = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.unsynced >= count.max(1),
        };
        if due {
            self.sync()?;
        }

        self.next_lsn += 1;
        self.position += record.len() as u64;
        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Get the LSN the next append will receive
    pub fn current_lsn(&self) -> u64 {
        self.next_lsn
    }

    /// End offset of the last fully appended record
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
