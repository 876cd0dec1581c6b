//! File-backed shard backend
//!
//! Every new cell is appended to the shard's WAL before it becomes visible in
//! the in-memory [`CellTable`]. Opening the backend replays the log, dropping
//! a torn tail left by a crash.
//!
//! ## Concurrency Model: Single-Writer / Multiple-Reader
//! - **Writes** (put/reset/destroy): serialized by the `log` mutex
//! - **Reads**: go straight to the cell table's read lock

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::ShardBackend;
use crate::cell::{AddedClock, Cell, Location};
use crate::config::WalSyncStrategy;
use crate::context::Context;
use crate::error::{Result, StoreError};
use crate::memtable::{CellTable, InsertOutcome};
use crate::wal::{WalRecovery, WalWriter};

struct LogState {
    /// `None` once destroyed, or after a failed reset
    writer: Option<WalWriter>,

    /// Set when an append failed; cleared by `reset_connection`
    broken: bool,

    /// Log length covered by applied cells
    valid_len: u64,

    /// LSN for the next applied cell
    next_lsn: u64,
}

/// A shard persisted as an append-only cell log
pub struct FileBackend {
    name: String,
    path: PathBuf,
    sync_strategy: WalSyncStrategy,
    table: CellTable,
    clock: AddedClock,
    log: Mutex<LogState>,
    closed: AtomicBool,
}

impl FileBackend {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const WAL_EXTENSION: &'static str = "wal";

    /// Open or create the shard `name` under `dir`
    ///
    /// On startup:
    /// 1. Create the directory if needed
    /// 2. Recover the log, truncating a damaged tail
    /// 3. Replay recovered cells into the table
    /// 4. Reopen the log for appends
    pub fn open(dir: &Path, name: impl Into<String>, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let name = name.into();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.{}", name, Self::WAL_EXTENSION));

        let (entries, recovery) = WalRecovery::recover(&path)?;
        if recovery.entries_recovered > 0 || recovery.entries_corrupted > 0 {
            tracing::info!(
                shard = %name,
                recovered = recovery.entries_recovered,
                corrupted = recovery.entries_corrupted,
                last_lsn = recovery.last_lsn,
                "shard log recovered"
            );
        }

        let table = CellTable::new();
        let clock = AddedClock::new();
        for entry in entries {
            clock.observe(entry.cell.added);
            let lsn = entry.lsn;
            if table.insert(entry.cell) != InsertOutcome::Inserted {
                tracing::warn!(shard = %name, lsn, "skipping repeated cell in shard log");
            }
        }

        let writer = WalWriter::open(&path, sync_strategy, recovery.last_lsn + 1)?;

        Ok(Self {
            name,
            path,
            sync_strategy,
            table,
            clock,
            log: Mutex::new(LogState {
                valid_len: writer.position(),
                next_lsn: writer.current_lsn(),
                writer: Some(writer),
                broken: false,
            }),
            closed: AtomicBool::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the shard log
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of cells stored
    pub fn len(&self) -> usize {
        self.table.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Truncate the log to `valid_len`; bytes past it were never applied
    fn discard_unapplied(&self, valid_len: u64) -> Result<()> {
        let file = OpenOptions::new().write(true).open(&self.path)?;
        let len = file.metadata()?.len();
        if len > valid_len {
            tracing::warn!(
                shard = %self.name,
                valid_len,
                dropped = len - valid_len,
                "discarding unapplied shard log bytes"
            );
            file.set_len(valid_len)?;
            file.sync_all()?;
        }
        Ok(())
    }

    fn ensure_open(&self, ctx: &Context) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::ShardClosed(self.name.clone()));
        }
        ctx.check()
    }
}

impl ShardBackend for FileBackend {
    fn get(
        &self,
        ctx: &Context,
        row_key: &str,
        column_key: &str,
        ref_key: i64,
    ) -> Result<Option<Cell>> {
        self.ensure_open(ctx)?;
        Ok(self.table.get(row_key, column_key, ref_key))
    }

    fn get_latest(&self, ctx: &Context, row_key: &str, column_key: &str) -> Result<Option<Cell>> {
        self.ensure_open(ctx)?;
        Ok(self.table.latest(row_key, column_key))
    }

    fn partition_read(
        &self,
        ctx: &Context,
        _partition_number: usize,
        location: Location,
        value: u64,
        limit: usize,
    ) -> Result<Vec<Cell>> {
        self.ensure_open(ctx)?;
        Ok(self.table.scan_after(location, value, limit))
    }

    /// Steps:
    /// 1. Acquire the log lock
    /// 2. Reject a conflicting triple, accept an identical one as a no-op
    /// 3. Stamp `added` and append to the WAL (durability)
    /// 4. Publish to the cell table
    fn put(
        &self,
        ctx: &Context,
        row_key: &str,
        column_key: &str,
        ref_key: i64,
        cell: Cell,
    ) -> Result<()> {
        self.ensure_open(ctx)?;
        let mut cell = cell.stamped(row_key, column_key, ref_key);

        let mut log = self.log.lock();
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::ShardClosed(self.name.clone()));
        }
        if log.broken || log.writer.is_none() {
            return Err(StoreError::Backend(format!(
                "shard {} log failed; reset_connection required",
                self.name
            )));
        }

        match self.table.probe(&cell) {
            InsertOutcome::Inserted => {}
            InsertOutcome::Unchanged => return Ok(()),
            InsertOutcome::Conflict => {
                return Err(StoreError::DuplicateCell {
                    row_key: row_key.to_string(),
                    column_key: column_key.to_string(),
                    ref_key,
                })
            }
        }

        // Last chance to back out before the write becomes durable
        ctx.check()?;

        cell.added = self.clock.next();
        let appended = match log.writer.as_mut() {
            Some(writer) => writer
                .append(&cell)
                .map(|_| (writer.position(), writer.current_lsn())),
            None => Err(StoreError::ShardClosed(self.name.clone())),
        };
        match appended {
            Ok((valid_len, next_lsn)) => {
                log.valid_len = valid_len;
                log.next_lsn = next_lsn;
            }
            Err(e) => {
                tracing::warn!(shard = %self.name, "shard log append failed: {}", e);
                log.broken = true;
                if let Err(trunc) = self.discard_unapplied(log.valid_len) {
                    tracing::warn!(shard = %self.name, "could not drop failed append: {}", trunc);
                }
                return Err(e);
            }
        }

        self.table.insert(cell);
        Ok(())
    }

    /// Reopen the log handle, discarding bytes from any failed append
    fn reset_connection(&self, ctx: &Context, _key: &str) -> Result<()> {
        self.ensure_open(ctx)?;
        let mut log = self.log.lock();
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::ShardClosed(self.name.clone()));
        }
        if let Some(mut writer) = log.writer.take() {
            if let Err(e) = writer.sync() {
                tracing::debug!(shard = %self.name, "sync before reset failed: {}", e);
            }
        }
        log.broken = true;

        self.discard_unapplied(log.valid_len)?;

        let writer = WalWriter::open(&self.path, self.sync_strategy, log.next_lsn)?;
        log.writer = Some(writer);
        log.broken = false;
        tracing::debug!(shard = %self.name, next_lsn = log.next_lsn, "shard log reopened");
        Ok(())
    }

    /// Close the log, dropping bytes no applied cell covers
    fn destroy(&self, _ctx: &Context) -> Result<()> {
        let mut log = self.log.lock();
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(StoreError::ShardClosed(self.name.clone()));
        }
        self.table.clear();
        let synced = match log.writer.take() {
            Some(mut writer) => writer.sync(),
            None => Ok(()),
        };
        // A failed append may have left a complete record behind
        self.discard_unapplied(log.valid_len)?;
        synced
    }
}
