//! In-memory shard backend
//!
//! Holds the shard's cells in a [`CellTable`] only. Nothing survives the
//! process; used for tests and ephemeral deployments.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::ShardBackend;
use crate::cell::{AddedClock, Cell, Location};
use crate::context::Context;
use crate::error::{Result, StoreError};
use crate::memtable::{CellTable, InsertOutcome};

/// A shard whose cells live in memory
pub struct MemoryBackend {
    name: String,
    table: CellTable,
    clock: AddedClock,
    /// Serializes put so the probe, stamp and insert are one step
    write_lock: Mutex<()>,
    closed: AtomicBool,
}

impl MemoryBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: CellTable::new(),
            clock: AddedClock::new(),
            write_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of cells stored
    pub fn len(&self) -> usize {
        self.table.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn ensure_open(&self, ctx: &Context) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::ShardClosed(self.name.clone()));
        }
        ctx.check()
    }
}

impl ShardBackend for MemoryBackend {
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

        let _write_guard = self.write_lock.lock();
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

        cell.added = self.clock.next();
        self.table.insert(cell);
        Ok(())
    }

    fn reset_connection(&self, ctx: &Context, _key: &str) -> Result<()> {
        self.ensure_open(ctx)?;
        tracing::debug!(shard = %self.name, "memory backend has no connection to reset");
        Ok(())
    }

    fn destroy(&self, _ctx: &Context) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(StoreError::ShardClosed(self.name.clone()));
        }
        self.table.clear();
        Ok(())
    }
}
