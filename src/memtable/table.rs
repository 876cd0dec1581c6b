//! CellTable implementation
//!
//! BTreeMap-based cell index with a parking_lot RwLock for concurrency.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::InsertOutcome;
use crate::cell::{Cell, Location};

type ColumnAddr = (String, String);

#[derive(Default)]
struct Inner {
    /// (row, column) → ref → cell
    versions: BTreeMap<ColumnAddr, BTreeMap<i64, Cell>>,

    /// added → address of the cell stamped with it
    by_added: BTreeMap<u64, (ColumnAddr, i64)>,
}

/// In-memory index over one shard's cells
///
/// ## Concurrency:
/// - Readers share the lock; inserts take it exclusively
/// - Size counters are atomics so accessors never block
pub struct CellTable {
    inner: RwLock<Inner>,
    size: AtomicUsize,
    entry_count: AtomicUsize,
}

impl CellTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            size: AtomicUsize::new(0),
            entry_count: AtomicUsize::new(0),
        }
    }

    /// Exact version lookup
    pub fn get(&self, row_key: &str, column_key: &str, ref_key: i64) -> Option<Cell> {
        let inner = self.inner.read();
        inner
            .versions
            .get(&(row_key.to_string(), column_key.to_string()))
            .and_then(|refs| refs.get(&ref_key))
            .cloned()
    }

    /// Version with the maximum ref key
    pub fn latest(&self, row_key: &str, column_key: &str) -> Option<Cell> {
        let inner = self.inner.read();
        inner
            .versions
            .get(&(row_key.to_string(), column_key.to_string()))
            .and_then(|refs| refs.last_key_value())
            .map(|(_, cell)| cell.clone())
    }

    /// What `insert` would do with `cell`, without changing anything
    pub fn probe(&self, cell: &Cell) -> InsertOutcome {
        let inner = self.inner.read();
        Self::classify(&inner, cell)
    }

    fn classify(inner: &Inner, cell: &Cell) -> InsertOutcome {
        let existing = inner
            .versions
            .get(&(cell.row_key.clone(), cell.column_key.clone()))
            .and_then(|refs| refs.get(&cell.ref_key));
        match existing {
            None => InsertOutcome::Inserted,
            Some(stored) if stored.body == cell.body => InsertOutcome::Unchanged,
            Some(_) => InsertOutcome::Conflict,
        }
    }

    /// Insert a stamped cell unless its triple is already present
    pub fn insert(&self, cell: Cell) -> InsertOutcome {
        let mut inner = self.inner.write();
        let outcome = Self::classify(&inner, &cell);
        if outcome != InsertOutcome::Inserted {
            return outcome;
        }

        let addr = (cell.row_key.clone(), cell.column_key.clone());
        let size = cell.approximate_size();
        inner.by_added.insert(cell.added, (addr.clone(), cell.ref_key));
        inner
            .versions
            .entry(addr)
            .or_default()
            .insert(cell.ref_key, cell);

        self.size.fetch_add(size, Ordering::Relaxed);
        self.entry_count.fetch_add(1, Ordering::Relaxed);
        InsertOutcome::Inserted
    }

    /// Up to `limit` cells with `location > value`, ascending by location
    pub fn scan_after(&self, location: Location, value: u64, limit: usize) -> Vec<Cell> {
        let inner = self.inner.read();
        match location {
            Location::Added => inner
                .by_added
                .range((Bound::Excluded(value), Bound::Unbounded))
                .filter_map(|(_, (addr, ref_key))| {
                    inner.versions.get(addr).and_then(|refs| refs.get(ref_key))
                })
                .take(limit)
                .cloned()
                .collect(),
        }
    }

    /// Highest `added` marker stored, 0 when empty
    pub fn max_added(&self) -> u64 {
        let inner = self.inner.read();
        inner
            .by_added
            .last_key_value()
            .map(|(added, _)| *added)
            .unwrap_or(0)
    }

    /// Get approximate size in bytes
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    /// Get entry count
    pub fn entry_count(&self) -> usize {
        self.entry_count.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Drop every cell (used when a shard is destroyed)
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.versions.clear();
        inner.by_added.clear();
        self.size.store(0, Ordering::Relaxed);
        self.entry_count.store(0, Ordering::Relaxed);
    }
}

impl Default for CellTable {
    fn default() -> Self {
        Self::new()
    }
}
