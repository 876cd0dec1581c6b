//! MemTable Module
//!
//! In-memory index of a shard's cells.
//!
//! ## Responsibilities
//! - Point lookups by (row, column, ref)
//! - "Latest" lookups: the maximum ref key per (row, column)
//! - Ordered scans by the `added` marker for partition reads
//! - Enforce immutability: an existing triple is never replaced
//!
//! ## Data Structure Choice
//! Two BTreeMaps behind one RwLock:
//! - versions: (row, column) → (ref → cell), so "latest" is the last entry
//! - by_added: added → (row, column, ref), so scans are a range query

mod table;

pub use table::CellTable;

/// Result of offering a cell to the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new version was stored
    Inserted,

    /// The triple already held this exact body; nothing changed
    Unchanged,

    /// The triple already held a different body; nothing changed
    Conflict,
}
