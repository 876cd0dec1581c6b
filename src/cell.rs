//! Cell data model
//!
//! A cell is an immutable, versioned fact addressed by
//! `(row_key, column_key, ref_key)`. `added` is the write-time marker a shard
//! backend stamps when the cell is first stored.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A single stored version
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// Logical record identifier; the only routing input
    pub row_key: String,

    /// Named attribute of the record
    pub column_key: String,

    /// Caller-assigned version token; the maximum is "latest"
    pub ref_key: i64,

    /// Opaque payload, usually JSON text
    pub body: String,

    /// Write-time marker assigned by the owning shard (0 until stored)
    #[serde(default)]
    pub added: u64,
}

impl Cell {
    /// A cell carrying only a body; keys are stamped by `put`
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn new(
        row_key: impl Into<String>,
        column_key: impl Into<String>,
        ref_key: i64,
        body: impl Into<String>,
    ) -> Self {
        Self {
            row_key: row_key.into(),
            column_key: column_key.into(),
            ref_key,
            body: body.into(),
            added: 0,
        }
    }

    /// Overwrite the addressing triple with the routed one
    pub fn stamped(mut self, row_key: &str, column_key: &str, ref_key: i64) -> Self {
        if self.row_key != row_key {
            self.row_key = row_key.to_string();
        }
        if self.column_key != column_key {
            self.column_key = column_key.to_string();
        }
        self.ref_key = ref_key;
        self
    }

    /// Approximate in-memory footprint, used for table size accounting
    pub fn approximate_size(&self) -> usize {
        self.row_key.len() + self.column_key.len() + self.body.len() + 16
    }
}

/// Field a partition scan is ordered and bounded by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// The write-time marker
    Added,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Added => "added",
        }
    }

    /// Read this location's value from a cell
    pub fn value_of(&self, cell: &Cell) -> u64 {
        match self {
            Location::Added => cell.added,
        }
    }
}

impl FromStr for Location {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "added" | "timestamp" => Ok(Location::Added),
            other => Err(StoreError::InvalidArgument(format!(
                "unsupported location field '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-shard source of `added` markers
///
/// Yields `max(now_unix_nanos, last + 1)`: strictly increasing, unique per
/// shard and still comparable with wall-clock nanoseconds.
#[derive(Debug, Default)]
pub struct AddedClock {
    last: AtomicU64,
}

impl AddedClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        let now = unix_nanos();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current.saturating_add(1));
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(observed) => current = observed,
            }
        }
    }

    /// Raise the floor without issuing a marker (used during replay)
    pub fn observe(&self, added: u64) {
        self.last.fetch_max(added, Ordering::AcqRel);
    }
}

/// Current time in nanoseconds since the unix epoch
pub fn unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
