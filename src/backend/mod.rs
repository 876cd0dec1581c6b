//! Shard Backend Module
//!
//! The contract every per-shard storage engine implements, plus the two
//! engines bundled with the crate.
//!
//! ## Contract
//! - A miss is `Ok(None)` / an empty page, never an error
//! - `put` appends; an existing triple is never overwritten
//! - Each backend owns its own concurrency control and must honor the
//!   `Context` it is handed
//!
//! ## Bundled engines
//! - [`MemoryBackend`]: cell table only (tests, ephemeral deployments)
//! - [`FileBackend`]: cell table rebuilt from an append-only WAL on open

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use crate::cell::{Cell, Location};
use crate::context::Context;
use crate::error::Result;

/// A durable, per-shard cell store
pub trait ShardBackend: Send + Sync {
    /// Get the cell designated (row key, column key, ref key)
    fn get(
        &self,
        ctx: &Context,
        row_key: &str,
        column_key: &str,
        ref_key: i64,
    ) -> Result<Option<Cell>>;

    /// The cell with the maximum ref key for (row key, column key)
    fn get_latest(&self, ctx: &Context, row_key: &str, column_key: &str) -> Result<Option<Cell>>;

    /// Up to `limit` cells whose `location` is strictly greater than `value`,
    /// ascending by `location`
    fn partition_read(
        &self,
        ctx: &Context,
        partition_number: usize,
        location: Location,
        value: u64,
        limit: usize,
    ) -> Result<Vec<Cell>>;

    /// Durably append `cell` under the given triple
    fn put(
        &self,
        ctx: &Context,
        row_key: &str,
        column_key: &str,
        ref_key: i64,
        cell: Cell,
    ) -> Result<()>;

    /// Reinitialize the connection serving `key`
    fn reset_connection(&self, ctx: &Context, key: &str) -> Result<()>;

    /// Release every resource held by this backend
    fn destroy(&self, ctx: &Context) -> Result<()>;
}
