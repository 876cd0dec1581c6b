//! # cellstore
//!
//! A sharded, append-only, multi-version cell store with:
//! - Consistent-hash routing of row keys onto named shards
//! - Immutable cell versions addressed by (row key, column key, ref key)
//! - Per-shard partition scans paged by a write-time marker
//! - Pluggable shard backends (in-memory, or file-backed with a WAL)
//! - A JSON/HTTP protocol with a matching remote client
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              HTTP Server  /  Remote Client                   │
//! │           (JSON: get, getLatest, partitionRead, put)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ table
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Catalog                                 │
//! │                 (one DataStore per table)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     DataStore                                │
//! │        Chooser (jump hash) ──► ShardRegistry                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ row key / partition number
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │MemoryBackend│          │ FileBackend │
//!   │ (CellTable) │          │ WAL + Table │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod context;

pub mod cell;
pub mod chooser;
pub mod registry;
pub mod backend;
pub mod memtable;
pub mod wal;
pub mod store;
pub mod catalog;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StoreError};
pub use config::{BackendKind, Config, ConfigBuilder, WalSyncStrategy};
pub use context::Context;
pub use cell::{Cell, Location};
pub use chooser::{Chooser, JumpChooser};
pub use registry::{Shard, ShardRegistry};
pub use backend::{FileBackend, MemoryBackend, ShardBackend};
pub use store::DataStore;
pub use catalog::Catalog;
pub use network::{Client, ClientBuilder, Server};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cellstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
