//! Configuration for cellstore
//!
//! Centralized configuration with sensible defaults.

use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, StoreError};

/// Main configuration for a cellstore deployment
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for file-backed shards
    /// Internal structure:
    ///   {data_dir}/
    ///     └── {table}/
    ///         ├── {shard_prefix}0.wal
    ///         └── {shard_prefix}1.wal ...
    pub data_dir: PathBuf,

    /// Which engine backs every shard
    pub backend: BackendKind,

    /// Sync strategy: how often to fsync shard logs
    pub wal_sync_strategy: WalSyncStrategy,

    // -------------------------------------------------------------------------
    // Sharding Configuration
    // -------------------------------------------------------------------------
    /// Tables served; each gets its own data store
    pub tables: Vec<String>,

    /// Shards per table
    pub shard_count: usize,

    /// Shard names are `{shard_prefix}{ordinal}`
    pub shard_prefix: String,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// HTTP listen address
    pub listen_addr: String,

    /// HTTP worker threads (0 = one per core)
    pub workers: usize,

    /// Deadline applied to each request (milliseconds)
    pub request_timeout_ms: u64,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

/// Shard engine selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    File,
}

impl FromStr for BackendKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(BackendKind::Memory),
            "file" | "fs" => Ok(BackendKind::File),
            other => Err(StoreError::InvalidConfiguration(format!(
                "unknown backend '{}' (expected memory or file)",
                other
            ))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./cellstore_data"),
            backend: BackendKind::File,
            wal_sync_strategy: WalSyncStrategy::EveryNEntries { count: 100 },
            tables: vec!["cell".to_string()],
            shard_count: 4,
            shard_prefix: "shard".to_string(),
            listen_addr: "127.0.0.1:4444".to_string(),
            workers: 0,
            request_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject configurations no store can be built from
    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(StoreError::InvalidConfiguration(
                "shard_count must be at least 1".to_string(),
            ));
        }
        if self.tables.is_empty() {
            return Err(StoreError::InvalidConfiguration(
                "at least one table is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for table in &self.tables {
            if table.is_empty() {
                return Err(StoreError::InvalidConfiguration(
                    "table names must not be empty".to_string(),
                ));
            }
            if !seen.insert(table.as_str()) {
                return Err(StoreError::InvalidConfiguration(format!(
                    "duplicate table '{}'",
                    table
                )));
            }
        }
        Ok(())
    }

    /// Name of the shard at `ordinal`
    pub fn shard_name(&self, ordinal: usize) -> String {
        format!("{}{}", self.shard_prefix, ordinal)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all shard logs)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the shard engine
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Set the tables to serve
    pub fn tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.tables = tables.into_iter().map(Into::into).collect();
        self
    }

    /// Set the number of shards per table
    pub fn shard_count(mut self, count: usize) -> Self {
        self.config.shard_count = count;
        self
    }

    /// Set the shard name prefix
    pub fn shard_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.shard_prefix = prefix.into();
        self
    }

    /// Set the HTTP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of HTTP workers
    pub fn workers(mut self, count: usize) -> Self {
        self.config.workers = count;
        self
    }

    /// Set the per-request deadline (in milliseconds)
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.request_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
