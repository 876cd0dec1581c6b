//! Error types for cellstore
//!
//! Provides a unified error type for all operations. A lookup miss is never
//! an error: reads return `Ok(None)` (or an empty page) instead.

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for cellstore operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration / Argument Errors
    // -------------------------------------------------------------------------
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // -------------------------------------------------------------------------
    // Routing Errors
    // -------------------------------------------------------------------------
    #[error("Routing error: {0}")]
    Routing(String),

    #[error("Partition {partition} out of range (shard count {shard_count})")]
    OutOfRange { partition: usize, shard_count: usize },

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    #[error("Cell ({row_key}, {column_key}, {ref_key}) already exists with a different body")]
    DuplicateCell {
        row_key: String,
        column_key: String,
        ref_key: i64,
    },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Shard {0} is closed")]
    ShardClosed(String),

    #[error("Data store is closed")]
    Closed,

    #[error("Failed to destroy {} shard(s): {}", .failures.len(), join_failures(.failures))]
    Destroy { failures: Vec<(String, StoreError)> },

    // -------------------------------------------------------------------------
    // Cancellation
    // -------------------------------------------------------------------------
    #[error("Operation canceled")]
    Canceled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    // -------------------------------------------------------------------------
    // Remote Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl StoreError {
    /// True for the two cancellation outcomes
    pub fn is_cancellation(&self) -> bool {
        matches!(self, StoreError::Canceled | StoreError::DeadlineExceeded)
    }
}

impl From<bincode::Error> for StoreError {
    fn from(err: bincode::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

fn join_failures(failures: &[(String, StoreError)]) -> String {
    failures
        .iter()
        .map(|(shard, err)| format!("{}: {}", shard, err))
        .collect::<Vec<_>>()
        .join("; ")
}
