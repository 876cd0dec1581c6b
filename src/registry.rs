//! Shard Registry
//!
//! Ordered list of named shards. Resolves a bucket name from the chooser back
//! to its backend, and a partition ordinal to a shard for maintenance scans.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::backend::ShardBackend;
use crate::error::{Result, StoreError};

/// A named storage backend
#[derive(Clone)]
pub struct Shard {
    pub name: String,
    pub backend: Arc<dyn ShardBackend>,
}

impl Shard {
    pub fn new(name: impl Into<String>, backend: Arc<dyn ShardBackend>) -> Self {
        Self {
            name: name.into(),
            backend,
        }
    }
}

impl fmt::Debug for Shard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shard").field("name", &self.name).finish()
    }
}

/// Immutable ordered shard list with a name index
#[derive(Debug)]
pub struct ShardRegistry {
    shards: Vec<Shard>,
    index: HashMap<String, usize>,
}

impl ShardRegistry {
    /// Build a registry; names must be non-empty and unique
    pub fn new(shards: Vec<Shard>) -> Result<Self> {
        if shards.is_empty() {
            return Err(StoreError::InvalidConfiguration(
                "at least one shard is required".to_string(),
            ));
        }

        let mut index = HashMap::with_capacity(shards.len());
        for (ordinal, shard) in shards.iter().enumerate() {
            if shard.name.is_empty() {
                return Err(StoreError::InvalidConfiguration(format!(
                    "shard {} has an empty name",
                    ordinal
                )));
            }
            if index.insert(shard.name.clone(), ordinal).is_some() {
                return Err(StoreError::InvalidConfiguration(format!(
                    "duplicate shard name '{}'",
                    shard.name
                )));
            }
        }

        Ok(Self { shards, index })
    }

    /// Resolve a bucket name
    pub fn lookup(&self, name: &str) -> Option<&Shard> {
        self.index.get(name).map(|&ordinal| &self.shards[ordinal])
    }

    /// Resolve a partition ordinal
    pub fn by_ordinal(&self, partition: usize) -> Result<&Shard> {
        self.shards.get(partition).ok_or(StoreError::OutOfRange {
            partition,
            shard_count: self.shards.len(),
        })
    }

    /// Shard names in registry order
    pub fn names(&self) -> Vec<String> {
        self.shards.iter().map(|s| s.name.clone()).collect()
    }

    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }

    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }
}
