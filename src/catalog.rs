//! Table catalog
//!
//! Demultiplexes the `table` field of protocol requests to one data store per
//! table.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::{FileBackend, MemoryBackend, ShardBackend};
use crate::config::{BackendKind, Config};
use crate::context::Context;
use crate::error::{Result, StoreError};
use crate::registry::Shard;
use crate::store::DataStore;

/// Named data stores served by one process
#[derive(Default)]
pub struct Catalog {
    tables: HashMap<String, Arc<DataStore>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every configured table with its shards
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut catalog = Self::new();
        for table in &config.tables {
            let shards = (0..config.shard_count)
                .map(|ordinal| Self::open_shard(config, table, ordinal))
                .collect::<Result<Vec<_>>>()?;
            catalog.insert(table.clone(), DataStore::with_source(shards)?)?;
            tracing::info!(
                table = %table,
                shards = config.shard_count,
                backend = ?config.backend,
                "table opened"
            );
        }
        Ok(catalog)
    }

    fn open_shard(config: &Config, table: &str, ordinal: usize) -> Result<Shard> {
        let name = config.shard_name(ordinal);
        let backend: Arc<dyn ShardBackend> = match config.backend {
            BackendKind::Memory => Arc::new(MemoryBackend::new(name.clone())),
            BackendKind::File => Arc::new(FileBackend::open(
                &config.data_dir.join(table),
                name.clone(),
                config.wal_sync_strategy,
            )?),
        };
        Ok(Shard::new(name, backend))
    }

    /// Register a store under `table`
    pub fn insert(&mut self, table: impl Into<String>, store: DataStore) -> Result<()> {
        let table = table.into();
        if self.tables.contains_key(&table) {
            return Err(StoreError::InvalidConfiguration(format!(
                "table '{}' registered twice",
                table
            )));
        }
        self.tables.insert(table, Arc::new(store));
        Ok(())
    }

    /// The store serving `table`
    pub fn get(&self, table: &str) -> Result<Arc<DataStore>> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))
    }

    /// Table names, sorted
    pub fn tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Destroy every table's store, reporting every failed shard
    pub fn destroy_all(&self, ctx: &Context) -> Result<()> {
        let mut failures = Vec::new();
        for table in self.tables() {
            let Some(store) = self.tables.get(&table) else {
                continue;
            };
            match store.destroy(ctx) {
                Ok(()) => {}
                Err(StoreError::Destroy { failures: shard_failures }) => {
                    failures.extend(
                        shard_failures
                            .into_iter()
                            .map(|(shard, err)| (format!("{}/{}", table, shard), err)),
                    );
                }
                Err(err) => failures.push((table.clone(), err)),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Destroy { failures })
        }
    }
}
