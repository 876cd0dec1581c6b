//! Data Store Module
//!
//! The orchestrator that routes every operation to the shard owning it.
//!
//! ## Responsibilities
//! - Route row-keyed operations through the chooser
//! - Address partition scans directly by shard ordinal
//! - Swap the shard set atomically
//! - Tear down every shard exactly once, reporting every failure

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::cell::{Cell, Location};
use crate::chooser::{Chooser, JumpChooser};
use crate::context::Context;
use crate::error::{Result, StoreError};
use crate::registry::{Shard, ShardRegistry};

/// One routing epoch: a registry and the chooser built over its names
struct Topology<C> {
    registry: ShardRegistry,
    chooser: C,
}

impl<C: Chooser> Topology<C> {
    fn build(shards: Vec<Shard>, mut chooser: C) -> Result<Self> {
        let registry = ShardRegistry::new(shards)?;
        chooser.set_buckets(registry.names())?;
        Ok(Self { registry, chooser })
    }

    fn route(&self, key: &str) -> Result<&Shard> {
        let bucket = self.chooser.choose(key)?;
        self.registry
            .lookup(bucket)
            .ok_or_else(|| StoreError::Routing(format!("bucket '{}' has no shard", bucket)))
    }
}

/// The sharded cell store
///
/// ## Concurrency Model: Snapshot Routing
///
/// - **Topology** (registry + chooser): one `Arc` behind an `RwLock`. Each call
///   clones the `Arc` and drops the lock before touching a backend, so a slow
///   shard never blocks routing for the others.
/// - **Installation** (`replace_shards`, `destroy`): serialized by
///   `install_lock`; readers never take it.
/// - **Backends**: own their concurrency control. Two concurrent puts to the
///   same triple resolve however the backend defines.
pub struct DataStore<C = JumpChooser> {
    /// Current routing epoch; `None` once destroyed
    topology: RwLock<Option<Arc<Topology<C>>>>,

    /// Serializes replacement of `topology`
    install_lock: Mutex<()>,
}

impl DataStore<JumpChooser> {
    /// Build a store over `shards` with the default jump-hash chooser
    pub fn with_source(shards: Vec<Shard>) -> Result<Self> {
        Self::with_chooser(JumpChooser::new(), shards)
    }
}

impl<C: Chooser + Clone> DataStore<C> {
    /// Build a store over `shards` with a caller-supplied chooser
    pub fn with_chooser(chooser: C, shards: Vec<Shard>) -> Result<Self> {
        let topology = Topology::build(shards, chooser)?;
        tracing::info!(
            shards = topology.registry.len(),
            "data store initialized with shards {:?}",
            topology.registry.names()
        );
        Ok(Self {
            topology: RwLock::new(Some(Arc::new(topology))),
            install_lock: Mutex::new(()),
        })
    }

    fn snapshot(&self) -> Result<Arc<Topology<C>>> {
        self.topology.read().as_ref().cloned().ok_or(StoreError::Closed)
    }

    // =========================================================================
    // Row-keyed Operations
    // =========================================================================

    /// Get the cell designated (row key, column key, ref key)
    pub fn get(
        &self,
        ctx: &Context,
        row_key: &str,
        column_key: &str,
        ref_key: i64,
    ) -> Result<Option<Cell>> {
        ctx.check()?;
        let topology = self.snapshot()?;
        let shard = topology.route(row_key)?;
        tracing::trace!(shard = %shard.name, row_key, column_key, ref_key, "get");
        shard.backend.get(ctx, row_key, column_key, ref_key)
    }

    /// Get the cell with the highest ref key for (row key, column key)
    pub fn get_latest(
        &self,
        ctx: &Context,
        row_key: &str,
        column_key: &str,
    ) -> Result<Option<Cell>> {
        ctx.check()?;
        let topology = self.snapshot()?;
        let shard = topology.route(row_key)?;
        tracing::trace!(shard = %shard.name, row_key, column_key, "get_latest");
        shard.backend.get_latest(ctx, row_key, column_key)
    }

    /// Append a new cell version
    ///
    /// The routed triple is stamped onto `cell`; whatever keys it carried are
    /// replaced. Duplicate triples are judged by the backend.
    pub fn put(
        &self,
        ctx: &Context,
        row_key: &str,
        column_key: &str,
        ref_key: i64,
        cell: Cell,
    ) -> Result<()> {
        ctx.check()?;
        let topology = self.snapshot()?;
        let shard = topology.route(row_key)?;
        tracing::trace!(shard = %shard.name, row_key, column_key, ref_key, "put");
        let cell = cell.stamped(row_key, column_key, ref_key);
        shard.backend.put(ctx, row_key, column_key, ref_key, cell)
    }

    /// Ask the shard owning `key` to reinitialize its connection
    pub fn reset_connection(&self, ctx: &Context, key: &str) -> Result<()> {
        ctx.check()?;
        let topology = self.snapshot()?;
        let shard = topology.route(key)?;
        tracing::debug!(shard = %shard.name, "resetting shard connection");
        shard.backend.reset_connection(ctx, key)
    }

    // =========================================================================
    // Partition Operations
    // =========================================================================

    /// Scan one shard, addressed by its ordinal, bypassing the chooser
    ///
    /// Returns up to `limit` cells with `location > value`, ascending. Pass the
    /// last returned location as `value` to fetch the next page.
    pub fn partition_read(
        &self,
        ctx: &Context,
        partition_number: usize,
        location: Location,
        value: u64,
        limit: usize,
    ) -> Result<Vec<Cell>> {
        ctx.check()?;
        let topology = self.snapshot()?;
        let shard = topology.registry.by_ordinal(partition_number)?;
        tracing::trace!(
            shard = %shard.name,
            partition_number,
            %location,
            value,
            limit,
            "partition_read"
        );
        if limit == 0 {
            return Ok(Vec::new());
        }
        shard
            .backend
            .partition_read(ctx, partition_number, location, value, limit)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Install a new shard set atomically
    ///
    /// Calls already in flight finish against the epoch they started with.
    /// The previous backends are not destroyed.
    pub fn replace_shards(&self, shards: Vec<Shard>) -> Result<()> {
        let _install = self.install_lock.lock();
        let current = self.snapshot()?;
        let next = Topology::build(shards, current.chooser.clone())?;
        tracing::info!(
            from = current.registry.len(),
            to = next.registry.len(),
            "replacing shard set"
        );
        *self.topology.write() = Some(Arc::new(next));
        Ok(())
    }

    /// Destroy every shard backend exactly once
    ///
    /// Shards are torn down concurrently and every failure is collected into
    /// one `StoreError::Destroy`. The store is closed afterwards, even on
    /// failure. Calling this again is a no-op. Callers must drain in-flight
    /// operations first.
    pub fn destroy(&self, ctx: &Context) -> Result<()> {
        let topology = {
            let _install = self.install_lock.lock();
            self.topology.write().take()
        };
        let Some(topology) = topology else {
            tracing::debug!("data store already destroyed");
            return Ok(());
        };

        let shards = topology.registry.shards();
        let outcome = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = shards
                .iter()
                .map(|shard| {
                    let handle = scope.spawn(move |_| shard.backend.destroy(ctx));
                    (shard.name.clone(), handle)
                })
                .collect();

            handles
                .into_iter()
                .filter_map(|(name, handle)| match handle.join() {
                    Ok(Ok(())) => None,
                    Ok(Err(err)) => Some((name, err)),
                    Err(_) => Some((name, StoreError::Backend("destroy panicked".to_string()))),
                })
                .collect::<Vec<_>>()
        });

        let failures = outcome.unwrap_or_else(|_| {
            vec![(
                "*".to_string(),
                StoreError::Backend("shard teardown scope panicked".to_string()),
            )]
        });

        if failures.is_empty() {
            tracing::info!(shards = shards.len(), "data store destroyed");
            Ok(())
        } else {
            for (name, err) in &failures {
                tracing::warn!(shard = %name, "failed to destroy shard: {}", err);
            }
            Err(StoreError::Destroy { failures })
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Shard names in registry order
    pub fn shard_names(&self) -> Result<Vec<String>> {
        Ok(self.snapshot()?.chooser.buckets().to_vec())
    }

    pub fn shard_count(&self) -> Result<usize> {
        Ok(self.snapshot()?.registry.len())
    }

    /// Name of the shard owning `row_key`
    pub fn shard_for(&self, row_key: &str) -> Result<String> {
        let topology = self.snapshot()?;
        let shard = topology.route(row_key)?;
        Ok(shard.name.clone())
    }

    pub fn is_closed(&self) -> bool {
        self.topology.read().is_none()
    }
}
