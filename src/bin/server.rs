//! cellstore Server Binary
//!
//! Opens every configured table and serves the JSON protocol over HTTP.
//! Ctrl+C stops the server; every shard is destroyed on the way out.

use std::sync::Arc;

use cellstore::config::{BackendKind, WalSyncStrategy};
use cellstore::{Catalog, Config, Server};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// cellstore Server
#[derive(Parser, Debug)]
#[command(name = "cellstore-server")]
#[command(about = "Sharded, append-only, multi-version cell store")]
#[command(version)]
struct Args {
    /// Data directory (file backend only)
    #[arg(short, long, default_value = "./cellstore_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:4444")]
    listen: String,

    /// Shard engine: memory or file
    #[arg(short, long, default_value = "file")]
    backend: BackendKind,

    /// Tables to serve (repeat or comma-separate)
    #[arg(short, long, value_delimiter = ',', default_value = "cell")]
    tables: Vec<String>,

    /// Shards per table
    #[arg(short = 'n', long, default_value = "4")]
    shards: usize,

    /// Shard name prefix
    #[arg(long, default_value = "shard")]
    shard_prefix: String,

    /// fsync the shard log after every N cells (1 = every write)
    #[arg(long, default_value = "100")]
    sync_every: usize,

    /// HTTP worker threads (0 = one per core)
    #[arg(short, long, default_value = "0")]
    workers: usize,

    /// Per-request deadline in milliseconds
    #[arg(long, default_value = "5000")]
    request_timeout_ms: u64,
}

#[actix_web::main]
async fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cellstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("cellstore server v{}", cellstore::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let sync_strategy = if args.sync_every <= 1 {
        WalSyncStrategy::EveryWrite
    } else {
        WalSyncStrategy::EveryNEntries {
            count: args.sync_every,
        }
    };

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .backend(args.backend)
        .tables(args.tables)
        .shard_count(args.shards)
        .shard_prefix(args.shard_prefix)
        .wal_sync_strategy(sync_strategy)
        .workers(args.workers)
        .request_timeout_ms(args.request_timeout_ms)
        .build();

    let catalog = match Catalog::open(&config) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            tracing::error!("Failed to open tables: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Tables ready: {:?}", catalog.tables());

    let server = Server::new(config, catalog);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
