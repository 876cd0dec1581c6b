//! Network Module
//!
//! HTTP transport for the remote protocol.
//!
//! ## Architecture
//! - actix-web server: one route per operation, demultiplexed by table
//! - Store calls run on the blocking pool; shard backends may block on I/O
//! - reqwest client issuing one POST per operation

mod client;
mod handlers;
mod server;

pub use client::{Client, ClientBuilder};
pub use handlers::AppState;
pub use server::{configure_routes, RunningServer, Server};
