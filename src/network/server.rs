//! HTTP Server
//!
//! Binds the protocol routes and serves them until shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::dev::{Server as HttpServerHandle, ServerHandle};
use actix_web::{web, App, HttpServer};

use super::handlers::{self, AppState};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::context::Context;
use crate::error::Result;
use crate::protocol::{self, MAX_BODY_SIZE};

/// Configure the protocol routes
///
/// Paths come from [`crate::protocol`], the same constants the client posts to.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(protocol::GET_PATH, web::post().to(handlers::get))
        .route(protocol::GET_LATEST_PATH, web::post().to(handlers::get_latest))
        .route(protocol::PARTITION_READ_PATH, web::post().to(handlers::partition_read))
        .route(protocol::PUT_PATH, web::post().to(handlers::put))
        .route(protocol::HEALTHCHECK_PATH, web::get().to(handlers::healthcheck));
}

/// HTTP server for cellstore
pub struct Server {
    config: Config,
    catalog: Arc<Catalog>,
}

/// A bound server that has not been awaited yet
pub struct RunningServer {
    /// Addresses actually bound (useful with port 0)
    pub addrs: Vec<SocketAddr>,

    /// Future driving the server; await or spawn it
    pub server: HttpServerHandle,
}

impl RunningServer {
    pub fn handle(&self) -> ServerHandle {
        self.server.handle()
    }
}

impl Server {
    /// Create a new server with the given config and catalog
    pub fn new(config: Config, catalog: Arc<Catalog>) -> Self {
        Self { config, catalog }
    }

    /// Bind the listen address without starting to serve
    pub fn bind(&self) -> Result<RunningServer> {
        let state = web::Data::new(AppState::new(
            Arc::clone(&self.catalog),
            self.config.request_timeout(),
        ));

        let mut http = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .app_data(web::JsonConfig::default().limit(MAX_BODY_SIZE))
                .configure(configure_routes)
        });
        if self.config.workers > 0 {
            http = http.workers(self.config.workers);
        }

        let http = http.bind(self.config.listen_addr.as_str())?;
        let addrs = http.addrs();
        tracing::info!("listening on {:?}", addrs);

        Ok(RunningServer {
            addrs,
            server: http.run(),
        })
    }

    /// Serve until the server stops, then destroy every table's shards
    pub async fn run(self) -> Result<()> {
        let running = self.bind()?;
        running.server.await?;

        tracing::info!("server stopped, destroying tables");
        self.catalog.destroy_all(&Context::background())
    }
}
